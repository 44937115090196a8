use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{Scope, Subject};
use super::{null_as_default, Coordinates, NameRef, Review};
use crate::error::{ClientError, Result};

/// Publication state of an ad. Ads are never deleted, only archived.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdStatus {
    #[default]
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "archive", alias = "archived")]
    Archived,
}

/// Row of the `ads` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ad {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_info: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: AdStatus,
    #[serde(rename = "isRemote", default, deserialize_with = "null_as_default")]
    pub is_remote: bool,
    #[serde(rename = "isInPerson", default, deserialize_with = "null_as_default")]
    pub is_in_person: bool,
    pub subject_id: i64,
    pub scope_id: i64,
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,
}

impl Ad {
    /// Coordinates, when both halves were stored.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.status == AdStatus::Archived
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImagePathRef {
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct RatingRef {
    pub rating: u8,
}

/// An ad together with its embedded owner, subject, scope and review ratings,
/// as returned by the listing query.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ListingRow {
    #[serde(flatten)]
    pub ad: Ad,
    #[serde(default)]
    pub profiles: Option<ImagePathRef>,
    #[serde(default)]
    pub subjects: Option<NameRef>,
    #[serde(default)]
    pub scopes: Option<NameRef>,
    #[serde(default)]
    pub reviews: Vec<RatingRef>,
}

impl ListingRow {
    /// Subject name from the join, or from the catalog when the join came back empty.
    pub fn subject_name(&self) -> String {
        resolve_name(self.subjects.as_ref(), || {
            Subject::from_id(self.ad.subject_id).map(Subject::name)
        })
    }

    pub fn scope_name(&self) -> String {
        resolve_name(self.scopes.as_ref(), || {
            Scope::from_id(self.ad.scope_id).map(Scope::name)
        })
    }

    pub fn owner_image_path(&self) -> Option<&str> {
        self.profiles
            .as_ref()
            .and_then(|p| p.image_path.as_deref())
            .filter(|p| !p.is_empty())
    }
}

fn resolve_name<F>(joined: Option<&NameRef>, fallback: F) -> String
where
    F: FnOnce() -> Option<&'static str>,
{
    joined
        .map(|n| n.name.clone())
        .or_else(|| fallback().map(str::to_string))
        .unwrap_or_default()
}

/// Mean of the given ratings, `None` when there are none.
pub fn average_rating<I>(ratings: I) -> Option<f64>
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), r| (sum + u32::from(r), count + 1));
    (count > 0).then(|| f64::from(sum) / f64::from(count))
}

/// Read-time projection used by the listing screens.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdWithStats {
    pub ad: Ad,
    pub subject_name: String,
    pub scope_name: String,
    pub average_rating: Option<f64>,
    pub review_count: usize,
    pub image_url: Option<String>,
}

impl AdWithStats {
    pub fn new(
        ad: Ad,
        subject_name: impl Into<String>,
        scope_name: impl Into<String>,
        ratings: &[u8],
        image_url: Option<String>,
    ) -> Self {
        Self {
            ad,
            subject_name: subject_name.into(),
            scope_name: scope_name.into(),
            average_rating: average_rating(ratings.iter().copied()),
            review_count: ratings.len(),
            image_url,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.ad.coordinates()
    }
}

/// Everything the detail screen shows for one ad.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdDetails {
    pub ad: Ad,
    pub subject_name: String,
    pub scope_name: String,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
}

/// Marker shown on the map screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapPin {
    pub ad_id: i64,
    pub title: String,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl MapPin {
    pub fn caption(&self) -> String {
        format!("Cena: {} zł / 60 min", self.price)
    }
}

/// Entry of the "my ads" screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnedAdSummary {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: AdStatus,
    #[serde(rename = "subjects", default, with = "flat_name")]
    pub subject_name: String,
    #[serde(rename = "scopes", default, with = "flat_name")]
    pub scope_name: String,
}

/// `{ "name": "..." }` on the wire, a plain string in Rust.
mod flat_name {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::NameRef;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<NameRef>::deserialize(deserializer)?
            .map(|n| n.name)
            .unwrap_or_default())
    }

    pub fn serialize<S>(name: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Named<'a> {
            name: &'a str,
        }
        Named { name }.serialize(serializer)
    }
}

/// Form state of the add/edit screens. Everything is kept as the user typed
/// it until `validate` turns it into a payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdDraft {
    pub title: String,
    pub description: String,
    pub price: String,
    pub address: String,
    pub contact_info: String,
    pub subject: Option<Subject>,
    pub scope: Option<Scope>,
    pub is_remote: bool,
    pub is_in_person: bool,
    pub coordinates: Option<Coordinates>,
}

impl AdDraft {
    /// Prefill the edit form from a stored ad.
    pub fn from_ad(ad: &Ad) -> Self {
        Self {
            title: ad.title.clone(),
            description: ad.description.clone(),
            price: ad.price.to_string(),
            address: ad.address.clone().unwrap_or_default(),
            contact_info: ad.contact_info.clone(),
            subject: Subject::from_id(ad.subject_id),
            scope: Scope::from_id(ad.scope_id),
            is_remote: ad.is_remote,
            is_in_person: ad.is_in_person,
            coordinates: ad.coordinates(),
        }
    }

    pub fn parsed_price(&self) -> Result<f64> {
        let price = self
            .price
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| ClientError::validation(format!("price is not a number: {}", self.price)))?;
        if !price.is_finite() || price < 0.0 {
            return Err(ClientError::validation("price must be a non-negative amount"));
        }
        Ok(price)
    }

    /// Check every required field and build the column values to write.
    pub fn validate(&self) -> Result<AdPayload> {
        let required = |value: &str, field: &str| {
            if value.trim().is_empty() {
                Err(ClientError::validation(format!("{field} is required")))
            } else {
                Ok(value.trim().to_string())
            }
        };

        let title = required(&self.title, "title")?;
        let description = required(&self.description, "description")?;
        let contact_info = required(&self.contact_info, "contact info")?;
        let price = self.parsed_price()?;
        let subject = self
            .subject
            .ok_or_else(|| ClientError::validation("subject is required"))?;
        let scope = self
            .scope
            .ok_or_else(|| ClientError::validation("category is required"))?;

        if !self.is_remote && !self.is_in_person {
            return Err(ClientError::validation(
                "an ad must be offered remotely, in person, or both",
            ));
        }

        let address = Some(self.address.trim().to_string()).filter(|a| !a.is_empty());
        if self.is_in_person && address.is_none() {
            return Err(ClientError::validation("in-person lessons need an address"));
        }

        let coordinates = self.coordinates.filter(|_| self.is_in_person);

        Ok(AdPayload {
            title,
            description,
            price,
            address,
            contact_info,
            subject_id: subject.id(),
            scope_id: scope.id(),
            is_remote: self.is_remote,
            is_in_person: self.is_in_person,
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        })
    }
}

/// Owner-editable columns of an ad. `None` is written as `null`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdPayload {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: Option<String>,
    pub contact_info: String,
    pub subject_id: i64,
    pub scope_id: i64,
    #[serde(rename = "isRemote")]
    pub is_remote: bool,
    #[serde(rename = "isInPerson")]
    pub is_in_person: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Insert body for a freshly paid ad.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAd {
    #[serde(flatten)]
    pub payload: AdPayload,
    pub user_id: Uuid,
    pub status: AdStatus,
}
