pub mod ad;
pub mod catalog;
pub mod profile;
pub mod review;

use serde::{Deserialize, Deserializer, Serialize};

pub use ad::{
    Ad, AdDetails, AdDraft, AdPayload, AdStatus, AdWithStats, ListingRow, MapPin, NewAd,
    OwnedAdSummary,
};
pub use catalog::{Scope, Subject};
pub use profile::{NewProfile, Profile, ProfileUpdate};
pub use review::{NewReview, Review};

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Embedded `{ "name": ... }` object produced by a PostgREST foreign-table select.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NameRef {
    pub name: String,
}

/// Columns the backend may return as `null` even though the client treats
/// them as plain values.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
