// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tutor_scout::backend::{
    Geocoder, MarketplaceBackend, PaymentConfirmer, PaymentGateway, PaymentIntent, PaymentRequest,
    Session,
};
use tutor_scout::error::{ClientError, Result};
use tutor_scout::models::ad::{ImagePathRef, RatingRef};
use tutor_scout::models::{
    Ad, AdPayload, AdStatus, AdWithStats, Coordinates, ListingRow, MapPin, NewAd, NewProfile,
    NewReview, OwnedAdSummary, Profile, ProfileUpdate, Review, Scope, Subject,
};
use tutor_scout::Marketplace;

pub const OWNER: &str = "6f1d2c1e-8a4b-4b59-9d3e-0a7c5b2f9e11";
pub const OTHER: &str = "0b9f8a7e-1c2d-4e5f-8a9b-c0d1e2f3a4b5";

pub fn owner_id() -> Uuid {
    Uuid::parse_str(OWNER).unwrap()
}

pub fn owner_session() -> Session {
    Session {
        user_id: owner_id(),
        access_token: "owner-token".to_string(),
    }
}

pub fn ad(id: i64, subject: Subject, scope: Scope, coords: Option<Coordinates>) -> Ad {
    Ad {
        id,
        title: format!("Oferta {id}"),
        description: "Opis oferty".to_string(),
        price: 50.0,
        address: coords.map(|_| "Łódź, Piotrkowska 1".to_string()),
        latitude: coords.map(|c| c.latitude),
        longitude: coords.map(|c| c.longitude),
        contact_info: "600 000 000".to_string(),
        status: AdStatus::Active,
        is_remote: coords.is_none(),
        is_in_person: coords.is_some(),
        subject_id: subject.id(),
        scope_id: scope.id(),
        owner_id: owner_id(),
    }
}

pub fn with_stats(id: i64, subject: &str, ratings: &[u8], coords: Option<Coordinates>) -> AdWithStats {
    let subject_enum = Subject::from_name(subject).unwrap_or(Subject::Other);
    AdWithStats::new(
        ad(id, subject_enum, Scope::University, coords),
        subject,
        Scope::University.name(),
        ratings,
        None,
    )
}

#[derive(Default)]
pub struct State {
    pub ads: Vec<Ad>,
    pub reviews: Vec<Review>,
    pub profiles: Vec<Profile>,
    pub avatars: Vec<(String, Vec<u8>, String)>,
    pub avatar_paths: Vec<Option<String>>,
    /// Serve archived ads from the listing too, like a table without a status filter.
    pub listing_ignores_status: bool,
}

/// Backend kept entirely in memory, mirroring the row-level rules of the real one.
#[derive(Default)]
pub struct InMemoryBackend {
    pub state: Mutex<State>,
}

impl InMemoryBackend {
    pub fn with_ads(ads: Vec<Ad>) -> Arc<Self> {
        let backend = Self::default();
        backend.state.lock().unwrap().ads = ads;
        Arc::new(backend)
    }

    pub fn add_review(&self, ad_id: i64, rating: u8) {
        let mut state = self.state.lock().unwrap();
        let id = state.reviews.len() as i64 + 1;
        state.reviews.push(Review {
            id: Some(id),
            ad_id,
            author_id: Uuid::parse_str(OTHER).unwrap(),
            rating,
            comment: "ok".to_string(),
            created_at: Utc::now(),
        });
    }

    pub fn add_profile(&self, id: Uuid, image_path: Option<&str>) {
        self.state.lock().unwrap().profiles.push(Profile {
            id,
            name: "Anna".to_string(),
            last_name: "Nowak".to_string(),
            description: None,
            image_path: image_path.map(str::to_string),
        });
    }

    pub fn ad(&self, id: i64) -> Option<Ad> {
        self.state.lock().unwrap().ads.iter().find(|a| a.id == id).cloned()
    }

    fn row(&self, state: &State, ad: &Ad) -> ListingRow {
        let image_path = state
            .profiles
            .iter()
            .find(|p| p.id == ad.owner_id)
            .and_then(|p| p.image_path.clone());
        ListingRow {
            ad: ad.clone(),
            profiles: Some(ImagePathRef { image_path }),
            subjects: None,
            scopes: None,
            reviews: state
                .reviews
                .iter()
                .filter(|r| r.ad_id == ad.id)
                .map(|r| RatingRef { rating: r.rating })
                .collect(),
        }
    }
}

#[async_trait]
impl MarketplaceBackend for InMemoryBackend {
    async fn fetch_listing(&self) -> Result<Vec<ListingRow>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ads
            .iter()
            .filter(|a| state.listing_ignores_status || !a.is_archived())
            .map(|a| self.row(&state, a))
            .collect())
    }

    async fn fetch_ad(&self, id: i64) -> Result<ListingRow> {
        let state = self.state.lock().unwrap();
        state
            .ads
            .iter()
            .find(|a| a.id == id)
            .map(|a| self.row(&state, a))
            .ok_or_else(|| ClientError::NotFound(format!("ad {id}")))
    }

    async fn fetch_owned_ads(&self, session: &Session) -> Result<Vec<OwnedAdSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ads
            .iter()
            .filter(|a| a.owner_id == session.user_id)
            .map(|a| OwnedAdSummary {
                id: a.id,
                title: a.title.clone(),
                status: a.status,
                subject_name: Subject::from_id(a.subject_id).map(Subject::name).unwrap_or_default().to_string(),
                scope_name: Scope::from_id(a.scope_id).map(Scope::name).unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn fetch_map_pins(&self) -> Result<Vec<MapPin>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ads
            .iter()
            .filter(|a| !a.is_archived())
            .filter_map(|a| {
                let c = a.coordinates()?;
                Some(MapPin {
                    ad_id: a.id,
                    title: a.title.clone(),
                    price: a.price,
                    latitude: c.latitude,
                    longitude: c.longitude,
                })
            })
            .collect())
    }

    async fn insert_ad(&self, _session: &Session, new_ad: &NewAd) -> Result<Ad> {
        let mut state = self.state.lock().unwrap();
        let p = &new_ad.payload;
        let ad = Ad {
            id: state.ads.iter().map(|a| a.id).max().unwrap_or(0) + 1,
            title: p.title.clone(),
            description: p.description.clone(),
            price: p.price,
            address: p.address.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            contact_info: p.contact_info.clone(),
            status: new_ad.status,
            is_remote: p.is_remote,
            is_in_person: p.is_in_person,
            subject_id: p.subject_id,
            scope_id: p.scope_id,
            owner_id: new_ad.user_id,
        };
        state.ads.push(ad.clone());
        Ok(ad)
    }

    async fn update_ad(&self, session: &Session, id: i64, p: &AdPayload) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let ad = state
            .ads
            .iter_mut()
            .find(|a| a.id == id && a.owner_id == session.user_id)
            .ok_or_else(|| ClientError::NotFound(format!("ad {id}")))?;
        ad.title = p.title.clone();
        ad.description = p.description.clone();
        ad.price = p.price;
        ad.address = p.address.clone();
        ad.latitude = p.latitude;
        ad.longitude = p.longitude;
        ad.contact_info = p.contact_info.clone();
        ad.is_remote = p.is_remote;
        ad.is_in_person = p.is_in_person;
        ad.subject_id = p.subject_id;
        ad.scope_id = p.scope_id;
        Ok(())
    }

    async fn set_ad_status(&self, session: &Session, id: i64, status: AdStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let ad = state
            .ads
            .iter_mut()
            .find(|a| a.id == id && a.owner_id == session.user_id)
            .ok_or_else(|| ClientError::NotFound(format!("ad {id}")))?;
        ad.status = status;
        Ok(())
    }

    async fn fetch_reviews(&self, ad_id: i64) -> Result<Vec<Review>> {
        let state = self.state.lock().unwrap();
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.ad_id == ad_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn insert_review(&self, _session: &Session, review: &NewReview) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let id = state.reviews.len() as i64 + 1;
        state.reviews.push(Review {
            id: Some(id),
            ad_id: review.ad_id,
            author_id: review.author_id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Profile> {
        let state = self.state.lock().unwrap();
        state
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("profile {user_id}")))
    }

    async fn insert_profile(&self, _session: &Session, profile: &NewProfile) -> Result<()> {
        self.state.lock().unwrap().profiles.push(Profile {
            id: profile.id,
            name: profile.name.clone(),
            last_name: profile.last_name.clone(),
            description: None,
            image_path: None,
        });
        Ok(())
    }

    async fn update_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == session.user_id)
            .ok_or_else(|| ClientError::NotFound("profile".to_string()))?;
        if let Some(description) = &update.description {
            profile.description = Some(description.clone());
        }
        if let Some(path) = &update.image_path {
            profile.image_path = Some(path.clone());
        }
        Ok(())
    }

    async fn upload_avatar(
        &self,
        _session: &Session,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        self.state
            .lock()
            .unwrap()
            .avatars
            .push((path.to_string(), bytes, content_type.to_string()));
        Ok(path.to_string())
    }

    async fn download_avatar(&self, path: &str) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state
            .avatars
            .iter()
            .find(|(p, _, _)| p == path)
            .map(|(_, bytes, _)| bytes.clone())
            .ok_or_else(|| ClientError::NotFound(path.to_string()))
    }

    fn public_avatar_url(&self, path: &str) -> String {
        format!("https://test.local/storage/v1/object/public/avatars/{path}")
    }

    fn source_name(&self) -> &'static str {
        "in-memory"
    }
}

/// Payment gateway recording every request.
#[derive(Default)]
pub struct FakePayments {
    pub requests: Mutex<Vec<PaymentRequest>>,
    pub fail: bool,
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_intent(&self, _session: &Session, request: &PaymentRequest) -> Result<PaymentIntent> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ClientError::Payment("failed to fetch payment intent".to_string()));
        }
        Ok(serde_json::from_value(serde_json::json!({ "paymentIntent": "pi_test_secret_x" })).unwrap())
    }
}

pub struct Confirm(pub bool);

#[async_trait]
impl PaymentConfirmer for Confirm {
    async fn confirm(&self, _intent: &PaymentIntent) -> Result<()> {
        if self.0 {
            Ok(())
        } else {
            Err(ClientError::Payment("payment cancelled".to_string()))
        }
    }
}

pub struct FixedGeocoder(pub Result<Option<Coordinates>>);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>> {
        match &self.0 {
            Ok(coords) => Ok(*coords),
            Err(_) => Err(ClientError::validation("geocoder unavailable")),
        }
    }
}

pub fn market(backend: Arc<InMemoryBackend>, payments: Arc<FakePayments>, signed_in: bool) -> Marketplace {
    let session = signed_in.then(owner_session);
    Marketplace::new(backend, payments).with_session(session)
}
