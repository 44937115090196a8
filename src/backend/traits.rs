use async_trait::async_trait;
use uuid::Uuid;

use super::types::{PaymentIntent, PaymentRequest, Session};
use crate::error::Result;
use crate::models::{
    Ad, AdPayload, AdStatus, Coordinates, ListingRow, MapPin, NewAd, NewProfile, NewReview,
    OwnedAdSummary, Profile, ProfileUpdate, Review,
};

/// Remote data layer: tables, object storage and public URLs.
///
/// Every record is decoded into its typed row before it leaves an
/// implementation; callers never see raw JSON.
#[async_trait]
pub trait MarketplaceBackend: Send + Sync {
    /// Ads that are not archived, with owner avatar, subject, scope and ratings embedded.
    async fn fetch_listing(&self) -> Result<Vec<ListingRow>>;

    async fn fetch_ad(&self, id: i64) -> Result<ListingRow>;

    async fn fetch_owned_ads(&self, session: &Session) -> Result<Vec<OwnedAdSummary>>;

    async fn fetch_map_pins(&self) -> Result<Vec<MapPin>>;

    async fn insert_ad(&self, session: &Session, ad: &NewAd) -> Result<Ad>;

    /// Overwrite the editable columns of one of the session user's ads.
    async fn update_ad(&self, session: &Session, id: i64, payload: &AdPayload) -> Result<()>;

    async fn set_ad_status(&self, session: &Session, id: i64, status: AdStatus) -> Result<()>;

    /// Newest first.
    async fn fetch_reviews(&self, ad_id: i64) -> Result<Vec<Review>>;

    async fn insert_review(&self, session: &Session, review: &NewReview) -> Result<()>;

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Profile>;

    async fn insert_profile(&self, session: &Session, profile: &NewProfile) -> Result<()>;

    async fn update_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<()>;

    /// Store an avatar object and return its path inside the avatars bucket.
    async fn upload_avatar(
        &self,
        session: &Session,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;

    async fn download_avatar(&self, path: &str) -> Result<Vec<u8>>;

    fn public_avatar_url(&self, path: &str) -> String;

    /// Name of the backend, for logs.
    fn source_name(&self) -> &'static str;
}

/// Creates payment intents for the listing fee.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, session: &Session, request: &PaymentRequest) -> Result<PaymentIntent>;
}

/// Confirms a payment intent with the payer (wallet sheet, card form, ...).
#[async_trait]
pub trait PaymentConfirmer: Send + Sync {
    async fn confirm(&self, intent: &PaymentIntent) -> Result<()>;
}

/// Address to coordinates. `Ok(None)` means the address was not found.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;
}

/// Geocoder that answers with coordinates the user typed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualCoordinates(pub Option<Coordinates>);

#[async_trait]
impl Geocoder for ManualCoordinates {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>> {
        Ok(self.0)
    }
}
