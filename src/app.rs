use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::avatar;
use crate::backend::{
    EdgeFunctionPayments, Geocoder, MarketplaceBackend, PaymentConfirmer, PaymentGateway,
    PaymentRequest, Session, SupabaseClient,
};
use crate::config::{Config, DEFAULT_LISTING_FEE_CURRENCY, DEFAULT_LISTING_FEE_MINOR};
use crate::error::{ClientError, Result};
use crate::listing::ListingStore;
use crate::models::ad::average_rating;
use crate::models::{
    Ad, AdDetails, AdDraft, AdStatus, AdWithStats, Coordinates, ListingRow, MapPin, NewAd,
    NewProfile, NewReview, OwnedAdSummary, Profile, ProfileUpdate,
};

/// Application context. Owns the backend handles and the current session;
/// every screen operation goes through it.
pub struct Marketplace {
    backend: Arc<dyn MarketplaceBackend>,
    payments: Arc<dyn PaymentGateway>,
    session: Option<Session>,
    listing_fee: PaymentRequest,
}

impl Marketplace {
    pub fn new(backend: Arc<dyn MarketplaceBackend>, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            backend,
            payments,
            session: None,
            listing_fee: PaymentRequest::listing_fee(
                DEFAULT_LISTING_FEE_MINOR,
                DEFAULT_LISTING_FEE_CURRENCY,
            ),
        }
    }

    /// Wire up the Supabase backend and payment function described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = Arc::new(SupabaseClient::new(config)?);
        let payments = Arc::new(EdgeFunctionPayments::new(config)?);
        Ok(Self::new(backend, payments)
            .with_session(config.session.clone())
            .with_listing_fee(config.listing_fee_minor, &config.listing_fee_currency))
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn with_listing_fee(mut self, amount_minor: i64, currency: &str) -> Self {
        self.listing_fee = PaymentRequest::listing_fee(amount_minor, currency);
        self
    }

    pub fn listing_fee(&self) -> &PaymentRequest {
        &self.listing_fee
    }

    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(ClientError::NotAuthenticated)
    }

    /// Fetch the listing and project every row to its read-time stats.
    /// Archived ads never reach the listing, whatever the backend returned.
    pub async fn fetch_listing(&self) -> Result<Vec<AdWithStats>> {
        let rows = self.backend.fetch_listing().await?;
        Ok(rows
            .into_iter()
            .filter(|row| !row.ad.is_archived())
            .map(|row| self.project(row))
            .collect())
    }

    /// Listing screen: a store loaded with the current listing.
    pub async fn browse(&self, user_location: Option<Coordinates>) -> Result<ListingStore> {
        let ads = self.fetch_listing().await?;
        let mut store = ListingStore::with_ads(ads);
        store.set_user_location(user_location);
        Ok(store)
    }

    fn project(&self, row: ListingRow) -> AdWithStats {
        let subject_name = row.subject_name();
        let scope_name = row.scope_name();
        let image_url = row.owner_image_path().map(|p| self.backend.public_avatar_url(p));
        let ratings: Vec<u8> = row.reviews.iter().map(|r| r.rating).collect();
        AdWithStats::new(row.ad, subject_name, scope_name, &ratings, image_url)
    }

    pub async fn ad_details(&self, id: i64) -> Result<AdDetails> {
        let (row, reviews) =
            tokio::try_join!(self.backend.fetch_ad(id), self.backend.fetch_reviews(id))?;
        let subject_name = row.subject_name();
        let scope_name = row.scope_name();
        let average_rating = average_rating(reviews.iter().map(|r| r.rating));
        Ok(AdDetails {
            ad: row.ad,
            subject_name,
            scope_name,
            reviews,
            average_rating,
        })
    }

    pub async fn add_review(&self, ad_id: i64, rating: i64, comment: &str) -> Result<()> {
        let session = self.session()?;
        let review = NewReview::new(ad_id, session.user_id, rating, comment)?;
        self.backend.insert_review(session, &review).await?;
        info!("Review added to ad {}", ad_id);
        Ok(())
    }

    pub async fn my_ads(&self) -> Result<Vec<OwnedAdSummary>> {
        let session = self.session()?;
        self.backend.fetch_owned_ads(session).await
    }

    pub async fn archive_ad(&self, id: i64) -> Result<()> {
        let session = self.session()?;
        self.backend
            .set_ad_status(session, id, AdStatus::Archived)
            .await
    }

    /// Edit screen prefill. Only the owner may open an ad for editing.
    pub async fn load_ad_for_edit(&self, id: i64) -> Result<AdDraft> {
        let session = self.session()?;
        let row = self.backend.fetch_ad(id).await?;
        if row.ad.owner_id != session.user_id {
            return Err(ClientError::NotFound(format!("ad {id} owned by {}", session.user_id)));
        }
        Ok(AdDraft::from_ad(&row.ad))
    }

    /// Save edits. The address is geocoded again only when it changed.
    pub async fn save_ad_edits(
        &self,
        id: i64,
        mut draft: AdDraft,
        address_changed: bool,
        geocoder: &dyn Geocoder,
    ) -> Result<()> {
        let session = self.session()?;
        draft.validate()?;
        if address_changed {
            geocode_draft(&mut draft, geocoder).await;
        }
        let payload = draft.validate()?;
        self.backend.update_ad(session, id, &payload).await
    }

    /// Paid submission: validate, geocode, take the listing fee, then insert.
    /// Nothing is written unless the payment was confirmed.
    pub async fn submit_ad(
        &self,
        mut draft: AdDraft,
        geocoder: &dyn Geocoder,
        confirmer: &dyn PaymentConfirmer,
    ) -> Result<Ad> {
        let session = self.session()?;
        draft.validate()?;
        geocode_draft(&mut draft, geocoder).await;
        let payload = draft.validate()?;

        info!("Starting listing fee payment");
        let intent = self.payments.create_intent(session, &self.listing_fee).await?;
        debug!("Confirming {:?}", intent);
        confirmer.confirm(&intent).await?;
        info!("Payment confirmed, saving ad");

        let new_ad = NewAd {
            payload,
            user_id: session.user_id,
            status: AdStatus::Active,
        };
        self.backend.insert_ad(session, &new_ad).await
    }

    pub async fn map_pins(&self) -> Result<Vec<MapPin>> {
        self.backend.fetch_map_pins().await
    }

    pub async fn register_profile(&self, name: &str, last_name: &str) -> Result<()> {
        let session = self.session()?;
        let profile = NewProfile::new(session.user_id, name, last_name)?;
        self.backend.insert_profile(session, &profile).await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Profile> {
        self.backend.fetch_profile(user_id).await
    }

    pub async fn my_profile(&self) -> Result<Profile> {
        let session = self.session()?;
        self.backend.fetch_profile(session.user_id).await
    }

    pub async fn update_description(&self, description: &str) -> Result<()> {
        let session = self.session()?;
        let update = ProfileUpdate {
            description: Some(description.trim().to_string()),
            ..ProfileUpdate::default()
        };
        self.backend.update_profile(session, &update).await
    }

    /// Upload a new avatar and point the profile at it. Returns the object path.
    pub async fn upload_avatar(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String> {
        let session = self.session()?;
        if bytes.is_empty() {
            return Err(ClientError::validation("avatar image is empty"));
        }
        let path = avatar::object_path(file_name, Utc::now().timestamp_millis())?;
        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| {
                let ext = path.rsplit('.').next().unwrap_or(avatar::DEFAULT_EXTENSION);
                avatar::content_type_for(ext).to_string()
            });

        let stored = self
            .backend
            .upload_avatar(session, &path, bytes, &content_type)
            .await?;
        let update = ProfileUpdate {
            image_path: Some(stored.clone()),
            ..ProfileUpdate::default()
        };
        self.backend.update_profile(session, &update).await?;
        info!("Avatar updated to {}", stored);
        Ok(stored)
    }

    pub fn avatar_url(&self, path: &str) -> String {
        self.backend.public_avatar_url(path)
    }

    pub async fn download_avatar(&self, path: &str) -> Result<Vec<u8>> {
        self.backend.download_avatar(path).await
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.source_name()
    }
}

/// Best-effort geocoding of in-person drafts. Any failure leaves the
/// coordinates empty.
async fn geocode_draft(draft: &mut AdDraft, geocoder: &dyn Geocoder) {
    if !draft.is_in_person || draft.address.trim().is_empty() {
        draft.coordinates = None;
        return;
    }
    draft.coordinates = match geocoder.geocode(draft.address.trim()).await {
        Ok(Some(coords)) => {
            debug!("Geocoded {:?} to {:?}", draft.address, coords);
            Some(coords)
        }
        Ok(None) => {
            warn!("Address not found, saving without coordinates: {}", draft.address);
            None
        }
        Err(e) => {
            warn!("Geocoding failed, saving without coordinates: {}", e);
            None
        }
    };
}
