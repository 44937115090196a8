use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::traits::MarketplaceBackend;
use super::types::Session;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::{
    Ad, AdPayload, AdStatus, ListingRow, MapPin, NewAd, NewProfile, NewReview, OwnedAdSummary,
    Profile, ProfileUpdate, Review,
};

pub const AVATAR_BUCKET: &str = "avatars";

const LISTING_SELECT: &str = "*,profiles(image_path),subjects(name),scopes(name),reviews(rating)";
const DETAIL_SELECT: &str = "*,subjects(name),scopes(name)";
const OWNED_SELECT: &str = "id,title,status,subjects(name),scopes(name)";
const MAP_SELECT: &str = "id,latitude,longitude,title,price";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
/// Rows that were never given a status count as active; `neq` alone drops NULLs.
const NOT_ARCHIVED: (&str, &str) = ("or", "(status.is.null,status.neq.archive)");

/// PostgREST + Storage client for a Supabase project.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("tutor-scout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, &config.supabase_url, &config.anon_key))
    }

    pub fn with_client(client: Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn storage_object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            AVATAR_BUCKET,
            path.trim_start_matches('/')
        )
    }

    /// `apikey` always; `Authorization` carries the user's token when there is
    /// one, the anon key otherwise.
    fn request(&self, method: Method, url: String, session: Option<&Session>) -> RequestBuilder {
        let token = session.map_or(self.anon_key.as_str(), |s| s.access_token.as_str());
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, bearer);
        }
        self.client.request(method, url).headers(headers)
    }

    fn listing_request(&self) -> RequestBuilder {
        self.request(Method::GET, self.rest_url("ads"), None)
            .query(&[("select", LISTING_SELECT), NOT_ARCHIVED])
    }

    fn map_request(&self) -> RequestBuilder {
        self.request(Method::GET, self.rest_url("ads"), None)
            .query(&[("select", MAP_SELECT), NOT_ARCHIVED])
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, entity: &'static str) -> Result<T> {
        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        debug!("Decoding {} ({} bytes)", entity, body.len());
        decode(&body, entity)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }

    /// PATCH one of the session user's ads and fail if nothing matched.
    async fn patch_owned_ad<B: serde::Serialize + Sync>(
        &self,
        session: &Session,
        id: i64,
        body: &B,
    ) -> Result<()> {
        let request = self
            .request(Method::PATCH, self.rest_url("ads"), Some(session))
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .header("Prefer", "return=representation")
            .json(body);

        let updated: Vec<Ad> = self.fetch(request, "updated ad").await?;
        if updated.is_empty() {
            return Err(ClientError::NotFound(format!("ad {id} owned by {}", session.user_id)));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct PostgrestError {
    message: String,
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Backend returned status: {}", status);
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<PostgrestError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ClientError::Api { status, message }
}

/// Decode a response body into its row type, naming the entity on failure.
pub fn decode<T: DeserializeOwned>(body: &str, entity: &'static str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| ClientError::decode(entity, e))
}

/// A single-object request that matched no row comes back as 406.
fn not_found_on_empty(err: ClientError, what: String) -> ClientError {
    match err {
        ClientError::Api {
            status: StatusCode::NOT_ACCEPTABLE,
            ..
        } => ClientError::NotFound(what),
        other => other,
    }
}

#[derive(Deserialize)]
struct MapRow {
    id: i64,
    title: String,
    price: f64,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl MarketplaceBackend for SupabaseClient {
    async fn fetch_listing(&self) -> Result<Vec<ListingRow>> {
        info!("Fetching listing from {}", self.base_url);
        let rows: Vec<ListingRow> = self.fetch(self.listing_request(), "ad listing").await?;
        info!("Fetched {} ads", rows.len());
        Ok(rows)
    }

    async fn fetch_ad(&self, id: i64) -> Result<ListingRow> {
        debug!("Fetching ad {}", id);
        let request = self
            .request(Method::GET, self.rest_url("ads"), None)
            .query(&[("select", DETAIL_SELECT.to_string()), ("id", format!("eq.{id}"))])
            .header(ACCEPT, SINGLE_OBJECT);
        self.fetch(request, "ad")
            .await
            .map_err(|e| not_found_on_empty(e, format!("ad {id}")))
    }

    async fn fetch_owned_ads(&self, session: &Session) -> Result<Vec<OwnedAdSummary>> {
        let request = self
            .request(Method::GET, self.rest_url("ads"), Some(session))
            .query(&[
                ("select", OWNED_SELECT.to_string()),
                ("user_id", format!("eq.{}", session.user_id)),
                ("order", "id.desc".to_string()),
            ]);
        self.fetch(request, "owned ads").await
    }

    async fn fetch_map_pins(&self) -> Result<Vec<MapPin>> {
        let rows: Vec<MapRow> = self.fetch(self.map_request(), "map locations").await?;
        let total = rows.len();
        let pins: Vec<MapPin> = rows
            .into_iter()
            .filter_map(|row| match (row.latitude, row.longitude) {
                (Some(latitude), Some(longitude)) => Some(MapPin {
                    ad_id: row.id,
                    title: row.title,
                    price: row.price,
                    latitude,
                    longitude,
                }),
                _ => None,
            })
            .collect();
        debug!("{} of {} ads have a location", pins.len(), total);
        Ok(pins)
    }

    async fn insert_ad(&self, session: &Session, ad: &NewAd) -> Result<Ad> {
        let request = self
            .request(Method::POST, self.rest_url("ads"), Some(session))
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(ad);
        let inserted: Ad = self.fetch(request, "inserted ad").await?;
        info!("Inserted ad {}", inserted.id);
        Ok(inserted)
    }

    async fn update_ad(&self, session: &Session, id: i64, payload: &AdPayload) -> Result<()> {
        self.patch_owned_ad(session, id, payload).await?;
        info!("Updated ad {}", id);
        Ok(())
    }

    async fn set_ad_status(&self, session: &Session, id: i64, status: AdStatus) -> Result<()> {
        self.patch_owned_ad(session, id, &serde_json::json!({ "status": status }))
            .await?;
        info!("Ad {} is now {:?}", id, status);
        Ok(())
    }

    async fn fetch_reviews(&self, ad_id: i64) -> Result<Vec<Review>> {
        let request = self
            .request(Method::GET, self.rest_url("reviews"), None)
            .query(&[
                ("select", "*".to_string()),
                ("ad_id", format!("eq.{ad_id}")),
                ("order", "created_at.desc".to_string()),
            ]);
        self.fetch(request, "reviews").await
    }

    async fn insert_review(&self, session: &Session, review: &NewReview) -> Result<()> {
        let request = self
            .request(Method::POST, self.rest_url("reviews"), Some(session))
            .json(review);
        self.execute(request).await
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Profile> {
        let request = self
            .request(Method::GET, self.rest_url("profiles"), None)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{user_id}"))])
            .header(ACCEPT, SINGLE_OBJECT);
        self.fetch(request, "profile")
            .await
            .map_err(|e| not_found_on_empty(e, format!("profile {user_id}")))
    }

    async fn insert_profile(&self, session: &Session, profile: &NewProfile) -> Result<()> {
        let request = self
            .request(Method::POST, self.rest_url("profiles"), Some(session))
            .json(profile);
        self.execute(request).await
    }

    async fn update_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<()> {
        if update.is_empty() {
            debug!("Nothing to update on profile {}", session.user_id);
            return Ok(());
        }
        let request = self
            .request(Method::PATCH, self.rest_url("profiles"), Some(session))
            .query(&[("id", format!("eq.{}", session.user_id))])
            .json(update);
        self.execute(request).await
    }

    async fn upload_avatar(
        &self,
        session: &Session,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        info!("Uploading avatar {} ({} bytes)", path, bytes.len());
        let request = self
            .request(Method::POST, self.storage_object_url(path), Some(session))
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        self.execute(request).await?;
        Ok(path.to_string())
    }

    async fn download_avatar(&self, path: &str) -> Result<Vec<u8>> {
        let request = self.request(Method::GET, self.storage_object_url(path), None);
        let response = check_status(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn public_avatar_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            AVATAR_BUCKET,
            path.trim_start_matches('/')
        )
    }

    fn source_name(&self) -> &'static str {
        "Supabase"
    }
}
