use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use uuid::Uuid;

use crate::backend::Session;
use crate::error::{ClientError, Result};

pub const DEFAULT_PAYMENT_FUNCTION: &str = "intentk";
/// 50 PLN, in minor units.
pub const DEFAULT_LISTING_FEE_MINOR: i64 = 5000;
pub const DEFAULT_LISTING_FEE_CURRENCY: &str = "pln";

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub anon_key: String,
    pub session: Option<Session>,
    pub payment_function: String,
    pub listing_fee_minor: i64,
    pub listing_fee_currency: String,
    pub http_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    /// Load `.env` (if present) and read the client settings from the environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is this over `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ClientError::Config(format!("{key} must be set")))
        };

        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let anon_key = required("SUPABASE_ANON_KEY")?;

        let session = match (lookup("SUPABASE_ACCESS_TOKEN"), lookup("SUPABASE_USER_ID")) {
            (Some(access_token), Some(user_id)) => {
                let user_id = Uuid::parse_str(user_id.trim()).map_err(|e| {
                    ClientError::Config(format!("SUPABASE_USER_ID is not a UUID: {e}"))
                })?;
                Some(Session {
                    user_id,
                    access_token,
                })
            }
            (None, None) => None,
            _ => {
                return Err(ClientError::Config(
                    "SUPABASE_ACCESS_TOKEN and SUPABASE_USER_ID must be set together".to_string(),
                ))
            }
        };

        let payment_function = lookup("PAYMENT_FUNCTION")
            .unwrap_or_else(|| DEFAULT_PAYMENT_FUNCTION.to_string());

        let listing_fee_minor = match lookup("LISTING_FEE_MINOR") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|fee| *fee > 0)
                .ok_or_else(|| {
                    ClientError::Config(format!("LISTING_FEE_MINOR is not a positive integer: {raw}"))
                })?,
            None => DEFAULT_LISTING_FEE_MINOR,
        };

        let listing_fee_currency = lookup("LISTING_FEE_CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| DEFAULT_LISTING_FEE_CURRENCY.to_string());

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("HTTP_TIMEOUT_SECS is not a number: {raw}"))
            })?),
            None => Duration::from_secs(30),
        };

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            supabase_url,
            anon_key,
            session,
            payment_function,
            listing_fee_minor,
            listing_fee_currency,
            http_timeout,
            rust_log,
        })
    }
}
