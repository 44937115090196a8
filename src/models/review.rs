use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, Result};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A review left on an ad. Reviews are immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub ad_id: i64,
    #[serde(rename = "user_id")]
    pub author_id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewReview {
    pub ad_id: i64,
    #[serde(rename = "user_id")]
    pub author_id: Uuid,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    /// Rating must be an integer in 1..=5 and the comment must not be blank.
    pub fn new(ad_id: i64, author_id: Uuid, rating: i64, comment: &str) -> Result<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ClientError::validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
            )));
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ClientError::validation("review comment cannot be empty"));
        }
        Ok(Self {
            ad_id,
            author_id,
            rating: rating as u8,
            comment: comment.to_string(),
        })
    }
}
