use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user, as handed over by the (external) sign-in flow.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Body of the payment-intent function call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub currency: String,
    /// Minor units (grosze for PLN).
    pub amount: i64,
    pub items: Vec<PaymentItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentItem {
    pub id: String,
}

impl PaymentRequest {
    pub const LISTING_FEE_ITEM: &'static str = "listing_fee";

    pub fn listing_fee(amount: i64, currency: &str) -> Self {
        Self {
            currency: currency.to_lowercase(),
            amount,
            items: vec![PaymentItem {
                id: Self::LISTING_FEE_ITEM.to_string(),
            }],
        }
    }
}

/// Client secret of a payment intent, to be confirmed on the device.
#[derive(Clone, Deserialize, PartialEq)]
pub struct PaymentIntent {
    #[serde(rename = "paymentIntent")]
    pub client_secret: String,
}

impl fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.client_secret.split("_secret").next().unwrap_or_default();
        f.debug_struct("PaymentIntent").field("id", &id).finish()
    }
}
