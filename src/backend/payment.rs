use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use super::supabase::decode;
use super::traits::PaymentGateway;
use super::types::{PaymentIntent, PaymentRequest, Session};
use crate::config::Config;
use crate::error::{ClientError, Result};

/// Payment intents created by a backend edge function, which holds the
/// payment provider's secret key.
pub struct EdgeFunctionPayments {
    client: Client,
    function_url: String,
    anon_key: String,
}

impl EdgeFunctionPayments {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::with_client(
            client,
            &config.supabase_url,
            &config.payment_function,
            &config.anon_key,
        ))
    }

    pub fn with_client(client: Client, base_url: &str, function: &str, anon_key: &str) -> Self {
        Self {
            client,
            function_url: format!("{}/functions/v1/{}", base_url.trim_end_matches('/'), function),
            anon_key: anon_key.to_string(),
        }
    }

    pub fn function_url(&self) -> &str {
        &self.function_url
    }
}

#[async_trait]
impl PaymentGateway for EdgeFunctionPayments {
    async fn create_intent(&self, session: &Session, request: &PaymentRequest) -> Result<PaymentIntent> {
        info!(
            "Requesting payment intent for {} {}",
            request.amount, request.currency
        );

        let response = self
            .client
            .post(&self.function_url)
            .bearer_auth(&session.access_token)
            .header("apikey", &self.anon_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Payment function returned status: {}", status);
            return Err(ClientError::Payment(format!(
                "failed to fetch payment intent ({status})"
            )));
        }

        let body = response.text().await?;
        decode(&body, "payment intent")
    }
}
