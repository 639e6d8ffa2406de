//! Stripe payment provider client
//!
//! Talks to the Stripe HTTP API directly with reqwest rather than through a
//! vendor SDK. When no secret key is configured (local development, CI) the
//! client falls back to simulated intents so the rest of the flow stays
//! exercisable.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Stripe client errors
#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Stripe request failed: {0}")]
    RequestFailed(String),

    #[error("Stripe returned an error: {0}")]
    ApiError(String),
}

impl From<reqwest::Error> for StripeError {
    fn from(e: reqwest::Error) -> Self {
        StripeError::RequestFailed(e.to_string())
    }
}

/// Subset of the payment-intent resource this service consumes
#[derive(Debug, Deserialize, Clone)]
pub struct StripeIntent {
    pub id: String,
    pub status: String,
    pub client_secret: Option<String>,
}

/// Subset of the refund resource
#[derive(Debug, Deserialize, Clone)]
pub struct StripeRefund {
    pub id: String,
    pub status: String,
}

const SIMULATED_PREFIX: &str = "pi_sim_";

/// Thin client over the Stripe REST API
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: Option<String>,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: Option<String>, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            api_base,
        }
    }

    /// Create a payment intent for `amount` minor units
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<StripeIntent, StripeError> {
        let Some(key) = &self.secret_key else {
            return Ok(self.simulated_intent());
        };

        let params = [
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(key)
            .form(&params)
            .send()
            .await?;

        Self::parse_intent(response).await
    }

    /// Retrieve a payment intent by id
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<StripeIntent, StripeError> {
        // Simulated intents confirm unconditionally
        if id.starts_with(SIMULATED_PREFIX) {
            return Ok(StripeIntent {
                id: id.to_string(),
                status: "succeeded".to_string(),
                client_secret: None,
            });
        }

        let Some(key) = &self.secret_key else {
            return Err(StripeError::ApiError(
                "Stripe secret key not configured".to_string(),
            ));
        };

        let response = self
            .http
            .get(format!("{}/v1/payment_intents/{}", self.api_base, id))
            .bearer_auth(key)
            .send()
            .await?;

        Self::parse_intent(response).await
    }

    /// Refund a payment intent
    pub async fn create_refund(&self, payment_intent_id: &str) -> Result<StripeRefund, StripeError> {
        if payment_intent_id.starts_with(SIMULATED_PREFIX) {
            return Ok(StripeRefund {
                id: format!("re_sim_{}", Uuid::new_v4().simple()),
                status: "succeeded".to_string(),
            });
        }

        let Some(key) = &self.secret_key else {
            return Err(StripeError::ApiError(
                "Stripe secret key not configured".to_string(),
            ));
        };

        let params = [("payment_intent", payment_intent_id.to_string())];

        let response = self
            .http
            .post(format!("{}/v1/refunds", self.api_base))
            .bearer_auth(key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::ApiError(body));
        }

        Ok(response.json::<StripeRefund>().await?)
    }

    fn simulated_intent(&self) -> StripeIntent {
        let id = format!("{}{}", SIMULATED_PREFIX, Uuid::new_v4().simple());

        tracing::warn!(
            intent_id = %id,
            "Stripe secret key not configured - issuing simulated payment intent"
        );

        StripeIntent {
            client_secret: Some(format!("{}_secret", id)),
            status: "requires_payment_method".to_string(),
            id,
        }
    }

    async fn parse_intent(response: reqwest::Response) -> Result<StripeIntent, StripeError> {
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::ApiError(body));
        }

        Ok(response.json::<StripeIntent>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_intent_without_key() {
        let client = StripeClient::new(None, "https://api.stripe.com".to_string());
        let intent = client.simulated_intent();
        assert!(intent.id.starts_with(SIMULATED_PREFIX));
        assert!(intent.client_secret.is_some());
    }

    #[tokio::test]
    async fn test_simulated_intent_confirms_as_succeeded() {
        let client = StripeClient::new(None, "https://api.stripe.com".to_string());
        let intent = client.simulated_intent();
        let retrieved = client.retrieve_payment_intent(&intent.id).await.unwrap();
        assert_eq!(retrieved.status, "succeeded");
    }

    #[tokio::test]
    async fn test_real_retrieve_requires_key() {
        let client = StripeClient::new(None, "https://api.stripe.com".to_string());
        let result = client.retrieve_payment_intent("pi_live_123").await;
        assert!(result.is_err());
    }
}
