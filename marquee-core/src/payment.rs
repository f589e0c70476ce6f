use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Succeeded,
    Declined,
}

/// Result of a charge. `reference` is the provider's receipt id and is the
/// only piece of payment state the reservation core keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub reference: String,
    pub amount_cents: i32,
    pub currency: String,
    pub status: PaymentStatus,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),
    #[error("payment provider error: {0}")]
    Provider(String),
}

/// Charges the locally computed total and hands back a reference string.
/// The core never validates amounts against provider state.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        holder: &str,
        amount_cents: i32,
        currency: &str,
        token: &str,
    ) -> Result<PaymentReceipt, PaymentError>;
}

/// Gateway stand-in for local runs and tests. Approves everything except a
/// token of `"DECLINE"`, which exercises the failure path end to end.
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(
        &self,
        holder: &str,
        amount_cents: i32,
        currency: &str,
        token: &str,
    ) -> Result<PaymentReceipt, PaymentError> {
        if token == "DECLINE" {
            return Err(PaymentError::Declined("card declined by issuer".into()));
        }

        let suffix: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(9)
            .map(|c| (c as char).to_ascii_lowercase())
            .collect();
        let reference = format!("PAY_{}_{}", Utc::now().timestamp_millis(), suffix);

        tracing::info!(holder, amount_cents, currency, "mock payment approved: {}", reference);

        Ok(PaymentReceipt {
            reference,
            amount_cents,
            currency: currency.to_owned(),
            status: PaymentStatus::Succeeded,
            processed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_gateway_issues_references() {
        let receipt = MockPaymentGateway
            .charge("guest-1", 2500, "USD", "tok_visa")
            .await
            .unwrap();
        assert!(receipt.reference.starts_with("PAY_"));
        assert_eq!(receipt.status, PaymentStatus::Succeeded);
        assert_eq!(receipt.amount_cents, 2500);
    }

    #[tokio::test]
    async fn decline_token_fails() {
        let err = MockPaymentGateway
            .charge("guest-1", 2500, "USD", "DECLINE")
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Declined(_)));
    }
}
