//! Fine ledger collaborator: charge records owned by the payment service

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::CollaboratorsConfig,
    error::{AppError, AppResult},
};

#[cfg(test)]
use mockall::automock;

/// Kind of charge recorded against a holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineKind {
    Overdue,
    LostBook,
}

/// Fine creation on the payment service.
///
/// Fire-and-forget from the core's perspective: the loan transition is the
/// source of truth and a failed fine call is logged by the caller, never
/// rolled into the parent operation's result.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FineLedger: Send + Sync {
    async fn create_fine(
        &self,
        holder_id: i64,
        loan_id: Uuid,
        title_key: &str,
        kind: FineKind,
        amount: f64,
    ) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct CreateFineRequest<'a> {
    holder_id: i64,
    loan_id: Uuid,
    title_key: &'a str,
    kind: FineKind,
    amount: f64,
    description: String,
}

/// HTTP client for the payment service
#[derive(Clone)]
pub struct HttpFineLedger {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFineLedger {
    pub fn new(config: &CollaboratorsConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.fines_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FineLedger for HttpFineLedger {
    async fn create_fine(
        &self,
        holder_id: i64,
        loan_id: Uuid,
        title_key: &str,
        kind: FineKind,
        amount: f64,
    ) -> AppResult<()> {
        let description = match kind {
            FineKind::Overdue => format!("Overdue fine for loan {}", loan_id),
            FineKind::LostBook => format!("Lost book replacement for loan {}", loan_id),
        };
        let body = CreateFineRequest {
            holder_id,
            loan_id,
            title_key,
            kind,
            amount,
            description,
        };

        let response = self
            .client
            .post(format!("{}/fines", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::CollaboratorUnavailable(format!("Fine ledger: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::CollaboratorUnavailable(format!(
                "Fine ledger returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
