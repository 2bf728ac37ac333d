//! Identity collaborator: account validation at the service boundary

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::CollaboratorsConfig,
    error::{AppError, AppResult},
    models::{HolderIdentity, Role},
};

#[cfg(test)]
use mockall::automock;

/// Validation of holder accounts, owned by the user service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Look up the account. `NotFound` for unknown ids,
    /// `CollaboratorUnavailable` when the user service cannot be reached.
    async fn validate(&self, holder_id: i64) -> AppResult<HolderIdentity>;
}

/// Wire shape of the user service's validation endpoint
#[derive(Debug, Deserialize)]
struct ValidationResponse {
    active: bool,
    role: Role,
}

/// HTTP client for the user service
#[derive(Clone)]
pub struct HttpIdentityService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityService {
    pub fn new(config: &CollaboratorsConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.identity_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn validate(&self, holder_id: i64) -> AppResult<HolderIdentity> {
        let url = format!("{}/{}/validate", self.base_url, holder_id);
        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::CollaboratorUnavailable(format!("Identity service: {}", e))
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("User {} not found", holder_id)));
        }
        if !response.status().is_success() {
            return Err(AppError::CollaboratorUnavailable(format!(
                "Identity service returned {}",
                response.status()
            )));
        }

        let body: ValidationResponse = response.json().await.map_err(|e| {
            AppError::CollaboratorUnavailable(format!("Identity service payload: {}", e))
        })?;

        Ok(HolderIdentity {
            holder_id,
            active: body.active,
            role: body.role,
        })
    }
}
