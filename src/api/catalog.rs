//! Catalog stock endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppResult, models::CopyRecord, AppState};

/// Register title request
#[derive(Deserialize, ToSchema, Validate)]
pub struct RegisterTitleRequest {
    /// Unique catalog key (ISBN)
    #[validate(length(min = 1, max = 64))]
    pub title_key: String,
    /// Initial physical stock
    pub total_copies: u32,
}

/// Stock adjustment request
#[derive(Deserialize, ToSchema, Validate)]
pub struct AdjustCopiesRequest {
    /// Number of copies to add or retire
    #[validate(range(min = 1))]
    pub copies: u32,
}

/// Maintenance flag request
#[derive(Deserialize, ToSchema)]
pub struct MaintenanceRequest {
    pub maintenance: bool,
}

/// List all copy records
#[utoipa::path(
    get,
    path = "/titles",
    tag = "catalog",
    responses(
        (status = 200, description = "All copy records", body = Vec<CopyRecord>)
    )
)]
pub async fn list_titles(State(state): State<AppState>) -> Json<Vec<CopyRecord>> {
    Json(state.services.catalog.list_records())
}

/// Get one title's copy record
#[utoipa::path(
    get,
    path = "/titles/{key}",
    tag = "catalog",
    params(("key" = String, Path, description = "Title key")),
    responses(
        (status = 200, description = "Copy record", body = CopyRecord),
        (status = 404, description = "Title not found")
    )
)]
pub async fn get_title(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<CopyRecord>> {
    Ok(Json(state.services.catalog.get_record(&key)?))
}

/// Register a new title with its initial stock
#[utoipa::path(
    post,
    path = "/titles",
    tag = "catalog",
    request_body = RegisterTitleRequest,
    responses(
        (status = 201, description = "Title registered", body = CopyRecord),
        (status = 409, description = "Title already registered")
    )
)]
pub async fn register_title(
    State(state): State<AppState>,
    Json(request): Json<RegisterTitleRequest>,
) -> AppResult<(StatusCode, Json<CopyRecord>)> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;
    let record = state
        .services
        .catalog
        .register_title(&request.title_key, request.total_copies)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Add newly acquired copies
#[utoipa::path(
    post,
    path = "/titles/{key}/copies",
    tag = "catalog",
    params(("key" = String, Path, description = "Title key")),
    request_body = AdjustCopiesRequest,
    responses(
        (status = 200, description = "Copies added", body = CopyRecord),
        (status = 404, description = "Title not found")
    )
)]
pub async fn add_copies(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<AdjustCopiesRequest>,
) -> AppResult<Json<CopyRecord>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;
    Ok(Json(state.services.catalog.add_copies(&key, request.copies).await?))
}

/// Retire copies from the stock
#[utoipa::path(
    post,
    path = "/titles/{key}/copies/retire",
    tag = "catalog",
    params(("key" = String, Path, description = "Title key")),
    request_body = AdjustCopiesRequest,
    responses(
        (status = 200, description = "Copies retired", body = CopyRecord),
        (status = 404, description = "Title not found"),
        (status = 409, description = "Fewer copies available than requested")
    )
)]
pub async fn retire_copies(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<AdjustCopiesRequest>,
) -> AppResult<Json<CopyRecord>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;
    Ok(Json(state.services.catalog.retire_copies(&key, request.copies).await?))
}

/// Pin or clear the maintenance status
#[utoipa::path(
    put,
    path = "/titles/{key}/maintenance",
    tag = "catalog",
    params(("key" = String, Path, description = "Title key")),
    request_body = MaintenanceRequest,
    responses(
        (status = 200, description = "Status updated", body = CopyRecord),
        (status = 404, description = "Title not found")
    )
)]
pub async fn set_maintenance(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<MaintenanceRequest>,
) -> AppResult<Json<CopyRecord>> {
    Ok(Json(
        state
            .services
            .catalog
            .set_maintenance(&key, request.maintenance)
            .await?,
    ))
}
