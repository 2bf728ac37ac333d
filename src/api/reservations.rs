//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::ReservationHold, AppState};

/// Reserve request
#[derive(Deserialize, ToSchema)]
pub struct ReserveRequest {
    /// Holder placing the hold
    pub holder_id: i64,
    /// Title to wait for
    pub title_key: String,
}

/// Cancel reservation request
#[derive(Deserialize, ToSchema)]
pub struct CancelReservationRequest {
    /// Owner of the hold
    pub holder_id: i64,
}

/// Sweep trigger response
#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of records transitioned by this pass
    pub transitioned: usize,
}

/// Place a reservation hold
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = ReserveRequest,
    responses(
        (status = 201, description = "Hold placed", body = ReservationHold),
        (status = 404, description = "Title or holder not found"),
        (status = 409, description = "Duplicate hold"),
        (status = 422, description = "Reservation quota reached")
    )
)]
pub async fn reserve(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> AppResult<(StatusCode, Json<ReservationHold>)> {
    let hold = state
        .services
        .reservations
        .reserve(request.holder_id, &request.title_key)
        .await?;
    Ok((StatusCode::CREATED, Json(hold)))
}

/// Cancel an active reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body = CancelReservationRequest,
    responses(
        (status = 200, description = "Hold cancelled", body = ReservationHold),
        (status = 403, description = "Hold belongs to another holder"),
        (status = 404, description = "Hold not found"),
        (status = 409, description = "Hold is not active")
    )
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelReservationRequest>,
) -> AppResult<Json<ReservationHold>> {
    Ok(Json(state.services.reservations.cancel(id, request.holder_id)?))
}

/// Reservations of one holder, all states
#[utoipa::path(
    get,
    path = "/holders/{id}/reservations",
    tag = "reservations",
    params(("id" = i64, Path, description = "Holder ID")),
    responses(
        (status = 200, description = "Holder's reservations", body = Vec<ReservationHold>)
    )
)]
pub async fn get_holder_reservations(
    State(state): State<AppState>,
    Path(holder_id): Path<i64>,
) -> Json<Vec<ReservationHold>> {
    Json(state.services.reservations.list_for_holder(holder_id))
}

/// Queue for one title in FIFO order
#[utoipa::path(
    get,
    path = "/titles/{key}/reservations",
    tag = "reservations",
    params(("key" = String, Path, description = "Title key")),
    responses(
        (status = 200, description = "Title's reservation queue", body = Vec<ReservationHold>),
        (status = 404, description = "Title not found")
    )
)]
pub async fn get_title_reservations(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<Vec<ReservationHold>>> {
    Ok(Json(state.services.reservations.list_for_title(&key)?))
}

/// Expire lapsed holds now
#[utoipa::path(
    post,
    path = "/sweeps/expired-holds",
    tag = "sweeps",
    responses(
        (status = 200, description = "Sweep completed", body = SweepResponse)
    )
)]
pub async fn sweep_expired_holds(State(state): State<AppState>) -> Json<SweepResponse> {
    let transitioned = state.services.reservations.sweep_expired(chrono::Utc::now());
    Json(SweepResponse { transitioned })
}
