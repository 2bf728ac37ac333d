//! Loan endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::Loan,
    services::lending::{CheckoutRequest, MarkLostRequest},
    AppState,
};

use super::reservations::SweepResponse;

/// Checkout request
#[derive(Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Borrowing holder
    pub holder_id: i64,
    /// Title to check out
    pub title_key: String,
    /// Librarian or admin performing the checkout
    pub actor_id: i64,
}

/// Renew request
#[derive(Deserialize, ToSchema)]
pub struct RenewLoanRequest {
    /// Owner of the loan
    pub holder_id: i64,
}

/// Return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnLoanRequest {
    /// Returning holder
    pub holder_id: i64,
    /// Title being returned
    pub title_key: String,
}

/// Lost report request
#[derive(Deserialize, ToSchema)]
pub struct MarkLostLoanRequest {
    /// Librarian or admin filing the report
    pub actor_id: i64,
    /// Replacement charge; the configured default applies when omitted
    pub replacement_cost: Option<f64>,
}

#[derive(Deserialize, IntoParams)]
pub struct DueSoonQuery {
    /// Look-ahead window in days (default 3)
    pub days: Option<i64>,
}

/// Loan response with a status message
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub loan: Loan,
    pub message: String,
}

/// Check out a copy to a holder
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 403, description = "Actor or holder not permitted"),
        (status = 404, description = "Title or holder not found"),
        (status = 409, description = "Already borrowed, out of stock, or reserved by another holder"),
        (status = 422, description = "Borrow cap reached"),
        (status = 503, description = "Identity collaborator unavailable")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state
        .services
        .lending
        .checkout(CheckoutRequest {
            holder_id: request.holder_id,
            title_key: request.title_key,
            actor_id: request.actor_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            message: format!("Copy checked out; due {}", loan.due_at.date_naive()),
            loan,
        }),
    ))
}

/// Get one loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = Uuid, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Loan>> {
    Ok(Json(state.services.lending.get_loan(id)?))
}

/// Renew a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/renew",
    tag = "loans",
    params(("id" = Uuid, Path, description = "Loan ID")),
    request_body = RenewLoanRequest,
    responses(
        (status = 200, description = "Loan renewed", body = LoanResponse),
        (status = 403, description = "Loan belongs to another holder"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Not renewable, or blocked by waiting reservations")
    )
)]
pub async fn renew_loan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewLoanRequest>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.lending.renew(id, request.holder_id).await?;
    Ok(Json(LoanResponse {
        message: format!(
            "Loan renewed ({} renewals); due {}",
            loan.renewal_count,
            loan.due_at.date_naive()
        ),
        loan,
    }))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    request_body = ReturnLoanRequest,
    responses(
        (status = 200, description = "Copy returned", body = LoanResponse),
        (status = 404, description = "No open loan for this holder and title")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    Json(request): Json<ReturnLoanRequest>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state
        .services
        .lending
        .return_copy(request.holder_id, &request.title_key, chrono::Utc::now())
        .await?;

    let message = if loan.fine_amount > 0.0 {
        format!("Copy returned late; fine {:.2}", loan.fine_amount)
    } else {
        "Copy returned".to_string()
    };
    Ok(Json(LoanResponse { loan, message }))
}

/// Report a borrowed copy lost
#[utoipa::path(
    post,
    path = "/loans/{id}/lost",
    tag = "loans",
    params(("id" = Uuid, Path, description = "Loan ID")),
    request_body = MarkLostLoanRequest,
    responses(
        (status = 200, description = "Loan closed as lost", body = LoanResponse),
        (status = 403, description = "Actor not permitted"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already closed")
    )
)]
pub async fn mark_loan_lost(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MarkLostLoanRequest>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state
        .services
        .lending
        .mark_lost(MarkLostRequest {
            loan_id: id,
            actor_id: request.actor_id,
            replacement_cost: request.replacement_cost,
        })
        .await?;
    Ok(Json(LoanResponse {
        message: format!("Copy reported lost; replacement charge {:.2}", loan.fine_amount),
        loan,
    }))
}

/// Loans of one holder, all states
#[utoipa::path(
    get,
    path = "/holders/{id}/loans",
    tag = "loans",
    params(("id" = i64, Path, description = "Holder ID")),
    responses(
        (status = 200, description = "Holder's loans", body = Vec<Loan>)
    )
)]
pub async fn get_holder_loans(
    State(state): State<AppState>,
    Path(holder_id): Path<i64>,
) -> Json<Vec<Loan>> {
    Json(state.services.lending.list_for_holder(holder_id))
}

/// Open loans past due
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    responses(
        (status = 200, description = "Overdue loans", body = Vec<Loan>)
    )
)]
pub async fn get_overdue_loans(State(state): State<AppState>) -> Json<Vec<Loan>> {
    Json(state.services.lending.list_overdue(chrono::Utc::now()))
}

/// Open loans falling due within the window
#[utoipa::path(
    get,
    path = "/loans/due-soon",
    tag = "loans",
    params(DueSoonQuery),
    responses(
        (status = 200, description = "Loans due soon", body = Vec<Loan>)
    )
)]
pub async fn get_due_soon_loans(
    State(state): State<AppState>,
    Query(query): Query<DueSoonQuery>,
) -> Json<Vec<Loan>> {
    let days = query.days.unwrap_or(3);
    Json(state.services.lending.list_due_soon(chrono::Utc::now(), days))
}

/// Mark open loans past due as overdue now
#[utoipa::path(
    post,
    path = "/sweeps/overdue-loans",
    tag = "sweeps",
    responses(
        (status = 200, description = "Sweep completed", body = SweepResponse)
    )
)]
pub async fn sweep_overdue_loans(State(state): State<AppState>) -> Json<SweepResponse> {
    let transitioned = state.services.lending.sweep_overdue(chrono::Utc::now()).await;
    Json(SweepResponse { transitioned })
}
