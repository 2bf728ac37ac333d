//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{catalog, health, loans, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stacks API",
        version = "0.3.0",
        description = "Library Lending Backend REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::list_titles,
        catalog::get_title,
        catalog::register_title,
        catalog::add_copies,
        catalog::retire_copies,
        catalog::set_maintenance,
        // Reservations
        reservations::reserve,
        reservations::cancel_reservation,
        reservations::get_holder_reservations,
        reservations::get_title_reservations,
        reservations::sweep_expired_holds,
        // Loans
        loans::create_loan,
        loans::get_loan,
        loans::renew_loan,
        loans::return_loan,
        loans::mark_loan_lost,
        loans::get_holder_loans,
        loans::get_overdue_loans,
        loans::get_due_soon_loans,
        loans::sweep_overdue_loans,
    ),
    components(
        schemas(
            // Catalog
            crate::models::copy_record::CopyRecord,
            crate::models::copy_record::CopyStatus,
            catalog::RegisterTitleRequest,
            catalog::AdjustCopiesRequest,
            catalog::MaintenanceRequest,
            // Reservations
            crate::models::hold::ReservationHold,
            crate::models::hold::HoldStatus,
            reservations::ReserveRequest,
            reservations::CancelReservationRequest,
            reservations::SweepResponse,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            loans::CreateLoanRequest,
            loans::RenewLoanRequest,
            loans::ReturnLoanRequest,
            loans::MarkLostLoanRequest,
            loans::LoanResponse,
            // Identity
            crate::models::user::Role,
            crate::models::user::HolderIdentity,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Copy ledger and stock maintenance"),
        (name = "reservations", description = "Reservation queue"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "sweeps", description = "Time-driven batch transitions")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
