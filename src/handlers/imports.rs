use axum::{extract::State, response::IntoResponse, Json};

use crate::dtos::ImportRequest;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::import;
use crate::AppState;

/// Import a customer roster for the calling tenant. The response reports
/// how many customers and boxes landed plus every rejected box claim, so
/// callers can reconcile without re-deriving the input.
pub async fn import_customers(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.customers.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No customer data provided"
        )));
    }

    let outcome = import::run_import(&state.db, claims.tenant_id(), &req.customers).await?;

    tracing::info!(
        tenant_id = %claims.tenant_id(),
        customers_inserted = outcome.customers_inserted,
        boxes_inserted = outcome.boxes_inserted,
        rejected = outcome.rejected_boxes.len(),
        "Customer import finished"
    );

    Ok(Json(outcome))
}
