use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use mongodb::bson::{doc, to_bson};

use crate::dtos::{ReceiptRequest, ReceiptResponse};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::AppState;

/// Record a payment against a customer. The balance fold happens on the
/// in-memory record and the result is written back as a $set plus a $push
/// of the new history entry; history itself is never replayed.
pub async fn print_receipt(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ReceiptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let filter = doc! { "_id": &req.customer_id, "tenant_id": claims.tenant_id() };
    let mut customer = state
        .db
        .customers()
        .find_one(filter.clone(), None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    let (new_balance, entry) =
        customer.record_payment(req.amount_paid, &req.payment_method, Utc::now());

    state
        .db
        .customers()
        .update_one(
            filter,
            doc! {
                "$set": {
                    "previous_balance": customer.previous_balance,
                    "current_month_payment": customer.current_month_payment,
                },
                "$push": {
                    "history": to_bson(&entry)
                        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?,
                },
            },
            None,
        )
        .await?;

    tracing::info!(
        customer_id = %req.customer_id,
        amount = req.amount_paid,
        new_balance,
        "Payment recorded"
    );

    Ok(Json(ReceiptResponse {
        message: "Payment recorded".to_string(),
        new_balance,
        date: entry.date,
        time: entry.time,
    }))
}
