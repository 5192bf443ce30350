use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;

use crate::dtos::HistoryParams;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::Customer;
use crate::services::report;
use crate::AppState;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

async fn tenant_customers(state: &AppState, tenant_id: &str) -> Result<Vec<Customer>, AppError> {
    let mut cursor = state
        .db
        .customers()
        .find(doc! { "tenant_id": tenant_id }, None)
        .await?;
    let mut customers = Vec::new();
    while let Some(customer) = cursor.try_next().await? {
        customers.push(customer);
    }
    Ok(customers)
}

/// CSV roster report, sorted descending by total outstanding.
pub async fn export_customers(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let customers = tenant_customers(&state, claims.tenant_id()).await?;
    let csv = report::customer_report_csv(&customers)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=CustomerReport.csv",
            ),
        ],
        csv,
    ))
}

fn validate_range(params: &HistoryParams) -> Result<(), AppError> {
    for value in [params.from.as_deref(), params.to.as_deref()].into_iter().flatten() {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest(anyhow::anyhow!(
                "Invalid date '{}', expected YYYY-MM-DD",
                value
            ))
        })?;
    }
    Ok(())
}

/// Flat payment-history rows within the optional date range, as JSON.
pub async fn payment_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    validate_range(&params)?;
    let customers = tenant_customers(&state, claims.tenant_id()).await?;
    let rows =
        report::flat_payment_history(&customers, params.from.as_deref(), params.to.as_deref());
    Ok(Json(serde_json::json!({ "history": rows })))
}

/// Same rows as an XLSX attachment.
pub async fn export_payment_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    validate_range(&params)?;
    let customers = tenant_customers(&state, claims.tenant_id()).await?;
    let rows =
        report::flat_payment_history(&customers, params.from.as_deref(), params.to.as_deref());
    let workbook = report::payment_history_workbook(&rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=PaymentHistory.xlsx",
            ),
        ],
        workbook,
    ))
}
