use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

use crate::dtos::{
    CreateCustomerRequest, CustomerDetail, CustomerSummary, SearchParams, SearchType,
    UpdateCustomerRequest,
};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::Customer;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn search_customers(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.query.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Search type and query are required"
        )));
    }

    let field = match params.search_type {
        SearchType::Box => "box_numbers",
        SearchType::Mobile => "mobile",
        SearchType::Name => "name",
    };
    let filter = doc! {
        "tenant_id": claims.tenant_id(),
        field: { "$regex": &params.query, "$options": "i" },
    };

    let mut cursor = state.db.customers().find(filter, None).await?;
    let mut customers = Vec::new();
    while let Some(customer) = cursor.try_next().await? {
        customers.push(CustomerSummary::from(customer));
    }

    Ok(Json(serde_json::json!({ "customers": customers })))
}

pub async fn get_customer(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state
        .db
        .customers()
        .find_one(doc! { "_id": &id, "tenant_id": claims.tenant_id() }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    Ok(Json(
        serde_json::json!({ "customer": CustomerDetail::from(customer) }),
    ))
}

pub async fn create_customer(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut customer = Customer::new(
        claims.tenant_id().to_string(),
        req.name,
        req.mobile,
        req.address.unwrap_or_default(),
    );
    customer.current_month_payment = req.current_month_payment.unwrap_or(0.0);
    customer.box_numbers = req.box_numbers.unwrap_or_default();

    state.db.customers().insert_one(&customer, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Customer created successfully",
            "customer": CustomerDetail::from(customer),
        })),
    ))
}

pub async fn edit_customer(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut set = Document::new();
    if let Some(name) = req.name {
        set.insert("name", name);
    }
    if let Some(mobile) = req.mobile {
        set.insert("mobile", mobile);
    }
    if let Some(address) = req.address {
        set.insert("address", address);
    }
    if let Some(previous_balance) = req.previous_balance {
        set.insert("previous_balance", previous_balance);
    }
    if let Some(current_month_payment) = req.current_month_payment {
        set.insert("current_month_payment", current_month_payment);
    }
    if set.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("No fields to update")));
    }

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let customer = state
        .db
        .customers()
        .find_one_and_update(
            doc! { "_id": &id, "tenant_id": claims.tenant_id() },
            doc! { "$set": set },
            options,
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    Ok(Json(serde_json::json!({
        "message": "Customer updated",
        "customer": CustomerDetail::from(customer),
    })))
}

/// Delete one customer and cascade-delete its box claims; the store
/// enforces no referential integrity, so the cascade is ours.
pub async fn delete_customer(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .db
        .customers()
        .delete_one(doc! { "_id": &id, "tenant_id": claims.tenant_id() }, None)
        .await?;
    if deleted.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Customer not found")));
    }

    let boxes = state
        .db
        .boxes()
        .delete_many(doc! { "customer_id": &id }, None)
        .await?;
    tracing::info!(
        customer_id = %id,
        boxes_released = boxes.deleted_count,
        "Customer deleted"
    );

    Ok(Json(serde_json::json!({
        "message": "Customer deleted successfully"
    })))
}

/// Wipe every customer and box claim of the calling tenant. Other tenants'
/// records are untouched.
pub async fn delete_all_data(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = claims.tenant_id();
    let customers = state
        .db
        .customers()
        .delete_many(doc! { "tenant_id": tenant_id }, None)
        .await?;
    let boxes = state
        .db
        .boxes()
        .delete_many(doc! { "tenant_id": tenant_id }, None)
        .await?;

    tracing::info!(
        tenant_id = %tenant_id,
        customers_deleted = customers.deleted_count,
        boxes_deleted = boxes.deleted_count,
        "Tenant data wiped"
    );

    Ok(Json(serde_json::json!({
        "customers_deleted": customers.deleted_count,
        "boxes_deleted": boxes.deleted_count,
    })))
}
