use crate::models::{Customer, PaymentEntry};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Box,
    Mobile,
    Name,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub search_type: SearchType,
    pub query: String,
}

/// The search projection: enough to render the roster list without the
/// embedded history.
#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub box_numbers: Vec<String>,
    pub pending_payment: f64,
    pub current_month_payment: f64,
    pub mobile: String,
}

impl From<Customer> for CustomerSummary {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            box_numbers: customer.box_numbers,
            pending_payment: customer.previous_balance,
            current_month_payment: customer.current_month_payment,
            mobile: customer.mobile,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    pub id: String,
    pub name: String,
    pub mobile: String,
    pub address: String,
    pub box_numbers: Vec<String>,
    pub previous_balance: f64,
    pub current_month_payment: f64,
    pub created_at: String,
    pub history: Vec<PaymentEntry>,
}

impl From<Customer> for CustomerDetail {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            mobile: customer.mobile,
            address: customer.address,
            box_numbers: customer.box_numbers,
            previous_balance: customer.previous_balance,
            current_month_payment: customer.current_month_payment,
            created_at: customer.created_at.to_rfc3339(),
            history: customer.history,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Mobile is required"))]
    pub mobile: String,

    pub address: Option<String>,
    pub current_month_payment: Option<f64>,
    pub box_numbers: Option<Vec<String>>,
}

/// Partial update. Box ownership lives in box records and is not editable
/// here.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub previous_balance: Option<f64>,
    pub current_month_payment: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    pub customer_id: String,
    pub amount_paid: f64,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub message: String,
    pub new_balance: f64,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub from: Option<String>,
    pub to: Option<String>,
}
