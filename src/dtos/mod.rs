mod auth;
mod customers;
mod imports;

pub use auth::{AuthResponse, LoginRequest, SignupRequest, UserPayload};
pub use customers::{
    CreateCustomerRequest, CustomerDetail, CustomerSummary, HistoryParams, ReceiptRequest,
    ReceiptResponse, SearchParams, SearchType, UpdateCustomerRequest,
};
pub use imports::{ImportRequest, ImportRow};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
