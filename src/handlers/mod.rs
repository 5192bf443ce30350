pub mod auth;
pub mod customers;
pub mod exports;
pub mod health;
pub mod imports;
pub mod payments;
