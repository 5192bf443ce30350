mod box_record;
mod customer;
mod user;

pub use box_record::BoxRecord;
pub use customer::{Customer, PaymentEntry};
pub use user::{User, UserRole};
