use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded payment, embedded in the owning customer. Append-only: the
/// balance impact is applied at the moment of append and history is never
/// replayed to reconstruct the balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub date: String,
    pub time: String,
    pub amount: f64,
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Comma-joined display string of the distinct mobiles seen at import.
    pub mobile: String,
    pub address: String,
    pub box_numbers: Vec<String>,
    pub previous_balance: f64,
    pub current_month_payment: f64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<PaymentEntry>,
}

impl Customer {
    pub fn new(tenant_id: String, name: String, mobile: String, address: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            name,
            mobile,
            address,
            box_numbers: Vec::new(),
            previous_balance: 0.0,
            current_month_payment: 0.0,
            created_at: Utc::now(),
            history: Vec::new(),
        }
    }

    /// Apply a payment: fold the current month into the running balance,
    /// subtract the paid amount, reset the month, and append a history
    /// entry. Returns the new balance and the appended entry.
    pub fn record_payment(
        &mut self,
        amount_paid: f64,
        method: &str,
        at: DateTime<Utc>,
    ) -> (f64, PaymentEntry) {
        let new_balance = self.previous_balance + self.current_month_payment - amount_paid;
        self.previous_balance = new_balance;
        self.current_month_payment = 0.0;
        let entry = PaymentEntry {
            date: at.format("%Y-%m-%d").to_string(),
            time: at.format("%H:%M:%S").to_string(),
            amount: amount_paid,
            method: method.to_string(),
        };
        self.history.push(entry.clone());
        (new_balance, entry)
    }

    pub fn total_outstanding(&self) -> f64 {
        self.previous_balance + self.current_month_payment
    }
}
