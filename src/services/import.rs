//! Customer-import reconciliation.
//!
//! Roster spreadsheets arrive as a flat row list: one leading row per
//! customer followed by zero or more box-only continuation rows. Grouping
//! rebuilds customer aggregates from that shape, the collision filter drops
//! box numbers already claimed store-wide, and the committer persists what
//! survives. Grouping and filtering are pure; only the committer touches
//! the store.

use crate::dtos::ImportRow;
use crate::error::AppError;
use crate::models::{BoxRecord, Customer};
use crate::services::MongoDb;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// An import row after normalization: blanks and garbage are already
/// coerced to empty string / 0.0, so no aggregation step ever sees an
/// invalid numeric.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub name: String,
    pub box_number: String,
    pub mobile: String,
    pub address: String,
    pub balance: f64,
    pub curr: f64,
}

impl From<&ImportRow> for NormalizedRow {
    fn from(row: &ImportRow) -> Self {
        Self {
            name: text(row.name.as_ref()),
            box_number: text(row.box_number.as_ref()),
            mobile: text(row.mobile.as_ref()),
            address: text(row.address.as_ref()),
            balance: number(row.balance.as_ref()),
            curr: number(row.curr.as_ref()),
        }
    }
}

fn text(field: Option<&Value>) -> String {
    match field {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn number(field: Option<&Value>) -> f64 {
    match field {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// A customer aggregate under construction. Contact fields are
/// insertion-ordered distinct lists so the comma-joined display strings
/// come out deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerGroup {
    pub name: String,
    pub box_numbers: Vec<String>,
    pub mobile_numbers: Vec<String>,
    pub addresses: Vec<String>,
    pub previous_balance: f64,
    pub current_month_payment: f64,
}

impl CustomerGroup {
    fn open(name: String) -> Self {
        Self {
            name,
            box_numbers: Vec::new(),
            mobile_numbers: Vec::new(),
            addresses: Vec::new(),
            previous_balance: 0.0,
            current_month_payment: 0.0,
        }
    }

    fn absorb(&mut self, row: &NormalizedRow) {
        if !row.box_number.is_empty() && !self.box_numbers.contains(&row.box_number) {
            self.box_numbers.push(row.box_number.clone());
        }
        if !row.mobile.is_empty() && !self.mobile_numbers.contains(&row.mobile) {
            self.mobile_numbers.push(row.mobile.clone());
        }
        if !row.address.is_empty() && !self.addresses.contains(&row.address) {
            self.addresses.push(row.address.clone());
        }
        self.previous_balance += row.balance;
        self.current_month_payment += row.curr;
    }

    fn into_customer(self, tenant_id: &str) -> Customer {
        let mut customer = Customer::new(
            tenant_id.to_string(),
            self.name,
            self.mobile_numbers.join(", "),
            self.addresses.join(", "),
        );
        customer.box_numbers = self.box_numbers;
        customer.previous_balance = self.previous_balance;
        customer.current_month_payment = self.current_month_payment;
        customer
    }
}

/// Partition rows into per-customer groups: a non-blank name closes the
/// current group and opens a new one; every row feeds the open group; rows
/// before the first named row have no group to attach to and are dropped.
pub fn group_rows(rows: &[ImportRow]) -> Vec<CustomerGroup> {
    let (mut finished, current) = rows.iter().map(NormalizedRow::from).fold(
        (Vec::new(), None::<CustomerGroup>),
        |(mut finished, mut current), row| {
            if !row.name.is_empty() {
                if let Some(group) = current.take() {
                    finished.push(group);
                }
                current = Some(CustomerGroup::open(row.name.clone()));
            }
            if let Some(group) = current.as_mut() {
                group.absorb(&row);
            }
            (finished, current)
        },
    );
    if let Some(group) = current {
        finished.push(group);
    }
    finished
}

/// Every distinct non-empty box value in the batch, for the single batched
/// existence check against the store.
pub fn batch_vocabulary(rows: &[ImportRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|row| text(row.box_number.as_ref()))
        .filter(|value| !value.is_empty() && seen.insert(value.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The number was already claimed store-wide before this batch.
    AlreadyClaimed,
    /// An earlier group in the same batch claimed the number first.
    DuplicateInBatch,
    /// The unique index rejected the write (lost a race with a concurrent
    /// import).
    InsertConflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedBox {
    pub box_number: String,
    pub reason: RejectReason,
}

/// Remove from every group the box numbers already claimed store-wide, and
/// resolve intra-batch duplicate claims deterministically: the first group
/// in row order keeps the number, later groups lose it. Order within each
/// group is preserved; groups emptied here are kept and discarded by the
/// committer.
pub fn filter_claimed(
    groups: &mut [CustomerGroup],
    existing: &HashSet<String>,
) -> Vec<RejectedBox> {
    let mut rejected = Vec::new();
    let mut claimed_in_batch: HashSet<String> = HashSet::new();
    for group in groups.iter_mut() {
        group.box_numbers.retain(|number| {
            if existing.contains(number) {
                rejected.push(RejectedBox {
                    box_number: number.clone(),
                    reason: RejectReason::AlreadyClaimed,
                });
                false
            } else if !claimed_in_batch.insert(number.clone()) {
                rejected.push(RejectedBox {
                    box_number: number.clone(),
                    reason: RejectReason::DuplicateInBatch,
                });
                false
            } else {
                true
            }
        });
    }
    rejected
}

#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub customers_inserted: u64,
    pub boxes_inserted: u64,
    pub rejected_boxes: Vec<RejectedBox>,
}

/// Run the full import for one tenant: one batched collision read, pure
/// grouping and filtering, then best-effort persistence. A group with no
/// surviving boxes is not persisted even when its balances are nonzero.
/// Customer-then-boxes is not atomic; a crash between the two steps leaves
/// a customer with fewer boxes and re-import is the recovery path.
pub async fn run_import(
    db: &MongoDb,
    tenant_id: &str,
    rows: &[ImportRow],
) -> Result<ImportOutcome, AppError> {
    let vocabulary = batch_vocabulary(rows);
    let existing = db.existing_box_numbers(&vocabulary).await?;

    let mut groups = group_rows(rows);
    let mut rejected = filter_claimed(&mut groups, &existing);

    let mut customers_inserted = 0u64;
    let mut boxes_inserted = 0u64;

    for group in groups.into_iter().filter(|g| !g.box_numbers.is_empty()) {
        let customer = group.into_customer(tenant_id);
        db.customers().insert_one(&customer, None).await?;
        customers_inserted += 1;

        for box_number in &customer.box_numbers {
            let record = BoxRecord::new(
                tenant_id.to_string(),
                customer.id.clone(),
                box_number.clone(),
            );
            match db.boxes().insert_one(&record, None).await {
                Ok(_) => boxes_inserted += 1,
                Err(err) if is_duplicate_key(&err) => {
                    tracing::warn!(
                        box_number = %box_number,
                        customer_id = %customer.id,
                        "Box claim lost a race with a concurrent import, dropping"
                    );
                    rejected.push(RejectedBox {
                        box_number: box_number.clone(),
                        reason: RejectReason::InsertConflict,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(ImportOutcome {
        customers_inserted,
        boxes_inserted,
        rejected_boxes: rejected,
    })
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}
