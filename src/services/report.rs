//! Read-only reporting projections over persisted customers.

use crate::error::AppError;
use crate::models::Customer;
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use std::cmp::Ordering;

const CUSTOMER_REPORT_HEADERS: [&str; 7] = [
    "Name",
    "Box Numbers",
    "Mobile",
    "Address",
    "Previous Balance",
    "This Month",
    "Total Outstanding",
];

const PAYMENT_HISTORY_HEADERS: [&str; 6] = ["Name", "Mobile", "Amount", "Method", "Date", "Time"];

/// One row per customer, sorted descending by total outstanding. The csv
/// writer quotes fields with embedded commas, which keeps the joined
/// box-number and address strings intact.
pub fn customer_report_csv(customers: &[Customer]) -> Result<Vec<u8>, AppError> {
    let mut sorted: Vec<&Customer> = customers.iter().collect();
    sorted.sort_by(|a, b| {
        b.total_outstanding()
            .partial_cmp(&a.total_outstanding())
            .unwrap_or(Ordering::Equal)
    });

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CUSTOMER_REPORT_HEADERS)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
    for customer in sorted {
        let boxes = customer.box_numbers.join(", ");
        writer
            .write_record([
                customer.name.as_str(),
                boxes.as_str(),
                customer.mobile.as_str(),
                customer.address.as_str(),
                display_amount(customer.previous_balance).as_str(),
                display_amount(customer.current_month_payment).as_str(),
                display_amount(customer.total_outstanding()).as_str(),
            ])
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))
}

fn display_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentHistoryRow {
    pub name: String,
    pub mobile: String,
    pub amount: f64,
    pub method: String,
    pub date: String,
    pub time: String,
}

/// Flatten every customer's embedded history into report rows, keeping
/// entries whose date falls inside the optional inclusive range. Dates are
/// stored as `YYYY-MM-DD` so plain string comparison orders them.
pub fn flat_payment_history(
    customers: &[Customer],
    from: Option<&str>,
    to: Option<&str>,
) -> Vec<PaymentHistoryRow> {
    let mut rows: Vec<PaymentHistoryRow> = customers
        .iter()
        .flat_map(|customer| {
            customer
                .history
                .iter()
                .filter(|entry| {
                    from.map_or(true, |f| entry.date.as_str() >= f)
                        && to.map_or(true, |t| entry.date.as_str() <= t)
                })
                .map(|entry| PaymentHistoryRow {
                    name: customer.name.clone(),
                    mobile: customer.mobile.clone(),
                    amount: entry.amount,
                    method: entry.method.clone(),
                    date: entry.date.clone(),
                    time: entry.time.clone(),
                })
        })
        .collect();
    rows.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
    rows
}

/// Render payment-history rows as a single-sheet XLSX workbook.
pub fn payment_history_workbook(rows: &[PaymentHistoryRow]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("Payment History")
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    for (col, header) in PAYMENT_HISTORY_HEADERS.iter().enumerate() {
        sheet
            .write(0, col as u16, *header)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet
            .write(r, 0, row.name.as_str())
            .and_then(|s| s.write(r, 1, row.mobile.as_str()))
            .and_then(|s| s.write(r, 2, row.amount))
            .and_then(|s| s.write(r, 3, row.method.as_str()))
            .and_then(|s| s.write(r, 4, row.date.as_str()))
            .and_then(|s| s.write(r, 5, row.time.as_str()))
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))
}
