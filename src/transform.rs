//! Cleaning and regional duplication of the raw line items.
//!
//! Rows without a numeric invoice number, without a customer, or with a
//! non-positive quantity are dropped. A surviving row must carry a readable
//! date and price. Every surviving row is emitted twice,
//! once per [`Region`], and the combined table is ordered by local clock time.

use crate::constants::{COL_INVOICE_DATE, COL_UNIT_PRICE};
use crate::error::{DatasetError, Result};
use crate::types::{Region, SourceRow, Transaction};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Row accounting for one transform pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub loaded: usize,
    pub dropped_invoice: usize,
    pub dropped_customer: usize,
    pub dropped_quantity: usize,
    pub retained: usize,
    pub emitted: usize,
}

#[derive(Debug, Clone)]
pub struct Transformed {
    pub transactions: Vec<Transaction>,
    pub stats: TransformStats,
}

/// A source row that passed every filter, with its line number assigned.
#[derive(Debug, Clone)]
struct CleanRow {
    invoice_no: i64,
    line_no: u32,
    customer_id: i64,
    invoice_date: NaiveDateTime,
    unit_price: f64,
    row: SourceRow,
}

#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn transform(rows: Vec<SourceRow>) -> Result<Transformed> {
    let mut stats = TransformStats {
        loaded: rows.len(),
        ..Default::default()
    };

    let cleaned = clean(rows, &mut stats)?;
    stats.retained = cleaned.len();

    let mut transactions = Vec::with_capacity(cleaned.len() * Region::ALL.len());
    for region in Region::ALL {
        for row in &cleaned {
            transactions.push(regionalize(row, region)?);
        }
    }
    sort_by_local_time(&mut transactions);
    stats.emitted = transactions.len();

    info!(
        "✅ Transformed {} rows into {} transactions ({} bad invoice, {} no customer, {} non-positive quantity)",
        stats.loaded,
        stats.emitted,
        stats.dropped_invoice,
        stats.dropped_customer,
        stats.dropped_quantity
    );
    Ok(Transformed {
        transactions,
        stats,
    })
}

fn clean(rows: Vec<SourceRow>, stats: &mut TransformStats) -> Result<Vec<CleanRow>> {
    let mut line_counters: HashMap<i64, u32> = HashMap::new();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        let invoice_no = match row.invoice_no.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                debug!("Dropping row with non-numeric invoice '{}'", row.invoice_no);
                stats.dropped_invoice += 1;
                continue;
            }
        };
        let customer_id = match row.customer_id {
            Some(id) => id,
            None => {
                stats.dropped_customer += 1;
                continue;
            }
        };
        if row.quantity <= 0 {
            stats.dropped_quantity += 1;
            continue;
        }
        let invoice_date = required(row.invoice_date, row.row_number, COL_INVOICE_DATE)?;
        let unit_price = required(row.unit_price, row.row_number, COL_UNIT_PRICE)?;

        let counter = line_counters.entry(invoice_no).or_insert(0);
        *counter += 1;
        cleaned.push(CleanRow {
            invoice_no,
            line_no: *counter,
            customer_id,
            invoice_date,
            unit_price,
            row,
        });
    }
    Ok(cleaned)
}

fn required<T>(value: Option<T>, row: usize, column: &'static str) -> Result<T> {
    value.ok_or_else(|| DatasetError::MalformedCell {
        row,
        column,
        reason: "empty or unreadable".into(),
    })
}

/// Invoice number with the region digit appended: `invoice_no * 10 + digit`.
pub fn tag_invoice(invoice_no: i64, region: Region) -> Result<i64> {
    let digit = region.digit();
    invoice_no
        .checked_mul(10)
        .and_then(|n| if n < 0 { n.checked_sub(digit) } else { n.checked_add(digit) })
        .ok_or(DatasetError::InvoiceOverflow { invoice_no, digit })
}

fn regionalize(clean: &CleanRow, region: Region) -> Result<Transaction> {
    let row = &clean.row;
    Ok(Transaction {
        invoice_no: tag_invoice(clean.invoice_no, region)?,
        stock_code: row.stock_code.clone(),
        description: row.description.clone(),
        quantity: row.quantity,
        invoice_date: clean.invoice_date + Duration::hours(region.shift_hours()),
        unit_price: clean.unit_price,
        customer_id: clean.customer_id,
        country: row.country.clone(),
        line_no: clean.line_no,
    })
}

/// Order by (time of day, invoice number). The sort is stable, so lines of
/// one invoice keep their original order.
pub fn sort_by_local_time(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|t| (t.invoice_time(), t.invoice_no));
}
