use crate::constants::*;
use crate::error::{DatasetError, Result};
use crate::types::SourceRow;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::{debug, info, instrument};

static EMPTY: Data = Data::Empty;

/// Column positions of the fields we read, resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    invoice_no: usize,
    stock_code: usize,
    description: usize,
    quantity: usize,
    invoice_date: usize,
    unit_price: usize,
    customer_id: usize,
    country: usize,
}

impl ColumnMap {
    fn from_header(header: &[Data], sheet: &str) -> Result<Self> {
        let names: Vec<String> = header.iter().map(|c| c.to_string().trim().to_string()).collect();
        let find = |column: &str| {
            names
                .iter()
                .position(|n| n == column)
                .ok_or_else(|| DatasetError::MissingColumn {
                    sheet: sheet.to_string(),
                    column: column.to_string(),
                })
        };
        Ok(Self {
            invoice_no: find(COL_INVOICE_NO)?,
            stock_code: find(COL_STOCK_CODE)?,
            description: find(COL_DESCRIPTION)?,
            quantity: find(COL_QUANTITY)?,
            invoice_date: find(COL_INVOICE_DATE)?,
            unit_price: find(COL_UNIT_PRICE)?,
            customer_id: find(COL_CUSTOMER_ID)?,
            country: find(COL_COUNTRY)?,
        })
    }
}

/// Load every line item of `sheet` from the workbook at `path`.
#[instrument]
pub fn load_source_rows(path: &Path, sheet: &str) -> Result<Vec<SourceRow>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet)?;
    let rows = rows_from_range(&range, sheet)?;
    info!("📖 Loaded {} rows from sheet '{}'", rows.len(), sheet);
    Ok(rows)
}

/// Convert a worksheet range (header row first) into source rows.
pub fn rows_from_range(range: &Range<Data>, sheet: &str) -> Result<Vec<SourceRow>> {
    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| DatasetError::MissingColumn {
        sheet: sheet.to_string(),
        column: COL_INVOICE_NO.to_string(),
    })?;
    let columns = ColumnMap::from_header(header, sheet)?;
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut out = Vec::new();
    for (i, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        // 1-based sheet row, counting the header
        let row_number = first_row + i + 2;
        out.push(convert_row(row, &columns, row_number)?);
    }
    debug!("Converted {} data rows", out.len());
    Ok(out)
}

fn cell(row: &[Data], idx: usize) -> &Data {
    row.get(idx).unwrap_or(&EMPTY)
}

fn convert_row(row: &[Data], columns: &ColumnMap, row_number: usize) -> Result<SourceRow> {
    let malformed = |column: &'static str, reason: String| DatasetError::MalformedCell {
        row: row_number,
        column,
        reason,
    };

    let quantity = integer_cell(cell(row, columns.quantity))
        .map_err(|reason| malformed(COL_QUANTITY, reason))?
        .ok_or_else(|| malformed(COL_QUANTITY, "empty".into()))?;
    let customer_id = integer_cell(cell(row, columns.customer_id))
        .map_err(|reason| malformed(COL_CUSTOMER_ID, reason))?;
    // Price and date are only required of rows that survive cleaning
    let unit_price = float_cell(cell(row, columns.unit_price))
        .map_err(|reason| {
            debug!(row = row_number, "Unreadable {}: {}", COL_UNIT_PRICE, reason);
        })
        .ok();
    let invoice_date = datetime_cell(cell(row, columns.invoice_date))
        .map_err(|reason| {
            debug!(row = row_number, "Unreadable {}: {}", COL_INVOICE_DATE, reason);
        })
        .ok();

    Ok(SourceRow {
        row_number,
        invoice_no: text_cell(cell(row, columns.invoice_no)).unwrap_or_default(),
        stock_code: text_cell(cell(row, columns.stock_code)).unwrap_or_default(),
        description: text_cell(cell(row, columns.description)),
        quantity,
        invoice_date,
        unit_price,
        customer_id,
        country: text_cell(cell(row, columns.country)).unwrap_or_default(),
    })
}

/// Text form of a cell; integral numbers lose their ".0". Strings are kept verbatim.
fn text_cell(data: &Data) -> Option<String> {
    let text = match data {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", *f as i64),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn integer_cell(data: &Data) -> std::result::Result<Option<i64>, String> {
    match data {
        Data::Empty => Ok(None),
        Data::Int(i) => Ok(Some(*i)),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(*f as i64)),
        Data::Float(f) => Err(format!("{f} is not an integer")),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Some(i));
            }
            match s.parse::<f64>() {
                Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
                _ => Err(format!("'{s}' is not an integer")),
            }
        }
        other => Err(format!("unexpected cell {other:?}")),
    }
}

fn float_cell(data: &Data) -> std::result::Result<f64, String> {
    match data {
        Data::Int(i) => Ok(*i as f64),
        Data::Float(f) => Ok(*f),
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not a number")),
        Data::Empty => Err("empty".into()),
        other => Err(format!("unexpected cell {other:?}")),
    }
}

fn datetime_cell(data: &Data) -> std::result::Result<NaiveDateTime, String> {
    match data {
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64()),
        Data::Float(f) => excel_serial_to_datetime(*f),
        Data::Int(i) => excel_serial_to_datetime(*i as f64),
        Data::DateTimeIso(s) | Data::String(s) => parse_datetime_text(s.trim()),
        Data::Empty => Err("empty".into()),
        other => Err(format!("unexpected cell {other:?}")),
    }
}

/// Excel serial day number (1900 date system) to a naive timestamp, rounded to the millisecond.
pub fn excel_serial_to_datetime(serial: f64) -> std::result::Result<NaiveDateTime, String> {
    // Serials below 61 sit before Excel's phantom 1900-02-29 and are not valid dates here
    if !serial.is_finite() || serial < 61.0 {
        return Err(format!("{serial} is not a usable date serial"));
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| "invalid epoch".to_string())?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(|| format!("{serial} is out of range"))
}

fn parse_datetime_text(s: &str) -> std::result::Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .ok_or_else(|| format!("'{s}' is not a timestamp"))
}
