use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One line item as read from the source worksheet, before any cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based worksheet row, counting the header
    pub row_number: usize,
    /// Raw invoice identifier; cancellations carry a letter prefix (e.g. "C536379")
    pub invoice_no: String,
    pub stock_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    /// `None` when the cell was empty or unreadable
    pub invoice_date: Option<NaiveDateTime>,
    pub unit_price: Option<f64>,
    pub customer_id: Option<i64>,
    pub country: String,
}

/// The two synthetic geographic copies of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Uk,
    Us,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Uk, Region::Us];

    /// Digit appended to every invoice number of this region
    pub fn digit(self) -> i64 {
        match self {
            Region::Uk => 1,
            Region::Us => 2,
        }
    }

    /// Wall-clock offset applied to this region's invoice dates
    pub fn shift_hours(self) -> i64 {
        match self {
            Region::Uk => 0,
            Region::Us => crate::constants::SECOND_REGION_SHIFT_HOURS,
        }
    }
}

/// A cleaned, region-tagged transaction line. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub invoice_no: i64,
    pub stock_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    #[serde(with = "wall_clock")]
    pub invoice_date: NaiveDateTime,
    pub unit_price: f64,
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    pub country: String,
    pub line_no: u32,
}

impl Transaction {
    /// Time-of-day component used for ordering, independent of the date
    pub fn invoice_time(&self) -> NaiveTime {
        self.invoice_date.time()
    }
}

/// JSON shape of a transaction: identical fields, timestamps as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionJson {
    pub invoice_no: i64,
    pub stock_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    #[serde(with = "epoch_millis")]
    pub invoice_date: NaiveDateTime,
    pub unit_price: f64,
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    pub country: String,
    pub line_no: u32,
}

impl From<&Transaction> for TransactionJson {
    fn from(t: &Transaction) -> Self {
        Self {
            invoice_no: t.invoice_no,
            stock_code: t.stock_code.clone(),
            description: t.description.clone(),
            quantity: t.quantity,
            invoice_date: t.invoice_date,
            unit_price: t.unit_price,
            customer_id: t.customer_id,
            country: t.country.clone(),
            line_no: t.line_no,
        }
    }
}

impl From<TransactionJson> for Transaction {
    fn from(t: TransactionJson) -> Self {
        Self {
            invoice_no: t.invoice_no,
            stock_code: t.stock_code,
            description: t.description,
            quantity: t.quantity,
            invoice_date: t.invoice_date,
            unit_price: t.unit_price,
            customer_id: t.customer_id,
            country: t.country,
            line_no: t.line_no,
        }
    }
}

/// A fictitious identity attached to one customer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "validFrom", with = "valid_from")]
    pub valid_from: NaiveDateTime,
}

macro_rules! formatted_datetime {
    ($module:ident, $format:path) => {
        pub mod $module {
            use chrono::NaiveDateTime;
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(&dt.format($format))
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
                let raw = String::deserialize(d)?;
                NaiveDateTime::parse_from_str(&raw, $format).map_err(serde::de::Error::custom)
            }
        }
    };
}

formatted_datetime!(wall_clock, crate::constants::CSV_DATETIME_FORMAT);
formatted_datetime!(valid_from, crate::constants::CSV_VALID_FROM_FORMAT);

/// Naive timestamps as milliseconds since the Unix epoch, read as UTC.
pub mod epoch_millis {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(dt.and_utc().timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let millis = i64::deserialize(d)?;
        DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp {millis} out of range")))
    }
}
