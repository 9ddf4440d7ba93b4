/// Source location and artifact names for the Online Retail dataset.
/// These constants define the fixed shape every run produces.

// Remote workbook published by the UCI machine learning repository
pub const SOURCE_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/00352/Online%20Retail.xlsx";
pub const SOURCE_SHEET: &str = "Online Retail";

// Default artifact file names (resolved against the configured output directory)
pub const WORKBOOK_FILE: &str = "OnlineRetail.xlsx";
pub const TRANSACTIONS_CSV_FILE: &str = "OnlineRetail.csv";
pub const TRANSACTIONS_JSON_FILE: &str = "OnlineRetail.json";
pub const CUSTOMERS_CSV_FILE: &str = "OnlineRetailCustomers.csv";

pub const COMPRESSED_SUFFIX: &str = ".gz";

// Source worksheet column names
pub const COL_INVOICE_NO: &str = "InvoiceNo";
pub const COL_STOCK_CODE: &str = "StockCode";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_INVOICE_DATE: &str = "InvoiceDate";
pub const COL_UNIT_PRICE: &str = "UnitPrice";
pub const COL_CUSTOMER_ID: &str = "CustomerID";
pub const COL_COUNTRY: &str = "Country";
pub const COL_LINE_NO: &str = "LineNo";

/// Columns of the transaction CSV, in the order they are written.
pub const TRANSACTION_COLUMNS: [&str; 9] = [
    COL_INVOICE_NO,
    COL_STOCK_CODE,
    COL_DESCRIPTION,
    COL_QUANTITY,
    COL_INVOICE_DATE,
    COL_UNIT_PRICE,
    COL_CUSTOMER_ID,
    COL_COUNTRY,
    COL_LINE_NO,
];

/// Columns of the customer CSV, in the order they are written.
pub const CUSTOMER_COLUMNS: [&str; 4] = [COL_CUSTOMER_ID, "Name", "Address", "validFrom"];

// The US copy of the dataset is approximated as 12 hours behind the UK one
pub const SECOND_REGION_SHIFT_HOURS: i64 = 12;

/// Wall-clock timestamp format used in CSV artifacts. Sub-second precision
/// is written only when present (`08:26:00`, `08:26:00.500`).
pub const CSV_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
pub const CSV_VALID_FROM_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Position of a transaction column in the CSV schema.
pub fn transaction_column_index(name: &str) -> Option<usize> {
    TRANSACTION_COLUMNS.iter().position(|c| *c == name)
}
