use crate::error::Result;
use crate::types::{Transaction, TransactionJson};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Header-less CSV, one line item per row, columns in schema order.
pub fn write_transactions_csv(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(create(path)?);
    for t in transactions {
        wtr.serialize(t)?;
    }
    wtr.flush()?;
    info!("💾 Wrote {} transactions to {}", transactions.len(), path.display());
    Ok(())
}

/// Newline-delimited JSON, one record per line, timestamps as epoch milliseconds.
pub fn write_transactions_json(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut out = create(path)?;
    for t in transactions {
        serde_json::to_writer(&mut out, &TransactionJson::from(t))?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    info!("💾 Wrote {} JSON records to {}", transactions.len(), path.display());
    Ok(())
}

pub fn read_transactions_csv(path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        out.push(record?);
    }
    Ok(out)
}

pub fn read_transactions_json(path: &Path) -> Result<Vec<Transaction>> {
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: TransactionJson = serde_json::from_str(&line)?;
        out.push(record.into());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Vec<Transaction> {
        let date = NaiveDate::from_ymd_opt(2010, 12, 1)
            .unwrap()
            .and_hms_opt(8, 26, 0)
            .unwrap();
        vec![
            Transaction {
                invoice_no: 5363651,
                stock_code: "85123A".into(),
                description: Some("SET 7 BABUSHKA NESTING BOXES, \"LARGE\"".into()),
                quantity: 6,
                invoice_date: date,
                unit_price: 2.55,
                customer_id: 17850,
                country: "United Kingdom".into(),
                line_no: 1,
            },
            Transaction {
                invoice_no: 5363652,
                stock_code: "71053".into(),
                description: None,
                quantity: 6,
                invoice_date: date + chrono::Duration::hours(12),
                unit_price: 3.39,
                customer_id: 17850,
                country: "United Kingdom".into(),
                line_no: 2,
            },
        ]
    }

    #[test]
    fn csv_is_headerless_in_schema_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OnlineRetail.csv");
        write_transactions_csv(&path, &sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "5363651,85123A,\"SET 7 BABUSHKA NESTING BOXES, \"\"LARGE\"\"\",6,2010-12-01 08:26:00,2.55,17850,United Kingdom,1"
        );
        assert_eq!(
            lines[1],
            "5363652,71053,,6,2010-12-01 20:26:00,3.39,17850,United Kingdom,2"
        );
    }

    #[test]
    fn json_lines_carry_epoch_millis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OnlineRetail.json");
        write_transactions_json(&path, &sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["InvoiceDate"], 1291191960000i64);
        assert_eq!(first["InvoiceNo"], 5363651);
        assert!(first.get("InvoiceTime").is_none());
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn csv_and_json_describe_the_same_records() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("t.csv");
        let json_path = dir.path().join("t.json");
        write_transactions_csv(&csv_path, &sample()).unwrap();
        write_transactions_json(&json_path, &sample()).unwrap();

        let from_csv = read_transactions_csv(&csv_path).unwrap();
        let from_json = read_transactions_json(&json_path).unwrap();
        assert_eq!(from_csv, sample());
        assert_eq!(from_json, from_csv);
    }

    #[test]
    fn sub_second_times_survive_both_formats() {
        let mut records = sample();
        records[0].invoice_date += chrono::Duration::milliseconds(500);

        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("t.csv");
        let json_path = dir.path().join("t.json");
        write_transactions_csv(&csv_path, &records).unwrap();
        write_transactions_json(&json_path, &records).unwrap();

        let text = fs::read_to_string(&csv_path).unwrap();
        assert!(text.lines().next().unwrap().contains("2010-12-01 08:26:00.500,"));
        let json = fs::read_to_string(&json_path).unwrap();
        let first: serde_json::Value = serde_json::from_str(json.lines().next().unwrap()).unwrap();
        assert_eq!(first["InvoiceDate"], 1291191960500i64);

        assert_eq!(read_transactions_csv(&csv_path).unwrap(), records);
        assert_eq!(read_transactions_json(&json_path).unwrap(), records);
    }
}
