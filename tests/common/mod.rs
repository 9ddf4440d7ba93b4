//! Fixtures shared by the integration tests: source workbooks built in a
//! temp dir and fetchers that serve them.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use retail_dataset::fetcher::SourceFetcher;
use retail_dataset::{DatasetConfig, DatasetError};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::Path;

/// Serves a fixed workbook instead of going to the network.
pub struct StubFetcher {
    pub bytes: Vec<u8>,
}

#[async_trait]
impl SourceFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> retail_dataset::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

pub struct FailingFetcher;

#[async_trait]
impl SourceFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> retail_dataset::Result<Vec<u8>> {
        Err(DatasetError::HttpStatus {
            url: url.to_string(),
            status: 503,
        })
    }
}

pub struct SheetRow {
    pub invoice: &'static str,
    pub stock: &'static str,
    pub description: &'static str,
    pub quantity: f64,
    /// minutes after 2010-12-01 00:00
    pub minutes: u32,
    pub price: f64,
    pub customer: Option<f64>,
    pub country: &'static str,
}

pub fn row(
    invoice: &'static str,
    quantity: f64,
    minutes: u32,
    customer: Option<f64>,
) -> SheetRow {
    SheetRow {
        invoice,
        stock: "85123A",
        description: "WHITE HANGING HEART T-LIGHT HOLDER",
        quantity,
        minutes,
        price: 2.55,
        customer,
        country: "United Kingdom",
    }
}

pub fn base_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2010, 12, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn write_workbook(path: &Path, rows: &[SheetRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Online Retail")?;

    let header = [
        "InvoiceNo",
        "StockCode",
        "Description",
        "Quantity",
        "InvoiceDate",
        "UnitPrice",
        "CustomerID",
        "Country",
    ];
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (i, r) in rows.iter().enumerate() {
        let line = i as u32 + 1;
        match r.invoice.parse::<f64>() {
            Ok(n) => worksheet.write_number(line, 0, n)?,
            Err(_) => worksheet.write_string(line, 0, r.invoice)?,
        };
        worksheet.write_string(line, 1, r.stock)?;
        worksheet.write_string(line, 2, r.description)?;
        worksheet.write_number(line, 3, r.quantity)?;
        // Excel serial 40513 is 2010-12-01
        let serial = 40513.0 + f64::from(r.minutes) / 1440.0;
        worksheet.write_number_with_format(line, 4, serial, &date_format)?;
        worksheet.write_number(line, 5, r.price)?;
        if let Some(customer) = r.customer {
            worksheet.write_number(line, 6, customer)?;
        }
        worksheet.write_string(line, 7, r.country)?;
    }

    workbook.save(path)?;
    Ok(())
}

pub fn stub_for(dir: &Path, rows: &[SheetRow]) -> Result<StubFetcher> {
    let source = dir.join("source.xlsx");
    write_workbook(&source, rows)?;
    Ok(StubFetcher {
        bytes: fs::read(&source)?,
    })
}

pub fn config_in(dir: &Path) -> DatasetConfig {
    let mut config = DatasetConfig::default();
    config.output_dir = dir.join("out");
    config.customers.seed = Some(2010);
    config
}

pub fn mixed_batch() -> Vec<SheetRow> {
    let mut rows = vec![
        row("C536379", -1.0, 9 * 60 + 41, Some(14527.0)),
        row("536370", 12.0, 8 * 60 + 45, Some(12583.0)),
        row("536370", 24.0, 8 * 60 + 45, Some(12583.0)),
        row("536371", 0.0, 9 * 60, Some(13748.0)),
        row("536372", 6.0, 9 * 60 + 1, None),
        row("536370", 4.0, 8 * 60 + 45, Some(12583.0)),
        row("536373", 6.0, 21 * 60 + 30, Some(17850.0)),
    ];
    // A spread of later invoices across the trading day
    for (i, invoice) in ["536380", "536381", "536382", "536383", "536384"].iter().enumerate() {
        let minutes = 7 * 60 + 90 * i as u32;
        rows.push(row(invoice, 2.0, minutes, Some(13047.0 + i as f64)));
        rows.push(row(invoice, 3.0, minutes, Some(13047.0 + i as f64)));
    }
    rows
}
