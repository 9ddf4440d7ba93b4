use crate::constants::{transaction_column_index, COL_CUSTOMER_ID};
use crate::error::{DatasetError, Result};
use crate::types::Customer;
use chrono::NaiveDateTime;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, instrument};

/// A plausible but invented person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub address: String,
}

pub trait IdentityGenerator {
    fn generate(&mut self) -> Identity;
}

// Postcode areas and the letters Royal Mail allows in the inward code
const POSTCODE_AREAS: [&str; 20] = [
    "AB", "B", "BS", "CB", "CF", "CV", "EH", "EX", "G", "L", "LE", "LS", "M", "NE", "NG", "NR",
    "OX", "S", "SW", "YO",
];
const INWARD_LETTERS: &[u8] = b"ABDEFGHJLNPQRSTUWXYZ";

/// United Kingdom flavoured identities: English names, street/town lines, UK postcodes.
pub struct UkIdentityGenerator {
    rng: StdRng,
}

impl UkIdentityGenerator {
    /// Seeded generators repeat their output; unseeded ones differ every run.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn postcode(&mut self) -> String {
        let area = POSTCODE_AREAS[self.rng.gen_range(0..POSTCODE_AREAS.len())];
        let district: u8 = self.rng.gen_range(1..=20);
        let sector: u8 = self.rng.gen_range(0..=9);
        let a = INWARD_LETTERS[self.rng.gen_range(0..INWARD_LETTERS.len())] as char;
        let b = INWARD_LETTERS[self.rng.gen_range(0..INWARD_LETTERS.len())] as char;
        format!("{area}{district} {sector}{a}{b}")
    }
}

impl IdentityGenerator for UkIdentityGenerator {
    fn generate(&mut self) -> Identity {
        let first: String = FirstName().fake_with_rng(&mut self.rng);
        let last: String = LastName().fake_with_rng(&mut self.rng);
        let building: String = BuildingNumber().fake_with_rng(&mut self.rng);
        let street: String = StreetName().fake_with_rng(&mut self.rng);
        let town: String = CityName().fake_with_rng(&mut self.rng);
        let flat = if self.rng.gen_bool(0.25) {
            format!("Flat {}\n", self.rng.gen_range(1..=60))
        } else {
            String::new()
        };
        let postcode = self.postcode();

        Identity {
            name: format!("{first} {last}"),
            address: single_line(&format!("{flat}{building} {street}\n{town}\n{postcode}")),
        }
    }
}

/// Collapse line breaks (and the whitespace around them) into single spaces.
pub fn single_line(address: &str) -> String {
    address
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Distinct customer ids found in a header-less transaction CSV.
#[instrument]
pub fn distinct_customer_ids(transactions_csv: &Path) -> Result<BTreeSet<i64>> {
    let column = transaction_column_index(COL_CUSTOMER_ID).ok_or_else(|| {
        DatasetError::SynthesisInput(format!("{COL_CUSTOMER_ID} is not a transaction column"))
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(transactions_csv)
        .map_err(|e| {
            DatasetError::SynthesisInput(format!(
                "cannot open {}: {}",
                transactions_csv.display(),
                e
            ))
        })?;

    let mut ids = BTreeSet::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let raw = record.get(column).ok_or_else(|| {
            DatasetError::SynthesisInput(format!(
                "line {} has {} fields, expected at least {}",
                i + 1,
                record.len(),
                column + 1
            ))
        })?;
        let id = raw.trim().parse::<i64>().map_err(|_| {
            DatasetError::SynthesisInput(format!("line {}: '{}' is not a customer id", i + 1, raw))
        })?;
        ids.insert(id);
    }
    Ok(ids)
}

/// One identity per id, in ascending id order, all stamped with `valid_from`.
pub fn synthesize_customers(
    ids: &BTreeSet<i64>,
    generator: &mut dyn IdentityGenerator,
    valid_from: NaiveDateTime,
) -> Vec<Customer> {
    ids.iter()
        .map(|&customer_id| {
            let identity = generator.generate();
            Customer {
                customer_id,
                name: identity.name,
                address: identity.address,
                valid_from,
            }
        })
        .collect()
}

pub fn write_customers_csv(path: &Path, customers: &[Customer]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(File::create(path)?));
    for c in customers {
        wtr.serialize(c)?;
    }
    wtr.flush()?;
    info!("💾 Wrote {} customers to {}", customers.len(), path.display());
    Ok(())
}

pub fn read_customers_csv(path: &Path) -> Result<Vec<Customer>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        out.push(record?);
    }
    Ok(out)
}
