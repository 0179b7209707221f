pub mod gains;
pub mod rates;
pub mod report;
pub mod validate;

use crate::rates::RateTable;
use crate::transaction::{self, TaxInput};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a tax input from CSV or JSON based on extension.
pub fn read_input(path: &Path) -> anyhow::Result<TaxInput> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => transaction::read_input_json(reader),
        _ => transaction::read_transactions_csv(reader),
    }
}

/// Read daily exchange rates from JSON. With no file the table is empty
/// and every lookup falls back to the quarterly approximations.
pub fn read_rates(path: Option<&Path>) -> anyhow::Result<RateTable> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            RateTable::read_json(BufReader::new(file))
        }
        None => {
            log::warn!("no rates file given; all conversions will use approximate rates");
            Ok(RateTable::default())
        }
    }
}

pub(crate) fn format_inr(amount: Decimal) -> String {
    format!("₹{:.2}", amount)
}

pub(crate) fn format_inr_signed(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-₹{:.2}", amount.abs())
    } else {
        format!("₹{:.2}", amount)
    }
}
