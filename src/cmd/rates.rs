//! Rates command - audit how given dates would resolve.

use super::read_rates;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct RatesCommand {
    /// JSON file of daily USD/INR rates
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Dates to resolve (YYYY-MM-DD)
    #[arg(required = true)]
    dates: Vec<NaiveDate>,
}

#[derive(Debug, Tabled)]
struct RateRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "From")]
    resolved_date: String,
    #[tabled(rename = "Basis")]
    basis: String,
}

impl RatesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut rates = read_rates(self.rates.as_deref())?;

        let mut rows = Vec::new();
        for date in &self.dates {
            let resolution = rates.resolve(*date)?;
            rows.push(RateRow {
                date: date.format("%Y-%m-%d").to_string(),
                rate: format!("{:.4}", resolution.rate),
                resolved_date: resolution.resolved_date.format("%Y-%m-%d").to_string(),
                basis: resolution.basis.to_string(),
            });
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}
