//! Gains command - per-disposal view with filtering.

use super::{format_inr_signed, read_input, read_rates};
use crate::classify::{AssetClass, GainRecord};
use crate::pipeline;
use crate::tax::FiscalYear;
use clap::{Args, ValueEnum};
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct GainsCommand {
    /// CSV or JSON file containing transactions
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file of daily USD/INR rates
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Fiscal year to filter by start year (e.g., 2024 for FY 2024-25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Filter by asset class
    #[arg(short, long, value_enum)]
    asset: Option<AssetClassFilter>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AssetClassFilter {
    ForeignEquity,
    Rsu,
    Espp,
    IndianStock,
    IndianMf,
}

impl AssetClassFilter {
    fn matches(&self, asset_class: AssetClass) -> bool {
        matches!(
            (self, asset_class),
            (AssetClassFilter::ForeignEquity, AssetClass::ForeignEquity)
                | (AssetClassFilter::Rsu, AssetClass::ForeignRsu)
                | (AssetClassFilter::Espp, AssetClass::ForeignEspp)
                | (AssetClassFilter::IndianStock, AssetClass::IndianStock)
                | (AssetClassFilter::IndianMf, AssetClass::IndianMutualFund)
        )
    }
}

/// Row for the gains table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct GainRow {
    #[tabled(rename = "Sale Date")]
    pub sale_date: String,

    #[tabled(rename = "Symbol")]
    pub symbol: String,

    #[tabled(rename = "Class")]
    pub asset_class: String,

    #[tabled(rename = "Qty")]
    pub quantity: String,

    #[tabled(rename = "Acquired")]
    pub acquired: String,

    #[tabled(rename = "Held")]
    pub held: String,

    #[tabled(rename = "Term")]
    pub term: String,

    #[tabled(rename = "Proceeds (INR)")]
    pub proceeds: String,

    #[tabled(rename = "Cost (INR)")]
    pub cost: String,

    #[tabled(rename = "Gain (INR)")]
    pub gain: String,
}

impl GainsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let input = read_input(&self.input)?;
        let mut rates = read_rates(self.rates.as_deref())?;
        let run = pipeline::run(&input, &mut rates)?;

        let rows = build_gain_rows(&run.records, self.year.map(FiscalYear), self.asset);

        if self.csv {
            self.write_csv(&rows)
        } else {
            self.print_table(&rows);
            Ok(())
        }
    }

    fn print_table(&self, rows: &[GainRow]) {
        if rows.is_empty() {
            println!("No gains found matching filters");
            return;
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, rows: &[GainRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn build_gain_rows(
    records: &[GainRecord],
    year: Option<FiscalYear>,
    asset: Option<AssetClassFilter>,
) -> Vec<GainRow> {
    records
        .iter()
        .filter(|r| year.is_none_or(|y| y.contains(r.sale_date)))
        .filter(|r| asset.is_none_or(|a| a.matches(r.asset_class)))
        .map(|r| {
            // Statement rows carry no share detail, only the amount.
            let from_statement = r.shares.is_zero();
            GainRow {
                sale_date: r.sale_date.format("%Y-%m-%d").to_string(),
                symbol: r.symbol.clone(),
                asset_class: r.asset_class.label().to_string(),
                quantity: if from_statement {
                    "-".to_string()
                } else {
                    format_quantity(r.shares)
                },
                acquired: if from_statement {
                    "-".to_string()
                } else {
                    r.acquisition_date.format("%Y-%m-%d").to_string()
                },
                held: if from_statement {
                    "-".to_string()
                } else {
                    r.holding_period_display()
                },
                term: if r.is_long_term { "LT" } else { "ST" }.to_string(),
                proceeds: if from_statement {
                    "-".to_string()
                } else {
                    format!("{:.2}", r.sale_value_inr)
                },
                cost: if from_statement {
                    "-".to_string()
                } else {
                    format!("{:.2}", r.cost_value_inr)
                },
                gain: format_inr_signed(r.gain_inr),
            }
        })
        .collect()
}

fn format_quantity(qty: rust_decimal::Decimal) -> String {
    let s = format!("{:.4}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
