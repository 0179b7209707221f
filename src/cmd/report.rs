//! Report command - full tax summary: totals, set-off, liability.

use super::{format_inr, format_inr_signed, read_input, read_rates};
use crate::aggregate::Quarter;
use crate::pipeline;
use crate::tax::{compute_tax, TaxRates, TaxResult};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReportCommand {
    /// CSV or JSON file containing transactions
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file of daily USD/INR rates
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Advance tax and TDS already paid, overriding the input file
    #[arg(short, long)]
    taxes_paid: Option<Decimal>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct QuarterRow {
    #[tabled(rename = "Period")]
    period: &'static str,
    #[tabled(rename = "LTCG")]
    ltcg: String,
    #[tabled(rename = "STCG")]
    stcg: String,
}

#[derive(Debug, Serialize)]
struct ReportData {
    foreign_ltcg: String,
    foreign_stcg: String,
    indian_ltcg: String,
    indian_stcg: String,
    losses_set_off: String,
    exemption_used: String,
    net_ltcg: String,
    net_stcg: String,
    tax_foreign_ltcg: String,
    tax_foreign_stcg: String,
    tax_indian_ltcg: String,
    tax_indian_stcg: String,
    surcharge: String,
    cess: String,
    total_tax: String,
    dividends: String,
    taxes_paid: String,
    net_payable: String,
    warnings: Vec<String>,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut input = read_input(&self.input)?;
        if let Some(taxes_paid) = self.taxes_paid {
            input.taxes_paid = taxes_paid;
        }
        let mut rates = read_rates(self.rates.as_deref())?;

        let run = pipeline::run(&input, &mut rates)?;
        let result = compute_tax(&run.totals, run.taxes_paid, &TaxRates::fy2025())?;

        if self.json {
            self.print_json(&run, &result)
        } else {
            self.print_report(&run, &result);
            Ok(())
        }
    }

    fn print_report(&self, run: &pipeline::Run, result: &TaxResult) {
        println!();
        println!("CAPITAL GAINS");
        println!(
            "  Foreign LTCG: {} | Foreign STCG: {}",
            format_inr_signed(result.gross.foreign_ltcg),
            format_inr_signed(result.gross.foreign_stcg)
        );
        println!(
            "  Indian LTCG:  {} | Indian STCG:  {}",
            format_inr_signed(result.gross.indian_ltcg),
            format_inr_signed(result.gross.indian_stcg)
        );
        println!();

        if !result.set_off.total().is_zero() {
            println!("LOSS SET-OFF");
            let s = &result.set_off;
            if !s.stcg_loss_against_foreign_stcg.is_zero() {
                println!(
                    "  STCG loss vs foreign STCG: {}",
                    format_inr(s.stcg_loss_against_foreign_stcg)
                );
            }
            if !s.stcg_loss_against_indian_stcg.is_zero() {
                println!(
                    "  STCG loss vs Indian STCG:  {}",
                    format_inr(s.stcg_loss_against_indian_stcg)
                );
            }
            if !s.stcg_loss_against_ltcg.is_zero() {
                println!(
                    "  STCG loss vs LTCG:         {}",
                    format_inr(s.stcg_loss_against_ltcg)
                );
            }
            if !s.ltcg_loss_against_ltcg.is_zero() {
                println!(
                    "  LTCG loss vs LTCG:         {}",
                    format_inr(s.ltcg_loss_against_ltcg)
                );
            }
            println!();
        }

        if !result.unabsorbed_stcg_loss.is_zero() || !result.unabsorbed_ltcg_loss.is_zero() {
            println!("CARRY FORWARD");
            if !result.unabsorbed_stcg_loss.is_zero() {
                println!("  STCG loss: {}", format_inr(result.unabsorbed_stcg_loss));
            }
            if !result.unabsorbed_ltcg_loss.is_zero() {
                println!("  LTCG loss: {}", format_inr(result.unabsorbed_ltcg_loss));
            }
            println!();
        }

        println!("TAX");
        println!(
            "  Net LTCG: {} (112A exemption used: {})",
            format_inr_signed(result.net_ltcg()),
            format_inr(result.exemption_used)
        );
        println!("  Net STCG: {}", format_inr_signed(result.net_stcg()));
        println!(
            "  Foreign LTCG: {} | Foreign STCG: {}",
            format_inr(result.tax_foreign_ltcg),
            format_inr(result.tax_foreign_stcg)
        );
        println!(
            "  Indian LTCG:  {} | Indian STCG:  {}",
            format_inr(result.tax_indian_ltcg),
            format_inr(result.tax_indian_stcg)
        );
        println!(
            "  Total tax: {} (surcharge {}, cess {})",
            format_inr(result.total_tax()),
            format_inr(result.total_surcharge()),
            format_inr(result.total_cess())
        );
        println!();

        if !run.dividends_inr.is_zero() {
            println!("DIVIDENDS (taxed at slab rate, not included above)");
            println!("  Total: {}", format_inr(run.dividends_inr));
            println!();
        }

        println!("ADVANCE TAX QUARTERS");
        let rows: Vec<QuarterRow> = Quarter::ALL
            .iter()
            .map(|q| {
                let totals = run.totals.quarterly.get(q).copied().unwrap_or_default();
                QuarterRow {
                    period: q.label(),
                    ltcg: format_inr_signed(totals.ltcg),
                    stcg: format_inr_signed(totals.stcg),
                }
            })
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();

        println!(
            "TAXES PAID: {} | NET PAYABLE: {}",
            format_inr(result.taxes_paid),
            format_inr_signed(result.net_payable())
        );
        println!();

        if !run.warnings.is_empty() {
            println!("WARNINGS");
            for warning in &run.warnings {
                println!("  - {}", warning);
            }
            println!();
        }
    }

    fn print_json(&self, run: &pipeline::Run, result: &TaxResult) -> anyhow::Result<()> {
        let data = ReportData {
            foreign_ltcg: format!("{:.2}", result.gross.foreign_ltcg),
            foreign_stcg: format!("{:.2}", result.gross.foreign_stcg),
            indian_ltcg: format!("{:.2}", result.gross.indian_ltcg),
            indian_stcg: format!("{:.2}", result.gross.indian_stcg),
            losses_set_off: format!("{:.2}", result.set_off.total()),
            exemption_used: format!("{:.2}", result.exemption_used),
            net_ltcg: format!("{:.2}", result.net_ltcg()),
            net_stcg: format!("{:.2}", result.net_stcg()),
            tax_foreign_ltcg: format!("{:.2}", result.tax_foreign_ltcg),
            tax_foreign_stcg: format!("{:.2}", result.tax_foreign_stcg),
            tax_indian_ltcg: format!("{:.2}", result.tax_indian_ltcg),
            tax_indian_stcg: format!("{:.2}", result.tax_indian_stcg),
            surcharge: format!("{:.2}", result.total_surcharge()),
            cess: format!("{:.2}", result.total_cess()),
            total_tax: format!("{:.2}", result.total_tax()),
            dividends: format!("{:.2}", run.dividends_inr),
            taxes_paid: format!("{:.2}", result.taxes_paid),
            net_payable: format!("{:.2}", result.net_payable()),
            warnings: run.warnings.iter().map(|w| w.to_string()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}
