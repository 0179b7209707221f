//! Validate command - surface input and data issues without a full report.

use super::{read_input, read_rates};
use crate::pipeline;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// CSV or JSON file containing transactions
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file of daily USD/INR rates
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(rename = "type")]
    issue_type: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ValidationOutput {
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let input = read_input(&self.input)?;

        let mut issues: Vec<ValidationIssue> = input
            .issues()
            .iter()
            .map(|e| ValidationIssue {
                issue_type: "InvalidInput".to_string(),
                message: e.to_string(),
            })
            .collect();

        // Run the pipeline only on valid input; its warnings are issues too.
        if issues.is_empty() {
            let mut rates = read_rates(self.rates.as_deref())?;
            let run = pipeline::run(&input, &mut rates)?;
            issues.extend(run.warnings.iter().map(|w| ValidationIssue {
                issue_type: match w {
                    crate::warnings::Warning::CostBasisMissing { .. } => "CostBasisMissing",
                    crate::warnings::Warning::ApproximateRate { .. } => "ApproximateRate",
                }
                .to_string(),
                message: w.to_string(),
            }));
        }

        if self.json {
            self.print_json(&issues)?;
        } else {
            self.print_text(&issues);
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }

    fn print_text(&self, issues: &[ValidationIssue]) {
        println!();
        println!("VALIDATION RESULTS");
        println!();

        if issues.is_empty() {
            println!("\u{2713} No issues found.");
        } else {
            println!("\u{26A0} {} issue(s) found:", issues.len());
            println!();
            for (i, issue) in issues.iter().enumerate() {
                println!("  {}. [{}] {}", i + 1, issue.issue_type, issue.message);
            }
            println!();
        }
    }

    fn print_json(&self, issues: &[ValidationIssue]) -> anyhow::Result<()> {
        let output = ValidationOutput {
            issue_count: issues.len(),
            issues: issues.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
