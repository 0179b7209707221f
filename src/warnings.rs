//! Non-fatal issues surfaced alongside a run's results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A condition the run could recover from but the user should review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    /// A sale could not be fully matched to purchase lots; the unmatched
    /// quantity was skipped rather than taxed with a zero cost basis.
    CostBasisMissing {
        symbol: String,
        date: NaiveDate,
        unmatched: Decimal,
    },
    /// No daily rate existed within the scan window, so the quarterly
    /// approximation was used for this date.
    ApproximateRate { date: NaiveDate, rate: Decimal },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::CostBasisMissing {
                symbol,
                date,
                unmatched,
            } => write!(
                f,
                "missing cost basis: {unmatched} {symbol} sold on {date} skipped"
            ),
            Warning::ApproximateRate { date, rate } => {
                write!(f, "approximate rate {rate} used for {date}")
            }
        }
    }
}
