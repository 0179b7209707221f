//! Input model: broker transactions and pre-computed statement gains.

use crate::classify::AssetClass;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("non-positive quantity {quantity} for {symbol} on {date}")]
    NonPositiveQuantity {
        symbol: String,
        date: NaiveDate,
        quantity: Decimal,
    },
    #[error("negative price {price} for {symbol} on {date}")]
    NegativePrice {
        symbol: String,
        date: NaiveDate,
        price: Decimal,
    },
    #[error("negative fees {fees} for {symbol} on {date}")]
    NegativeFees {
        symbol: String,
        date: NaiveDate,
        fees: Decimal,
    },
    #[error("acquisition on {acquisition_date} is after sale on {date} for {symbol}")]
    AcquisitionAfterSale {
        symbol: String,
        date: NaiveDate,
        acquisition_date: NaiveDate,
    },
    #[error("dividend for {symbol} on {date} cannot carry an acquisition link")]
    UnexpectedAcquisition { symbol: String, date: NaiveDate },
    #[error("negative taxes paid: {0}")]
    NegativeTaxesPaid(Decimal),
    #[error("acquisition link requires both date and unit cost: {symbol} on {date}")]
    PartialAcquisition { symbol: String, date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Buy,
    Sell,
    Vest,
    Dividend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Inr => write!(f, "INR"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

/// Known acquisition for a sale, so no FIFO matching is needed. Broker
/// exports for RSU and ESPP sales carry this per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionLink {
    pub date: NaiveDate,
    pub unit_cost: Decimal,
    #[serde(default)]
    pub grant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub action: Action,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub currency: Currency,
    pub quantity: Decimal,
    /// Per-unit price in the transaction currency. For dividends this is
    /// the per-unit payout.
    pub price: Decimal,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default)]
    pub acquisition: Option<AcquisitionLink>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Holding-period term on a pre-computed statement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Long,
    Short,
    /// The statement did not say; treated as short term downstream.
    #[default]
    Unknown,
}

/// A realized gain already computed in INR by a domestic broker's P&L
/// statement. These bypass lot matching and rate conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementGain {
    pub date: NaiveDate,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub amount_inr: Decimal,
    #[serde(default)]
    pub term: Term,
    #[serde(default)]
    pub source: Option<String>,
}

/// Input root for a tax run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxInput {
    #[serde(default)]
    pub taxes_paid: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub statement_gains: Vec<StatementGain>,
}

impl TaxInput {
    /// All validation failures in the input, in input order.
    pub fn issues(&self) -> Vec<InputError> {
        let mut issues = Vec::new();
        if self.taxes_paid < Decimal::ZERO {
            issues.push(InputError::NegativeTaxesPaid(self.taxes_paid));
        }
        for tx in &self.transactions {
            if tx.quantity <= Decimal::ZERO {
                issues.push(InputError::NonPositiveQuantity {
                    symbol: tx.symbol.clone(),
                    date: tx.date,
                    quantity: tx.quantity,
                });
            }
            if tx.price < Decimal::ZERO {
                issues.push(InputError::NegativePrice {
                    symbol: tx.symbol.clone(),
                    date: tx.date,
                    price: tx.price,
                });
            }
            if tx.fees < Decimal::ZERO {
                issues.push(InputError::NegativeFees {
                    symbol: tx.symbol.clone(),
                    date: tx.date,
                    fees: tx.fees,
                });
            }
            if let Some(link) = &tx.acquisition {
                if tx.action == Action::Dividend {
                    issues.push(InputError::UnexpectedAcquisition {
                        symbol: tx.symbol.clone(),
                        date: tx.date,
                    });
                } else if link.date > tx.date {
                    issues.push(InputError::AcquisitionAfterSale {
                        symbol: tx.symbol.clone(),
                        date: tx.date,
                        acquisition_date: link.date,
                    });
                }
            }
        }
        issues
    }

    pub fn validate(&self) -> Result<(), InputError> {
        match self.issues().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }

    /// Symbols appearing anywhere in the input, sorted and deduplicated.
    pub fn symbols(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut symbols: Vec<String> = self
            .transactions
            .iter()
            .map(|t| t.symbol.as_str())
            .chain(self.statement_gains.iter().map(|g| g.symbol.as_str()))
            .filter(|s| seen.insert(s))
            .map(str::to_string)
            .collect();
        symbols.sort();
        symbols
    }
}

/// Read a full tax input from JSON.
pub fn read_input_json<R: Read>(reader: R) -> anyhow::Result<TaxInput> {
    let input: TaxInput = serde_json::from_reader(reader)?;
    Ok(input)
}

/// One row of a transactions CSV export.
#[derive(Debug, Deserialize)]
struct TransactionRecord {
    date: NaiveDate,
    action: Action,
    symbol: String,
    asset_class: AssetClass,
    currency: Currency,
    quantity: Decimal,
    price: Decimal,
    #[serde(default)]
    fees: Option<Decimal>,
    #[serde(default)]
    acquisition_date: Option<NaiveDate>,
    #[serde(default)]
    acquisition_cost: Option<Decimal>,
    #[serde(default)]
    grant_id: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = InputError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let acquisition = match (record.acquisition_date, record.acquisition_cost) {
            (Some(date), Some(unit_cost)) => Some(AcquisitionLink {
                date,
                unit_cost,
                grant_id: record.grant_id,
            }),
            (None, None) => None,
            _ => {
                return Err(InputError::PartialAcquisition {
                    symbol: record.symbol,
                    date: record.date,
                })
            }
        };
        Ok(Transaction {
            date: record.date,
            action: record.action,
            symbol: record.symbol,
            asset_class: record.asset_class,
            currency: record.currency,
            quantity: record.quantity,
            price: record.price,
            fees: record.fees.unwrap_or_default(),
            acquisition,
            source: record.source,
        })
    }
}

/// Read transactions from CSV. Statement gains and taxes paid have no CSV
/// representation, so the result has only transactions populated.
pub fn read_transactions_csv<R: Read>(reader: R) -> anyhow::Result<TaxInput> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut transactions = Vec::new();
    for result in csv_reader.deserialize() {
        let record: TransactionRecord = result?;
        transactions.push(Transaction::try_from(record)?);
    }
    Ok(TaxInput {
        transactions,
        ..Default::default()
    })
}
