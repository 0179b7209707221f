//! Holding-period classification and INR conversion of matched sales.
//!
//! The gain is always computed per side in INR: proceeds at the sale-date
//! rate, cost at the acquisition-date rate, fees at the sale-date rate.
//! Converting a foreign-currency difference at a single rate would misstate
//! the gain whenever the rate moved between acquisition and disposal.

use crate::fifo::LotMatch;
use crate::rates::{RateError, RateTable};
use crate::transaction::{Currency, StatementGain, Term};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Rate(#[from] RateError),
    #[error("sale on {sale_date} predates acquisition on {acquisition_date} for {symbol}")]
    SaleBeforeAcquisition {
        symbol: String,
        sale_date: NaiveDate,
        acquisition_date: NaiveDate,
    },
}

/// Asset class, which fixes the long-term holding threshold and the tax
/// regime the gain lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    ForeignEquity,
    ForeignRsu,
    ForeignEspp,
    IndianStock,
    IndianMutualFund,
}

impl AssetClass {
    pub fn is_foreign(&self) -> bool {
        matches!(
            self,
            AssetClass::ForeignEquity | AssetClass::ForeignRsu | AssetClass::ForeignEspp
        )
    }

    /// Long-term iff holding_period_days is strictly greater than this.
    pub fn long_term_threshold_days(&self) -> i64 {
        if self.is_foreign() {
            730
        } else {
            365
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetClass::ForeignEquity => "Foreign Equity",
            AssetClass::ForeignRsu => "RSU",
            AssetClass::ForeignEspp => "ESPP",
            AssetClass::IndianStock => "Indian Stock",
            AssetClass::IndianMutualFund => "Indian MF",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One realized capital-gain event in both currencies. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GainRecord {
    pub sale_date: NaiveDate,
    pub acquisition_date: NaiveDate,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub currency: Currency,
    pub shares: Decimal,
    /// Per-share amounts in the source currency.
    pub sale_price: Decimal,
    pub cost_price: Decimal,
    pub fees: Decimal,
    pub sale_rate: Decimal,
    pub acquisition_rate: Decimal,
    pub sale_value_inr: Decimal,
    pub cost_value_inr: Decimal,
    pub fees_inr: Decimal,
    /// Signed gain in the source currency.
    pub gain: Decimal,
    /// Signed gain in INR; this is what aggregation and tax run on.
    pub gain_inr: Decimal,
    pub holding_period_days: i64,
    pub is_long_term: bool,
    pub source: Option<String>,
}

impl GainRecord {
    /// Formatted holding period like "2y 5m".
    pub fn holding_period_display(&self) -> String {
        let years = self.holding_period_days / 365;
        let months = (self.holding_period_days % 365) / 30;
        format!("{}y {}m", years, months)
    }
}

/// Inputs for classifying one sale with a known acquisition.
#[derive(Debug, Clone)]
pub struct Sale<'a> {
    pub symbol: &'a str,
    pub asset_class: AssetClass,
    pub currency: Currency,
    pub acquisition_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub shares: Decimal,
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
    pub fees: Decimal,
    pub source: Option<&'a str>,
}

pub fn classify_sale(sale: Sale<'_>, rates: &mut RateTable) -> Result<GainRecord, ClassifyError> {
    if sale.sale_date < sale.acquisition_date {
        return Err(ClassifyError::SaleBeforeAcquisition {
            symbol: sale.symbol.to_string(),
            sale_date: sale.sale_date,
            acquisition_date: sale.acquisition_date,
        });
    }

    let holding_period_days = (sale.sale_date - sale.acquisition_date).num_days();
    let is_long_term = holding_period_days > sale.asset_class.long_term_threshold_days();

    let (sale_rate, acquisition_rate) = match sale.currency {
        Currency::Inr => (Decimal::ONE, Decimal::ONE),
        Currency::Usd => (
            rates.resolve(sale.sale_date)?.rate,
            rates.resolve(sale.acquisition_date)?.rate,
        ),
    };

    let sale_value_inr = sale.unit_price * sale.shares * sale_rate;
    let cost_value_inr = sale.unit_cost * sale.shares * acquisition_rate;
    let fees_inr = sale.fees * sale_rate;

    Ok(GainRecord {
        sale_date: sale.sale_date,
        acquisition_date: sale.acquisition_date,
        symbol: sale.symbol.to_string(),
        asset_class: sale.asset_class,
        currency: sale.currency,
        shares: sale.shares,
        sale_price: sale.unit_price,
        cost_price: sale.unit_cost,
        fees: sale.fees,
        sale_rate,
        acquisition_rate,
        sale_value_inr,
        cost_value_inr,
        fees_inr,
        gain: (sale.unit_price - sale.unit_cost) * sale.shares - sale.fees,
        gain_inr: sale_value_inr - cost_value_inr - fees_inr,
        holding_period_days,
        is_long_term,
        source: sale.source.map(str::to_string),
    })
}

/// Classify one FIFO-matched slice. Fees are whatever share of the sale's
/// fees the caller attributes to this slice.
pub fn classify_match(
    lot_match: &LotMatch,
    asset_class: AssetClass,
    currency: Currency,
    fees: Decimal,
    source: Option<&str>,
    rates: &mut RateTable,
) -> Result<GainRecord, ClassifyError> {
    classify_sale(
        Sale {
            symbol: &lot_match.symbol,
            asset_class,
            currency,
            acquisition_date: lot_match.acquisition_date,
            sale_date: lot_match.sale_date,
            shares: lot_match.quantity,
            unit_cost: lot_match.unit_cost,
            unit_price: lot_match.unit_price,
            fees,
            source,
        },
        rates,
    )
}

/// Wrap a pre-computed INR statement row. Rows whose term is unknown (the
/// Zerodha P&L export carries no holding period) are force-classified as
/// short-term; that conservative policy bypasses the day-threshold rule.
pub fn classify_statement(gain: &StatementGain) -> GainRecord {
    let is_long_term = gain.term == Term::Long;
    GainRecord {
        sale_date: gain.date,
        acquisition_date: gain.date,
        symbol: gain.symbol.clone(),
        asset_class: gain.asset_class,
        currency: Currency::Inr,
        shares: Decimal::ZERO,
        sale_price: Decimal::ZERO,
        cost_price: Decimal::ZERO,
        fees: Decimal::ZERO,
        sale_rate: Decimal::ONE,
        acquisition_rate: Decimal::ONE,
        sale_value_inr: Decimal::ZERO,
        cost_value_inr: Decimal::ZERO,
        fees_inr: Decimal::ZERO,
        gain: gain.amount_inr,
        gain_inr: gain.amount_inr,
        holding_period_days: 0,
        is_long_term,
        source: gain.source.clone(),
    }
}
