//! FIFO lot matching for sales that arrive without a broker-supplied cost
//! basis. Lots are consumed oldest first; a sale may span several lots and
//! each matched slice keeps its own lot's acquisition date and unit cost.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FifoError {
    /// Open lots do not cover the sale. The sale must be excluded from
    /// totals rather than zero-costed; the book is left untouched.
    #[error("missing cost basis for {unmatched} {symbol} sold on {date}")]
    CostBasisMissing {
        symbol: String,
        date: NaiveDate,
        unmatched: Decimal,
    },
}

/// A purchase lot. `remaining` only ever decreases and stays within
/// `0 ..= quantity`.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLot {
    pub symbol: String,
    pub purchase_date: NaiveDate,
    pub quantity: Decimal,
    pub price: Decimal,
    pub remaining: Decimal,
}

impl StockLot {
    pub fn new(symbol: &str, purchase_date: NaiveDate, quantity: Decimal, price: Decimal) -> Self {
        StockLot {
            symbol: symbol.to_string(),
            purchase_date,
            quantity,
            price,
            remaining: quantity,
        }
    }
}

/// One matched slice of a sale against a single lot.
#[derive(Debug, Clone, PartialEq)]
pub struct LotMatch {
    pub symbol: String,
    pub acquisition_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
}

/// Per-symbol FIFO queues of open lots, ordered by acquisition date with
/// ties broken by insertion order.
#[derive(Debug, Default)]
pub struct LotBook {
    lots: HashMap<String, Vec<StockLot>>,
}

impl LotBook {
    pub fn new() -> Self {
        LotBook::default()
    }

    pub fn add_lot(&mut self, symbol: &str, purchase_date: NaiveDate, quantity: Decimal, price: Decimal) {
        let lots = self.lots.entry(symbol.to_string()).or_default();
        // Insert before the first strictly later lot so equal dates keep
        // their input order.
        let index = lots
            .iter()
            .position(|lot| lot.purchase_date > purchase_date)
            .unwrap_or(lots.len());
        lots.insert(index, StockLot::new(symbol, purchase_date, quantity, price));
        log::debug!(
            "lot {} ADD: {} @ {} on {}",
            symbol,
            quantity,
            price,
            purchase_date
        );
    }

    /// Total unconsumed quantity across a symbol's open lots.
    pub fn open_quantity(&self, symbol: &str) -> Decimal {
        self.lots
            .get(symbol)
            .map(|lots| lots.iter().map(|lot| lot.remaining).sum())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn open_lots(&self, symbol: &str) -> impl Iterator<Item = &StockLot> {
        self.lots
            .get(symbol)
            .into_iter()
            .flatten()
            .filter(|lot| lot.remaining > Decimal::ZERO)
    }

    /// Match a sale against open lots, oldest first. The shortfall check
    /// runs before any lot is mutated, so a rejected sale leaves the book
    /// exactly as it was.
    pub fn match_sale(
        &mut self,
        symbol: &str,
        sale_date: NaiveDate,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<Vec<LotMatch>, FifoError> {
        let available = self.open_quantity(symbol);
        if quantity > available {
            return Err(FifoError::CostBasisMissing {
                symbol: symbol.to_string(),
                date: sale_date,
                unmatched: quantity - available,
            });
        }

        let Some(lots) = self.lots.get_mut(symbol) else {
            return Ok(Vec::new());
        };

        let mut unmatched = quantity;
        let mut matches = Vec::new();
        for lot in lots.iter_mut() {
            if unmatched.is_zero() {
                break;
            }
            if lot.remaining <= Decimal::ZERO {
                continue;
            }
            let take = lot.remaining.min(unmatched);
            lot.remaining -= take;
            unmatched -= take;
            log::debug!(
                "lot {} MATCH: {} from {} @ {}, lot remaining {}",
                symbol,
                take,
                lot.purchase_date,
                lot.price,
                lot.remaining
            );
            matches.push(LotMatch {
                symbol: symbol.to_string(),
                acquisition_date: lot.purchase_date,
                sale_date,
                quantity: take,
                unit_cost: lot.price,
                unit_price,
            });
        }
        debug_assert!(unmatched.is_zero());
        Ok(matches)
    }
}
