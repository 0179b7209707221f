//! End-to-end run: validate input, match lots, classify, aggregate.

use crate::aggregate::{Aggregator, RegimeTotals};
use crate::classify::{self, ClassifyError, GainRecord};
use crate::fifo::{FifoError, LotBook};
use crate::rates::{RateBasis, RateError, RateTable};
use crate::transaction::{Action, Currency, InputError, TaxInput, Transaction};
use crate::warnings::Warning;
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// Everything a run produced: classified records sorted by sale date, the
/// regime totals, and whatever warnings came up along the way.
#[derive(Debug)]
pub struct Run {
    pub records: Vec<GainRecord>,
    pub totals: RegimeTotals,
    pub warnings: Vec<Warning>,
    /// Dividend income in INR, reported separately from capital gains.
    pub dividends_inr: Decimal,
    pub taxes_paid: Decimal,
}

pub fn run(input: &TaxInput, rates: &mut RateTable) -> Result<Run, PipelineError> {
    input.validate()?;

    // Stable sort so same-day buys land before the sells that rely on them
    // whenever the input lists them that way.
    let mut transactions: Vec<&Transaction> = input.transactions.iter().collect();
    transactions.sort_by_key(|t| t.date);

    let mut book = LotBook::new();
    let mut aggregator = Aggregator::new();
    let mut warnings = Vec::new();
    let mut dividends_inr = Decimal::ZERO;

    for tx in transactions {
        match tx.action {
            Action::Buy | Action::Vest => {
                book.add_lot(&tx.symbol, tx.date, tx.quantity, tx.price);
            }
            Action::Sell => {
                if let Some(link) = &tx.acquisition {
                    let record = classify::classify_sale(
                        classify::Sale {
                            symbol: &tx.symbol,
                            asset_class: tx.asset_class,
                            currency: tx.currency,
                            acquisition_date: link.date,
                            sale_date: tx.date,
                            shares: tx.quantity,
                            unit_cost: link.unit_cost,
                            unit_price: tx.price,
                            fees: tx.fees,
                            source: tx.source.as_deref(),
                        },
                        rates,
                    )?;
                    aggregator.accumulate(record);
                } else {
                    let matches = match book.match_sale(&tx.symbol, tx.date, tx.quantity, tx.price)
                    {
                        Ok(matches) => matches,
                        Err(FifoError::CostBasisMissing {
                            symbol,
                            date,
                            unmatched,
                        }) => {
                            log::warn!(
                                "skipping sale of {unmatched} {symbol} on {date}: no cost basis"
                            );
                            warnings.push(Warning::CostBasisMissing {
                                symbol,
                                date,
                                unmatched,
                            });
                            continue;
                        }
                    };

                    // Fees belong to the sale as a whole; spread them over
                    // the matched slices by quantity, with the last slice
                    // taking the remainder so the total is conserved.
                    let mut fees_left = tx.fees;
                    let last = matches.len().saturating_sub(1);
                    for (i, lot_match) in matches.iter().enumerate() {
                        let fee_share = if i == last {
                            fees_left
                        } else {
                            tx.fees * lot_match.quantity / tx.quantity
                        };
                        fees_left -= fee_share;
                        let record = classify::classify_match(
                            lot_match,
                            tx.asset_class,
                            tx.currency,
                            fee_share,
                            tx.source.as_deref(),
                            rates,
                        )?;
                        aggregator.accumulate(record);
                    }
                }
            }
            Action::Dividend => {
                let rate = match tx.currency {
                    Currency::Inr => Decimal::ONE,
                    Currency::Usd => rates.resolve(tx.date)?.rate,
                };
                dividends_inr += tx.quantity * tx.price * rate;
            }
        }
    }

    for gain in &input.statement_gains {
        aggregator.accumulate(classify::classify_statement(gain));
    }

    for (date, resolution) in rates.resolutions() {
        if resolution.basis == RateBasis::Quarterly {
            warnings.push(Warning::ApproximateRate {
                date: *date,
                rate: resolution.rate,
            });
        }
    }

    let (totals, mut records) = aggregator.into_parts();
    records.sort_by_key(|r| r.sale_date);

    Ok(Run {
        records,
        totals,
        warnings,
        dividends_inr,
        taxes_paid: input.taxes_paid,
    })
}
