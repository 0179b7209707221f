//! USD-INR exchange rate resolution from a sparse daily table (SBI TT Buy
//! rates), with bounded fallback search for weekends and bank holidays.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateError {
    #[error("no exchange rate resolvable for {0}: no daily rate within 7 days and no quarterly fallback for the period")]
    Unavailable(NaiveDate),
}

/// How a rate was resolved for a requested date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBasis {
    /// Daily rate published on the requested date.
    Exact,
    /// Nearest published rate within 7 days after the requested date.
    Forward,
    /// Nearest published rate within 7 days before the requested date.
    Backward,
    /// Quarterly approximate rate; flagged so reports can call it out.
    Quarterly,
}

impl RateBasis {
    pub fn display(&self) -> &'static str {
        match self {
            RateBasis::Exact => "exact",
            RateBasis::Forward => "forward",
            RateBasis::Backward => "backward",
            RateBasis::Quarterly => "approx",
        }
    }
}

impl std::fmt::Display for RateBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateResolution {
    pub rate: Decimal,
    /// Date whose published rate was used (equals the requested date for
    /// exact and quarterly resolutions).
    pub resolved_date: NaiveDate,
    pub basis: RateBasis,
}

impl RateResolution {
    pub fn is_exact(&self) -> bool {
        self.basis == RateBasis::Exact
    }
}

/// Approximate average rates per calendar (year, quarter), used only when no
/// daily rate exists within the search window. Immutable configuration data.
const QUARTERLY_RATES: &[((i32, u32), Decimal)] = &[
    ((2022, 1), dec!(74.5)),
    ((2022, 2), dec!(76.5)),
    ((2022, 3), dec!(79.5)),
    ((2022, 4), dec!(81.5)),
    ((2023, 1), dec!(82.5)),
    ((2023, 2), dec!(82.0)),
    ((2023, 3), dec!(83.0)),
    ((2023, 4), dec!(83.0)),
    ((2024, 1), dec!(83.0)),
    ((2024, 2), dec!(83.5)),
    ((2024, 3), dec!(83.5)),
    ((2024, 4), dec!(84.0)),
    ((2025, 1), dec!(85.5)),
    ((2025, 2), dec!(85.0)),
    ((2025, 3), dec!(84.0)),
    ((2025, 4), dec!(84.5)),
];

/// Date-indexed rate table for one run. The daily table is read-only after
/// loading; `resolved` memoizes lookups and doubles as the audit log of which
/// dates used exact vs fallback rates.
#[derive(Debug, Default, Clone)]
pub struct RateTable {
    daily: BTreeMap<NaiveDate, Decimal>,
    resolved: BTreeMap<NaiveDate, RateResolution>,
}

impl RateTable {
    pub fn new(daily: BTreeMap<NaiveDate, Decimal>) -> Self {
        RateTable {
            daily,
            resolved: BTreeMap::new(),
        }
    }

    /// Load a `{"YYYY-MM-DD": rate}` JSON document.
    pub fn read_json<R: Read>(reader: R) -> anyhow::Result<Self> {
        let raw: BTreeMap<String, Decimal> = serde_json::from_reader(reader)?;
        let mut daily = BTreeMap::new();
        for (key, rate) in raw {
            let date = NaiveDate::parse_from_str(&key, "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("invalid date '{}' in rate file", key))?;
            daily.insert(date, rate);
        }
        log::debug!("loaded {} daily rates", daily.len());
        Ok(RateTable::new(daily))
    }

    pub fn len(&self) -> usize {
        self.daily.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// Resolve the rate for a date. First hit wins: exact, then forward scan
    /// up to 7 days, then backward scan up to 7 days, then the quarterly
    /// approximate table. The memo never changes the returned value --
    /// resolution is a pure function of (date, table).
    pub fn resolve(&mut self, date: NaiveDate) -> Result<RateResolution, RateError> {
        if let Some(resolution) = self.resolved.get(&date) {
            return Ok(*resolution);
        }
        let resolution = self.lookup(date)?;
        self.resolved.insert(date, resolution);
        Ok(resolution)
    }

    fn lookup(&self, date: NaiveDate) -> Result<RateResolution, RateError> {
        if let Some(&rate) = self.daily.get(&date) {
            return Ok(RateResolution {
                rate,
                resolved_date: date,
                basis: RateBasis::Exact,
            });
        }

        // Rates are not published on weekends/holidays; scan forward first.
        for offset in 1..=7 {
            let forward = date + Duration::days(offset);
            if let Some(&rate) = self.daily.get(&forward) {
                log::debug!("rate for {} resolved forward to {}", date, forward);
                return Ok(RateResolution {
                    rate,
                    resolved_date: forward,
                    basis: RateBasis::Forward,
                });
            }
        }
        for offset in 1..=7 {
            let backward = date - Duration::days(offset);
            if let Some(&rate) = self.daily.get(&backward) {
                log::debug!("rate for {} resolved backward to {}", date, backward);
                return Ok(RateResolution {
                    rate,
                    resolved_date: backward,
                    basis: RateBasis::Backward,
                });
            }
        }

        let quarter = (date.month() - 1) / 3 + 1;
        let key = (date.year(), quarter);
        if let Some((_, rate)) = QUARTERLY_RATES.iter().find(|(k, _)| *k == key) {
            log::warn!("no daily rate near {}, using quarterly approximate {}", date, rate);
            return Ok(RateResolution {
                rate: *rate,
                resolved_date: date,
                basis: RateBasis::Quarterly,
            });
        }

        Err(RateError::Unavailable(date))
    }

    /// All resolutions performed so far, keyed by the requested date.
    pub fn resolutions(&self) -> &BTreeMap<NaiveDate, RateResolution> {
        &self.resolved
    }
}
