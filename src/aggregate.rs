//! Regime and quarter aggregation of classified gain records.

use crate::classify::GainRecord;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Advance-tax instalment period within a fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Quarter {
    UptoJun15,
    Jun16Sep15,
    Sep16Dec15,
    Dec16Mar15,
    Mar16Mar31,
}

impl Quarter {
    pub const ALL: [Quarter; 5] = [
        Quarter::UptoJun15,
        Quarter::Jun16Sep15,
        Quarter::Sep16Dec15,
        Quarter::Dec16Mar15,
        Quarter::Mar16Mar31,
    ];

    /// The instalment period a realization date falls in. The fiscal year
    /// runs Apr 1 to Mar 31, so Apr and May land in the first period and
    /// the back half of March in the last.
    pub fn for_date(date: NaiveDate) -> Quarter {
        let (month, day) = (date.month(), date.day());
        if month == 4 || month == 5 || (month == 6 && day <= 15) {
            Quarter::UptoJun15
        } else if month == 6 || month == 7 || month == 8 || (month == 9 && day <= 15) {
            Quarter::Jun16Sep15
        } else if month == 9 || month == 10 || month == 11 || (month == 12 && day <= 15) {
            Quarter::Sep16Dec15
        } else if month == 12 || month == 1 || month == 2 || (month == 3 && day <= 15) {
            Quarter::Dec16Mar15
        } else {
            Quarter::Mar16Mar31
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quarter::UptoJun15 => "Upto 15 Jun",
            Quarter::Jun16Sep15 => "16 Jun-15 Sep",
            Quarter::Sep16Dec15 => "16 Sep-15 Dec",
            Quarter::Dec16Mar15 => "16 Dec-15 Mar",
            Quarter::Mar16Mar31 => "16 Mar-31 Mar",
        }
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QuarterTotals {
    pub ltcg: Decimal,
    pub stcg: Decimal,
}

/// Gains summed by regime (foreign vs Indian, long vs short term) and by
/// advance-tax quarter. Sums are signed so losses net in where they occur.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegimeTotals {
    pub foreign_ltcg: Decimal,
    pub foreign_stcg: Decimal,
    pub indian_ltcg: Decimal,
    pub indian_stcg: Decimal,
    /// Long-term gains eligible for the Section 112A exemption. Listed
    /// Indian equity and equity mutual funds all qualify, so today this
    /// tracks indian_ltcg; it is kept separate so an ineligible Indian
    /// asset class can be added without touching the tax engine.
    pub ltcg_112a_eligible: Decimal,
    pub quarterly: BTreeMap<Quarter, QuarterTotals>,
}

impl RegimeTotals {
    pub fn total_ltcg(&self) -> Decimal {
        self.foreign_ltcg + self.indian_ltcg
    }

    pub fn total_stcg(&self) -> Decimal {
        self.foreign_stcg + self.indian_stcg
    }
}

/// Accumulates classified records into regime totals while keeping the
/// records themselves for detailed reporting.
#[derive(Debug, Default)]
pub struct Aggregator {
    totals: RegimeTotals,
    records: Vec<GainRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, record: GainRecord) {
        let gain = record.gain_inr;
        match (record.asset_class.is_foreign(), record.is_long_term) {
            (true, true) => self.totals.foreign_ltcg += gain,
            (true, false) => self.totals.foreign_stcg += gain,
            (false, true) => {
                self.totals.indian_ltcg += gain;
                self.totals.ltcg_112a_eligible += gain;
            }
            (false, false) => self.totals.indian_stcg += gain,
        }

        let quarter = self.totals.quarterly.entry(Quarter::for_date(record.sale_date)).or_default();
        if record.is_long_term {
            quarter.ltcg += gain;
        } else {
            quarter.stcg += gain;
        }

        self.records.push(record);
    }

    pub fn totals(&self) -> &RegimeTotals {
        &self.totals
    }

    pub fn records(&self) -> &[GainRecord] {
        &self.records
    }

    pub fn into_parts(self) -> (RegimeTotals, Vec<GainRecord>) {
        (self.totals, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::AssetClass;
    use crate::transaction::Currency;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(
        sale_date: &str,
        asset_class: AssetClass,
        is_long_term: bool,
        gain_inr: Decimal,
    ) -> GainRecord {
        GainRecord {
            sale_date: date(sale_date),
            acquisition_date: date("2022-01-01"),
            symbol: "X".to_string(),
            asset_class,
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
            gain: gain_inr,
            gain_inr,
            holding_period_days: 0,
            is_long_term,
            source: None,
        }
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(Quarter::for_date(date("2024-04-01")), Quarter::UptoJun15);
        assert_eq!(Quarter::for_date(date("2024-06-15")), Quarter::UptoJun15);
        assert_eq!(Quarter::for_date(date("2024-06-16")), Quarter::Jun16Sep15);
        assert_eq!(Quarter::for_date(date("2024-09-15")), Quarter::Jun16Sep15);
        assert_eq!(Quarter::for_date(date("2024-09-16")), Quarter::Sep16Dec15);
        assert_eq!(Quarter::for_date(date("2024-12-15")), Quarter::Sep16Dec15);
        assert_eq!(Quarter::for_date(date("2024-12-16")), Quarter::Dec16Mar15);
        assert_eq!(Quarter::for_date(date("2025-01-20")), Quarter::Dec16Mar15);
        assert_eq!(Quarter::for_date(date("2025-03-15")), Quarter::Dec16Mar15);
        assert_eq!(Quarter::for_date(date("2025-03-16")), Quarter::Mar16Mar31);
        assert_eq!(Quarter::for_date(date("2025-03-31")), Quarter::Mar16Mar31);
    }

    #[test]
    fn routes_gains_to_the_right_bucket() {
        let mut agg = Aggregator::new();
        agg.accumulate(record("2024-05-01", AssetClass::ForeignEquity, true, dec!(400000)));
        agg.accumulate(record("2024-07-01", AssetClass::ForeignRsu, false, dec!(-10000)));
        agg.accumulate(record("2024-10-01", AssetClass::IndianStock, true, dec!(50000)));
        agg.accumulate(record("2025-01-01", AssetClass::IndianMutualFund, false, dec!(7500)));

        let totals = agg.totals();
        assert_eq!(totals.foreign_ltcg, dec!(400000));
        assert_eq!(totals.foreign_stcg, dec!(-10000));
        assert_eq!(totals.indian_ltcg, dec!(50000));
        assert_eq!(totals.indian_stcg, dec!(7500));
        assert_eq!(totals.ltcg_112a_eligible, dec!(50000));
        assert_eq!(totals.total_ltcg(), dec!(450000));
        assert_eq!(totals.total_stcg(), dec!(-2500));
    }

    #[test]
    fn quarterly_totals_track_sale_dates() {
        let mut agg = Aggregator::new();
        agg.accumulate(record("2024-05-01", AssetClass::ForeignEquity, true, dec!(1000)));
        agg.accumulate(record("2024-06-10", AssetClass::IndianStock, false, dec!(200)));
        agg.accumulate(record("2024-06-20", AssetClass::IndianStock, true, dec!(300)));

        let totals = agg.totals();
        let q1 = &totals.quarterly[&Quarter::UptoJun15];
        assert_eq!(q1.ltcg, dec!(1000));
        assert_eq!(q1.stcg, dec!(200));
        let q2 = &totals.quarterly[&Quarter::Jun16Sep15];
        assert_eq!(q2.ltcg, dec!(300));
        assert_eq!(q2.stcg, Decimal::ZERO);
        assert!(!totals.quarterly.contains_key(&Quarter::Mar16Mar31));
    }

    #[test]
    fn totals_are_order_independent() {
        let records = [
            record("2024-05-01", AssetClass::ForeignEquity, true, dec!(400000)),
            record("2024-07-01", AssetClass::ForeignRsu, false, dec!(-10000)),
            record("2024-10-01", AssetClass::IndianStock, true, dec!(50000)),
            record("2025-01-01", AssetClass::IndianMutualFund, false, dec!(7500)),
        ];

        let mut forward = Aggregator::new();
        for r in records.iter().cloned() {
            forward.accumulate(r);
        }
        let mut reverse = Aggregator::new();
        for r in records.iter().rev().cloned() {
            reverse.accumulate(r);
        }

        assert_eq!(forward.totals(), reverse.totals());
    }

    #[test]
    fn losses_net_within_a_bucket() {
        let mut agg = Aggregator::new();
        agg.accumulate(record("2024-05-01", AssetClass::IndianStock, false, dec!(10000)));
        agg.accumulate(record("2024-05-02", AssetClass::IndianStock, false, dec!(-4000)));
        assert_eq!(agg.totals().indian_stcg, dec!(6000));
    }
}
