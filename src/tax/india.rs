use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Indian Fiscal Year (runs 1 April to 31 March)
/// The year value is the start year (e.g. 2024 = FY 2024-25)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        if date.month() >= 4 {
            FiscalYear(year)
        } else {
            FiscalYear(year - 1)
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 4, 1).unwrap()
    }

    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 + 1, 3, 31).unwrap()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// Display as "FY 2024-25" format
    pub fn display(&self) -> String {
        format!("FY {}-{:02}", self.0, (self.0 + 1) % 100)
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// One regime's rate as base rate plus surcharge and cess multipliers, so
/// the effective rate is base * (1 + surcharge) * (1 + cess).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeRate {
    pub base: Decimal,
    pub surcharge: Decimal,
    pub cess: Decimal,
}

impl RegimeRate {
    pub fn effective(&self) -> Decimal {
        self.base * (Decimal::ONE + self.surcharge) * (Decimal::ONE + self.cess)
    }
}

/// The rate card for a tax run.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRates {
    pub indian_ltcg: RegimeRate,
    pub foreign_ltcg: RegimeRate,
    pub indian_stcg: RegimeRate,
    pub foreign_stcg: RegimeRate,
    /// Section 112A exemption on eligible long-term gains.
    pub ltcg_exemption: Decimal,
}

impl TaxRates {
    /// Rates for FY 2024-25 onwards: 12.5% LTCG under Section 112A, 20%
    /// STCG under Section 111A, slab rate on foreign short-term gains,
    /// with the applicable surcharge and 4% cess on top.
    pub fn fy2025() -> Self {
        TaxRates {
            indian_ltcg: RegimeRate {
                base: dec!(0.125),
                surcharge: dec!(0.15),
                cess: dec!(0.04),
            },
            foreign_ltcg: RegimeRate {
                base: dec!(0.125),
                surcharge: dec!(0.15),
                cess: dec!(0.04),
            },
            indian_stcg: RegimeRate {
                base: dec!(0.20),
                surcharge: dec!(0.15),
                cess: dec!(0.04),
            },
            foreign_stcg: RegimeRate {
                base: dec!(0.30),
                surcharge: dec!(0.25),
                cess: dec!(0.04),
            },
            ltcg_exemption: dec!(125000),
        }
    }
}

impl Default for TaxRates {
    fn default() -> Self {
        TaxRates::fy2025()
    }
}
