//! Tax computation: Section 112A exemption, loss set-off, per-regime tax.

use super::india::{RegimeRate, TaxRates};
use crate::aggregate::RegimeTotals;
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("negative taxes paid: {0}")]
    NegativeTaxesPaid(Decimal),
}

/// Loss amounts absorbed at each step of the set-off, in application order.
/// Short-term losses go against the highest-taxed gains first: foreign
/// short-term, then Indian short-term, then long-term. Long-term losses can
/// only go against long-term gains.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetOff {
    pub stcg_loss_against_foreign_stcg: Decimal,
    pub stcg_loss_against_indian_stcg: Decimal,
    pub stcg_loss_against_ltcg: Decimal,
    pub ltcg_loss_against_ltcg: Decimal,
}

impl SetOff {
    pub fn total(&self) -> Decimal {
        self.stcg_loss_against_foreign_stcg
            + self.stcg_loss_against_indian_stcg
            + self.stcg_loss_against_ltcg
            + self.ltcg_loss_against_ltcg
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxResult {
    pub rates: TaxRates,
    pub gross: RegimeTotals,
    pub set_off: SetOff,
    /// Losses no gain could absorb; eligible for carry-forward, not taxed.
    pub unabsorbed_stcg_loss: Decimal,
    pub unabsorbed_ltcg_loss: Decimal,
    pub net_foreign_stcg: Decimal,
    pub net_indian_stcg: Decimal,
    pub net_foreign_ltcg: Decimal,
    /// Indian long-term gain after the 112A exemption and set-off.
    pub net_indian_ltcg: Decimal,
    pub exemption_used: Decimal,
    pub tax_foreign_stcg: Decimal,
    pub tax_indian_stcg: Decimal,
    pub tax_foreign_ltcg: Decimal,
    pub tax_indian_ltcg: Decimal,
    pub taxes_paid: Decimal,
}

impl TaxResult {
    pub fn net_stcg(&self) -> Decimal {
        self.net_foreign_stcg + self.net_indian_stcg
    }

    pub fn net_ltcg(&self) -> Decimal {
        self.net_foreign_ltcg + self.net_indian_ltcg
    }

    pub fn total_tax(&self) -> Decimal {
        self.tax_foreign_stcg + self.tax_indian_stcg + self.tax_foreign_ltcg + self.tax_indian_ltcg
    }

    /// Remaining liability after credits. Negative means a refund is due.
    pub fn net_payable(&self) -> Decimal {
        self.total_tax() - self.taxes_paid
    }

    fn taxable_by_regime(&self) -> [(Decimal, RegimeRate); 4] {
        [
            (self.net_foreign_stcg, self.rates.foreign_stcg),
            (self.net_indian_stcg, self.rates.indian_stcg),
            (self.net_foreign_ltcg, self.rates.foreign_ltcg),
            (self.net_indian_ltcg, self.rates.indian_ltcg),
        ]
    }

    /// Surcharge portion of the total liability.
    pub fn total_surcharge(&self) -> Decimal {
        self.taxable_by_regime()
            .iter()
            .map(|(taxable, rate)| taxable * rate.base * rate.surcharge)
            .sum::<Decimal>()
            .round_dp(2)
    }

    /// Cess portion of the total liability, levied on tax plus surcharge.
    pub fn total_cess(&self) -> Decimal {
        self.taxable_by_regime()
            .iter()
            .map(|(taxable, rate)| {
                taxable * rate.base * (Decimal::ONE + rate.surcharge) * rate.cess
            })
            .sum::<Decimal>()
            .round_dp(2)
    }
}

pub fn compute_tax(
    totals: &RegimeTotals,
    taxes_paid: Decimal,
    rates: &TaxRates,
) -> Result<TaxResult, TaxError> {
    if taxes_paid < Decimal::ZERO {
        return Err(TaxError::NegativeTaxesPaid(taxes_paid));
    }

    let foreign_stcg_gain = totals.foreign_stcg.max(Decimal::ZERO);
    let indian_stcg_gain = totals.indian_stcg.max(Decimal::ZERO);
    let foreign_ltcg_gain = totals.foreign_ltcg.max(Decimal::ZERO);
    let indian_ltcg_gain = totals.indian_ltcg.max(Decimal::ZERO);

    // The 112A exemption comes off the eligible Indian long-term gain
    // before any loss set-off; losses then only see the remainder.
    let eligible = totals
        .ltcg_112a_eligible
        .max(Decimal::ZERO)
        .min(indian_ltcg_gain);
    let exemption_used = rates.ltcg_exemption.min(eligible);
    let indian_ltcg_gain = indian_ltcg_gain - exemption_used;

    let stcg_loss = (-totals.foreign_stcg).max(Decimal::ZERO)
        + (-totals.indian_stcg).max(Decimal::ZERO);
    let ltcg_loss = (-totals.foreign_ltcg).max(Decimal::ZERO)
        + (-totals.indian_ltcg).max(Decimal::ZERO);

    let mut set_off = SetOff::default();

    set_off.stcg_loss_against_foreign_stcg = stcg_loss.min(foreign_stcg_gain);
    let mut stcg_loss_left = stcg_loss - set_off.stcg_loss_against_foreign_stcg;

    set_off.stcg_loss_against_indian_stcg = stcg_loss_left.min(indian_stcg_gain);
    stcg_loss_left -= set_off.stcg_loss_against_indian_stcg;

    let ltcg_gain = foreign_ltcg_gain + indian_ltcg_gain;
    set_off.stcg_loss_against_ltcg = stcg_loss_left.min(ltcg_gain);
    stcg_loss_left -= set_off.stcg_loss_against_ltcg;

    let ltcg_after_stcg_loss = ltcg_gain - set_off.stcg_loss_against_ltcg;
    set_off.ltcg_loss_against_ltcg = ltcg_loss.min(ltcg_after_stcg_loss);
    let ltcg_loss_left = ltcg_loss - set_off.ltcg_loss_against_ltcg;

    let net_ltcg = ltcg_after_stcg_loss - set_off.ltcg_loss_against_ltcg;

    let net_foreign_stcg = foreign_stcg_gain - set_off.stcg_loss_against_foreign_stcg;
    let net_indian_stcg = indian_stcg_gain - set_off.stcg_loss_against_indian_stcg;

    // Set-off applies to the long-term total; apportion what survives back
    // to the regimes by their share of the post-exemption long-term gains.
    let (net_foreign_ltcg, net_indian_ltcg) = if ltcg_gain.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let foreign = (net_ltcg * foreign_ltcg_gain / ltcg_gain).round_dp(2);
        (foreign, net_ltcg - foreign)
    };

    Ok(TaxResult {
        rates: rates.clone(),
        gross: totals.clone(),
        set_off,
        unabsorbed_stcg_loss: stcg_loss_left,
        unabsorbed_ltcg_loss: ltcg_loss_left,
        net_foreign_stcg,
        net_indian_stcg,
        net_foreign_ltcg,
        net_indian_ltcg,
        exemption_used,
        tax_foreign_stcg: (net_foreign_stcg * rates.foreign_stcg.effective()).round_dp(2),
        tax_indian_stcg: (net_indian_stcg * rates.indian_stcg.effective()).round_dp(2),
        tax_foreign_ltcg: (net_foreign_ltcg * rates.foreign_ltcg.effective()).round_dp(2),
        tax_indian_ltcg: (net_indian_ltcg * rates.indian_ltcg.effective()).round_dp(2),
        taxes_paid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn totals(
        foreign_ltcg: Decimal,
        foreign_stcg: Decimal,
        indian_ltcg: Decimal,
        indian_stcg: Decimal,
    ) -> RegimeTotals {
        RegimeTotals {
            foreign_ltcg,
            foreign_stcg,
            indian_ltcg,
            indian_stcg,
            ltcg_112a_eligible: indian_ltcg,
            quarterly: Default::default(),
        }
    }

    fn no_exemption() -> TaxRates {
        TaxRates {
            ltcg_exemption: Decimal::ZERO,
            ..TaxRates::fy2025()
        }
    }

    #[test]
    fn all_gains_no_losses() {
        let totals = totals(dec!(400000), dec!(10000), dec!(200000), dec!(50000));
        let result = compute_tax(&totals, Decimal::ZERO, &TaxRates::fy2025()).unwrap();

        assert_eq!(result.set_off, SetOff::default());
        assert_eq!(result.net_foreign_ltcg, dec!(400000));
        assert_eq!(result.net_indian_ltcg, dec!(75000));
        assert_eq!(result.exemption_used, dec!(125000));
        // foreign LTCG 400,000 * 0.1495
        assert_eq!(result.tax_foreign_ltcg, dec!(59800.00));
        // indian LTCG (200,000 - 125,000) * 0.1495
        assert_eq!(result.tax_indian_ltcg, dec!(11212.50));
        // foreign STCG 10,000 * 0.39
        assert_eq!(result.tax_foreign_stcg, dec!(3900.00));
        // indian STCG 50,000 * 0.2392
        assert_eq!(result.tax_indian_stcg, dec!(11960.00));
        assert_eq!(result.total_tax(), dec!(86872.50));
    }

    #[test]
    fn surcharge_and_cess_breakdown_sums_to_total() {
        let totals = totals(dec!(400000), dec!(10000), dec!(200000), dec!(50000));
        let result = compute_tax(&totals, Decimal::ZERO, &TaxRates::fy2025()).unwrap();

        assert_eq!(result.total_surcharge(), dec!(11156.25));
        assert_eq!(result.total_cess(), dec!(3341.25));
        // base tax across the four regimes is 72,375.00
        assert_eq!(
            dec!(72375.00) + result.total_surcharge() + result.total_cess(),
            result.total_tax()
        );
    }

    #[test]
    fn stcg_loss_offsets_ltcg_gain() {
        // Foreign short-term loss of 10,000 against an Indian long-term
        // gain of 50,000: taxable STCG 0, taxable LTCG 40,000.
        let totals = totals(Decimal::ZERO, dec!(-10000), dec!(50000), Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &no_exemption()).unwrap();

        assert_eq!(result.net_stcg(), Decimal::ZERO);
        assert_eq!(result.net_ltcg(), dec!(40000));
        assert_eq!(result.set_off.stcg_loss_against_ltcg, dec!(10000));
        assert_eq!(result.tax_indian_ltcg, dec!(5980.00));
    }

    #[test]
    fn stcg_loss_hits_foreign_gain_before_indian() {
        // Indian short-term loss of 15,000 against a foreign short-term
        // gain of 10,000. Foreign absorbs first since it is taxed at 39%;
        // the 5,000 left falls through to the long-term gain.
        let totals = totals(dec!(40000), dec!(10000), Decimal::ZERO, dec!(-15000));
        let result = compute_tax(&totals, Decimal::ZERO, &no_exemption()).unwrap();

        assert_eq!(result.set_off.stcg_loss_against_foreign_stcg, dec!(10000));
        assert_eq!(result.set_off.stcg_loss_against_indian_stcg, Decimal::ZERO);
        assert_eq!(result.set_off.stcg_loss_against_ltcg, dec!(5000));
        assert_eq!(result.net_foreign_stcg, Decimal::ZERO);
        assert_eq!(result.net_ltcg(), dec!(35000));
    }

    #[test]
    fn stcg_loss_falls_through_to_indian_stcg_gain() {
        // Foreign short-term loss of 15,000, Indian short-term gain of
        // 20,000, no foreign gain to absorb first.
        let totals = totals(Decimal::ZERO, dec!(-15000), Decimal::ZERO, dec!(20000));
        let result = compute_tax(&totals, Decimal::ZERO, &no_exemption()).unwrap();

        assert_eq!(result.set_off.stcg_loss_against_foreign_stcg, Decimal::ZERO);
        assert_eq!(result.set_off.stcg_loss_against_indian_stcg, dec!(15000));
        assert_eq!(result.net_indian_stcg, dec!(5000));
    }

    #[test]
    fn ltcg_loss_cannot_offset_stcg_gain() {
        let totals = totals(dec!(-30000), Decimal::ZERO, Decimal::ZERO, dec!(50000));
        let result = compute_tax(&totals, Decimal::ZERO, &no_exemption()).unwrap();

        assert_eq!(result.net_indian_stcg, dec!(50000));
        assert_eq!(result.set_off.ltcg_loss_against_ltcg, Decimal::ZERO);
        assert_eq!(result.unabsorbed_ltcg_loss, dec!(30000));
    }

    #[test]
    fn ltcg_loss_offsets_ltcg_gain() {
        let totals = totals(dec!(-30000), Decimal::ZERO, dec!(100000), Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &no_exemption()).unwrap();

        assert_eq!(result.set_off.ltcg_loss_against_ltcg, dec!(30000));
        assert_eq!(result.net_ltcg(), dec!(70000));
        assert_eq!(result.net_indian_ltcg, dec!(70000));
        assert_eq!(result.net_foreign_ltcg, Decimal::ZERO);
    }

    #[test]
    fn surviving_ltcg_splits_proportionally() {
        // 300,000 foreign + 100,000 Indian LTCG, 40,000 STCG loss. The
        // 360,000 that survives splits 3:1.
        let totals = totals(dec!(300000), dec!(-40000), dec!(100000), Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &no_exemption()).unwrap();

        assert_eq!(result.net_ltcg(), dec!(360000));
        assert_eq!(result.net_foreign_ltcg, dec!(270000.00));
        assert_eq!(result.net_indian_ltcg, dec!(90000.00));
    }

    #[test]
    fn exemption_comes_off_before_losses_are_set_off() {
        // Indian LTCG 100,000 is fully exempt, so the 150,000 short-term
        // loss only finds the foreign 100,000 to absorb and 50,000 is
        // left to carry forward. Nothing is taxable.
        let totals = totals(dec!(100000), dec!(-150000), dec!(100000), Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &TaxRates::fy2025()).unwrap();

        assert_eq!(result.exemption_used, dec!(100000));
        assert_eq!(result.set_off.stcg_loss_against_ltcg, dec!(100000));
        assert_eq!(result.unabsorbed_stcg_loss, dec!(50000));
        assert_eq!(result.net_ltcg(), Decimal::ZERO);
        assert_eq!(result.total_tax(), Decimal::ZERO);
    }

    #[test]
    fn exemption_limited_to_eligible_gains() {
        let mut totals = totals(Decimal::ZERO, Decimal::ZERO, dec!(200000), Decimal::ZERO);
        totals.ltcg_112a_eligible = dec!(50000);
        let result = compute_tax(&totals, Decimal::ZERO, &TaxRates::fy2025()).unwrap();

        assert_eq!(result.exemption_used, dec!(50000));
        assert_eq!(result.net_indian_ltcg, dec!(150000));
        // 150,000 * 0.1495
        assert_eq!(result.tax_indian_ltcg, dec!(22425.00));
    }

    #[test]
    fn exemption_capped_at_indian_ltcg() {
        let totals = totals(Decimal::ZERO, Decimal::ZERO, dec!(80000), Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &TaxRates::fy2025()).unwrap();

        assert_eq!(result.exemption_used, dec!(80000));
        assert_eq!(result.tax_indian_ltcg, Decimal::ZERO);
    }

    #[test]
    fn exemption_not_applied_to_foreign_ltcg() {
        let totals = totals(dec!(100000), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &TaxRates::fy2025()).unwrap();

        assert_eq!(result.exemption_used, Decimal::ZERO);
        assert_eq!(result.tax_foreign_ltcg, dec!(14950.00));
    }

    #[test]
    fn losses_exceeding_gains_carry_forward() {
        let totals = totals(Decimal::ZERO, dec!(-50000), dec!(20000), Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &no_exemption()).unwrap();

        assert_eq!(result.set_off.stcg_loss_against_ltcg, dec!(20000));
        assert_eq!(result.unabsorbed_stcg_loss, dec!(30000));
        assert_eq!(result.total_tax(), Decimal::ZERO);
    }

    #[test]
    fn taxes_paid_reduces_net_payable() {
        let totals = totals(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, dec!(100000));
        let result = compute_tax(&totals, dec!(30000), &TaxRates::fy2025()).unwrap();

        assert_eq!(result.total_tax(), dec!(23920.00));
        assert_eq!(result.net_payable(), dec!(-6080.00));
    }

    #[test]
    fn negative_taxes_paid_rejected() {
        let totals = totals(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let err = compute_tax(&totals, dec!(-1), &TaxRates::fy2025()).unwrap_err();
        assert_eq!(err, TaxError::NegativeTaxesPaid(dec!(-1)));
    }

    #[test]
    fn no_gains_no_tax() {
        let totals = totals(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let result = compute_tax(&totals, Decimal::ZERO, &TaxRates::fy2025()).unwrap();
        assert_eq!(result.total_tax(), Decimal::ZERO);
        assert_eq!(result.net_payable(), Decimal::ZERO);
    }
}
