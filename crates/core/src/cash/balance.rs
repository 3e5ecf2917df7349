//! Session balance summaries.
//!
//! A session's ledger is folded into a `BalanceSummary` holding the credit
//! and debit totals alongside the opening amount and any balance carried in
//! from a predecessor session. Two distinct figures are derived from it:
//!
//! - the **available balance**, which gates mid-session withdrawals and
//!   includes the carried-in prior balance;
//! - the **theoretical balance**, the expected drawer content at closing
//!   time, which runs against opening plus ledger movement alone.
//!
//! The two formulas are intentionally separate; do not unify them.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Polarity of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySign {
    /// Money added to the drawer.
    Credit,
    /// Money removed from the drawer.
    Debit,
}

/// Aggregated view of a session's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Sum of credit magnitudes.
    pub total_credits: Decimal,
    /// Sum of debit magnitudes.
    pub total_debits: Decimal,
    /// Opening amount derived from the float detail.
    pub opening_amount: Decimal,
    /// Balance carried in from a predecessor session.
    pub prior_balance: Decimal,
}

impl BalanceSummary {
    /// What may still be withdrawn mid-session.
    #[must_use]
    pub fn available_balance(&self) -> Decimal {
        self.opening_amount + self.prior_balance + self.total_credits - self.total_debits
    }

    /// Expected drawer content at closing time. Omits the prior balance.
    #[must_use]
    pub fn theoretical_balance(&self) -> Decimal {
        self.opening_amount + self.total_credits - self.total_debits
    }
}

/// Folds a ledger into a `BalanceSummary`.
///
/// Entry amounts are treated as non-negative magnitudes regardless of how a
/// writer signed them; polarity comes solely from the entry's sign.
pub fn summarize<I>(opening_amount: Decimal, prior_balance: Decimal, entries: I) -> BalanceSummary
where
    I: IntoIterator<Item = (EntrySign, Decimal)>,
{
    let mut total_credits = Decimal::ZERO;
    let mut total_debits = Decimal::ZERO;

    for (sign, amount) in entries {
        match sign {
            EntrySign::Credit => total_credits += amount.abs(),
            EntrySign::Debit => total_debits += amount.abs(),
        }
    }

    BalanceSummary {
        total_credits,
        total_debits,
        opening_amount,
        prior_balance,
    }
}

/// Slack allowed between a requested withdrawal and the available balance,
/// in minor units.
#[must_use]
pub fn withdrawal_tolerance() -> Decimal {
    Decimal::new(5, 1)
}

/// Whether a requested withdrawal overdraws the available balance beyond
/// the tolerance.
#[must_use]
pub fn withdrawal_exceeds_available(requested: Decimal, available: Decimal) -> bool {
    requested - available > withdrawal_tolerance()
}

/// Signed closing discrepancy: `counted − theoretical`, rounded to two
/// decimal places.
#[must_use]
pub fn closing_difference(counted_total: Decimal, theoretical_balance: Decimal) -> Decimal {
    (counted_total - theoretical_balance)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn summary(opening: Decimal, prior: Decimal, credits: Decimal, debits: Decimal) -> BalanceSummary {
        BalanceSummary {
            total_credits: credits,
            total_debits: debits,
            opening_amount: opening,
            prior_balance: prior,
        }
    }

    #[test]
    fn test_summarize_partitions_by_sign() {
        let entries = vec![
            (EntrySign::Credit, dec!(1000)),
            (EntrySign::Debit, dec!(300)),
            (EntrySign::Debit, dec!(200)),
        ];
        let s = summarize(dec!(5000), Decimal::ZERO, entries);
        assert_eq!(s.total_credits, dec!(1000));
        assert_eq!(s.total_debits, dec!(500));
    }

    #[test]
    fn test_summarize_normalizes_magnitudes() {
        // Some writers recorded debits as negative amounts; totals must not
        // cancel out.
        let entries = vec![
            (EntrySign::Debit, dec!(-300)),
            (EntrySign::Debit, dec!(300)),
            (EntrySign::Credit, dec!(-50)),
        ];
        let s = summarize(Decimal::ZERO, Decimal::ZERO, entries);
        assert_eq!(s.total_debits, dec!(600));
        assert_eq!(s.total_credits, dec!(50));
    }

    #[test]
    fn test_available_includes_prior_balance() {
        let s = summary(dec!(100_000), dec!(2000), dec!(500), dec!(30_000));
        assert_eq!(s.available_balance(), dec!(72_500));
    }

    #[test]
    fn test_theoretical_omits_prior_balance() {
        let s = summary(dec!(100_000), dec!(2000), dec!(500), dec!(30_000));
        assert_eq!(s.theoretical_balance(), dec!(70_500));
    }

    #[test]
    fn test_withdrawal_example() {
        // Opened with 100,000; withdrew 30,000; a further 80,000 must fail.
        let s = summary(dec!(100_000), Decimal::ZERO, Decimal::ZERO, dec!(30_000));
        assert_eq!(s.available_balance(), dec!(70_000));
        assert!(withdrawal_exceeds_available(dec!(80_000), s.available_balance()));
        assert!(!withdrawal_exceeds_available(dec!(70_000), s.available_balance()));
    }

    #[test]
    fn test_withdrawal_tolerance_boundary() {
        assert!(!withdrawal_exceeds_available(dec!(100.5), dec!(100)));
        assert!(withdrawal_exceeds_available(dec!(100.51), dec!(100)));
    }

    #[test]
    fn test_closing_difference_example() {
        // Counted 94,500 against a theoretical 95,000 records -500.
        assert_eq!(closing_difference(dec!(94_500), dec!(95_000)), dec!(-500));
    }

    #[test]
    fn test_closing_difference_rounds_to_two_places() {
        assert_eq!(closing_difference(dec!(10.005), dec!(0)), dec!(10.01));
        assert_eq!(closing_difference(dec!(0), dec!(10.005)), dec!(-10.01));
    }
}
