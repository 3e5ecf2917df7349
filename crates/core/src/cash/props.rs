//! Property-based tests for cash-session calculations.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{EntrySign, closing_difference, summarize, withdrawal_exceeds_available};
use super::lines::{LineInput, PricedLine, positive_lines, total_amount};

/// Strategy for quantities between 0.01 and 1,000,000.00.
fn positive_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for exchange rates between 0.0001 and 10,000.0000.
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy for ledger entries with arbitrary writer-applied signs.
fn ledger_entries() -> impl Strategy<Value = Vec<(EntrySign, Decimal)>> {
    prop::collection::vec(
        (
            prop_oneof![Just(EntrySign::Credit), Just(EntrySign::Debit)],
            (-100_000_000i64..100_000_000i64).prop_map(|c| Decimal::new(c, 2)),
        ),
        0..32,
    )
}

/// Strategy for a batch of rate/quantity pairs.
fn rated_lines() -> impl Strategy<Value = Vec<(Decimal, Decimal)>> {
    prop::collection::vec((positive_rate(), positive_quantity()), 1..16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Pricing is exact: the total over priced lines equals the sum of
    /// `rate × quantity` with no drift.
    #[test]
    fn prop_priced_total_is_exact(pairs in rated_lines()) {
        let priced: Vec<PricedLine> = pairs
            .iter()
            .map(|(rate, qty)| PricedLine::price("X".to_string(), *rate, *qty))
            .collect();

        let expected: Decimal = pairs.iter().map(|(rate, qty)| *rate * *qty).sum();
        prop_assert_eq!(total_amount(&priced), expected);
    }

    /// Ledger totals are non-negative magnitudes regardless of how writers
    /// signed the amounts.
    #[test]
    fn prop_summary_totals_are_magnitudes(entries in ledger_entries()) {
        let s = summarize(Decimal::ZERO, Decimal::ZERO, entries);
        prop_assert!(s.total_credits >= Decimal::ZERO);
        prop_assert!(s.total_debits >= Decimal::ZERO);
    }

    /// The two balance figures differ by exactly the prior balance.
    #[test]
    fn prop_available_minus_theoretical_is_prior(
        opening in positive_quantity(),
        prior in positive_quantity(),
        entries in ledger_entries(),
    ) {
        let s = summarize(opening, prior, entries);
        prop_assert_eq!(
            s.available_balance() - s.theoretical_balance(),
            s.prior_balance
        );
    }

    /// A withdrawal exceeding the available balance by more than the
    /// tolerance is always rejected; one within the balance never is.
    #[test]
    fn prop_overdraw_always_rejected(
        available in positive_quantity(),
        excess in (51i64..100_000_000i64).prop_map(|c| Decimal::new(c, 2)),
    ) {
        prop_assert!(withdrawal_exceeds_available(available + excess, available));
        prop_assert!(!withdrawal_exceeds_available(available, available));
    }

    /// The closing difference is antisymmetric and lands on two decimals.
    #[test]
    fn prop_closing_difference_antisymmetric(
        counted in positive_quantity(),
        theoretical in positive_quantity(),
    ) {
        let diff = closing_difference(counted, theoretical);
        prop_assert_eq!(diff, -closing_difference(theoretical, counted));

        let scaled = diff * Decimal::from(100);
        prop_assert_eq!(scaled.round(), scaled);
    }

    /// Filtering keeps exactly the positive-quantity lines, in order.
    #[test]
    fn prop_positive_filter_keeps_positive(
        quantities in prop::collection::vec(-1_000_000i64..1_000_000i64, 0..16),
    ) {
        let lines: Vec<LineInput> = quantities
            .iter()
            .map(|q| LineInput { denomination: "X".to_string(), quantity: Decimal::new(*q, 2) })
            .collect();

        let kept = positive_lines(&lines);
        let expected = quantities.iter().filter(|q| **q > 0).count();
        prop_assert_eq!(kept.len(), expected);
        prop_assert!(kept.iter().all(|l| l.quantity > Decimal::ZERO));
    }
}
