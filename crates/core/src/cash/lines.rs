//! Multi-denomination cash line validation and pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Violations of the cash input rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CashRuleError {
    /// The request carried no lines at all.
    #[error("at least one cash line is required")]
    NoLines,

    /// No line carried a positive quantity.
    #[error("at least one cash line must have a positive quantity")]
    NoPositiveLine,

    /// The free-text reason was missing or blank.
    #[error("a reason is required")]
    EmptyReason,
}

/// A raw cash line as submitted by a client: a denomination code and a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Denomination code (currency catalog key).
    pub denomination: String,
    /// Number of units of this denomination.
    pub quantity: Decimal,
}

/// A cash line priced against the exchange rate in force when it was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Denomination code.
    pub denomination: String,
    /// Exchange rate at time of entry.
    pub rate: Decimal,
    /// Number of units.
    pub quantity: Decimal,
    /// Computed amount in the base accounting currency.
    pub amount: Decimal,
}

impl PricedLine {
    /// Prices a line: `amount = rate × quantity`.
    #[must_use]
    pub fn price(denomination: String, rate: Decimal, quantity: Decimal) -> Self {
        Self {
            denomination,
            rate,
            quantity,
            amount: rate * quantity,
        }
    }
}

/// Filters lines down to those with a positive quantity.
#[must_use]
pub fn positive_lines(lines: &[LineInput]) -> Vec<LineInput> {
    lines
        .iter()
        .filter(|l| l.quantity > Decimal::ZERO)
        .cloned()
        .collect()
}

/// Sums the priced amounts of a set of lines.
#[must_use]
pub fn total_amount(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(|l| l.amount).sum()
}

/// Validates the input to a withdrawal request.
///
/// # Errors
///
/// Returns `CashRuleError::EmptyReason` for a blank reason and
/// `CashRuleError::NoPositiveLine` when no line has a positive quantity.
pub fn validate_withdrawal_input(reason: &str, lines: &[LineInput]) -> Result<(), CashRuleError> {
    if reason.trim().is_empty() {
        return Err(CashRuleError::EmptyReason);
    }
    if !lines.iter().any(|l| l.quantity > Decimal::ZERO) {
        return Err(CashRuleError::NoPositiveLine);
    }
    Ok(())
}

/// Validates the counted lines submitted with a closing.
///
/// # Errors
///
/// Returns `CashRuleError::NoLines` for an empty set and
/// `CashRuleError::NoPositiveLine` when no line has a positive quantity.
pub fn validate_counted_input(lines: &[LineInput]) -> Result<(), CashRuleError> {
    if lines.is_empty() {
        return Err(CashRuleError::NoLines);
    }
    if !lines.iter().any(|l| l.quantity > Decimal::ZERO) {
        return Err(CashRuleError::NoPositiveLine);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(denomination: &str, quantity: Decimal) -> LineInput {
        LineInput {
            denomination: denomination.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_price_line() {
        let priced = PricedLine::price("USD".to_string(), dec!(7300), dec!(10));
        assert_eq!(priced.amount, dec!(73000));
    }

    #[test]
    fn test_opening_example_totals() {
        // USD 10 @ 7300 plus local 50000 @ 1 = 123000
        let priced = vec![
            PricedLine::price("USD".to_string(), dec!(7300), dec!(10)),
            PricedLine::price("PYG".to_string(), dec!(1), dec!(50000)),
        ];
        assert_eq!(total_amount(&priced), dec!(123000));
    }

    #[test]
    fn test_positive_lines_filters_zero_and_negative() {
        let lines = vec![
            line("USD", dec!(10)),
            line("PYG", dec!(0)),
            line("EUR", dec!(-3)),
        ];
        let kept = positive_lines(&lines);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].denomination, "USD");
    }

    #[test]
    fn test_positive_lines_empty_set_is_allowed() {
        assert!(positive_lines(&[]).is_empty());
    }

    #[test]
    fn test_withdrawal_requires_reason() {
        let lines = vec![line("USD", dec!(1))];
        assert_eq!(
            validate_withdrawal_input("   ", &lines),
            Err(CashRuleError::EmptyReason)
        );
        assert!(validate_withdrawal_input("till shortage", &lines).is_ok());
    }

    #[test]
    fn test_withdrawal_requires_positive_line() {
        let lines = vec![line("USD", dec!(0))];
        assert_eq!(
            validate_withdrawal_input("reason", &lines),
            Err(CashRuleError::NoPositiveLine)
        );
    }

    #[test]
    fn test_counted_input_rules() {
        assert_eq!(validate_counted_input(&[]), Err(CashRuleError::NoLines));
        assert_eq!(
            validate_counted_input(&[line("USD", dec!(-1))]),
            Err(CashRuleError::NoPositiveLine)
        );
        assert!(validate_counted_input(&[line("USD", dec!(2))]).is_ok());
    }
}
