//! Cash-drawer session calculations.
//!
//! Pure arithmetic for the cash-session lifecycle: pricing multi-denomination
//! lines against exchange rates, folding a session ledger into balance
//! summaries, the withdrawal sufficiency rule, and the closing discrepancy.

pub mod balance;
pub mod lines;

#[cfg(test)]
mod props;

pub use balance::{
    BalanceSummary, EntrySign, closing_difference, summarize, withdrawal_exceeds_available,
    withdrawal_tolerance,
};
pub use lines::{
    CashRuleError, LineInput, PricedLine, positive_lines, total_amount, validate_counted_input,
    validate_withdrawal_input,
};
