//! Error union for the cash-session repositories.

use rust_decimal::Decimal;
use sea_orm::DbErr;
use uuid::Uuid;

use caja_core::cash::CashRuleError;

/// Error types for cash-session operations.
///
/// Callers match on the variant to pick a transport status; nothing in this
/// crate maps errors to HTTP.
#[derive(Debug, thiserror::Error)]
pub enum CashError {
    /// Missing or invalid input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The user has no active cash session.
    #[error("no active cash session for user {0}")]
    SessionRequired(Uuid),

    /// The session identifier does not resolve.
    #[error("cash session not found: {0}")]
    SessionNotFound(Uuid),

    /// The session belongs to another user.
    #[error("cash session {0} belongs to another user")]
    OwnershipMismatch(Uuid),

    /// The session is not in the ACTIVE state.
    #[error("cash session {0} is not active")]
    SessionInactive(Uuid),

    /// A denomination code is missing from the currency catalog.
    #[error("unknown denomination: {0}")]
    UnknownDenomination(String),

    /// The requested withdrawal overdraws the available balance.
    #[error("insufficient balance: available {expected}, requested {provided}")]
    InsufficientBalance {
        /// The available balance at the time of the request.
        expected: Decimal,
        /// The total the request asked for.
        provided: Decimal,
    },

    /// The session already has a closing record.
    #[error("cash session {0} is already closed")]
    AlreadyClosed(Uuid),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CashRuleError> for CashError {
    fn from(err: CashRuleError) -> Self {
        Self::Validation(err.to_string())
    }
}
