//! Order integration guard.
//!
//! Consumed by the sales-order workflow: an order may only be created while
//! its author has an open cash session, and an advance payment on the order
//! posts a credit into that session's ledger.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QuerySelect, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::entities::{cash_sessions, ledger_entries, sea_orm_active_enums::EntrySign};
use crate::repositories::{
    error::CashError,
    session::{CashSessionRepository, NewLedgerEntry},
};

/// Guard over the session store for the order workflow.
#[derive(Debug, Clone)]
pub struct OrderSessionGuard {
    db: DatabaseConnection,
}

impl OrderSessionGuard {
    /// Creates a new order session guard.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Requires an active session for the acting user and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `SessionRequired` when the user has no active session.
    pub async fn require_active_session(&self, user_id: Uuid) -> Result<Uuid, CashError> {
        CashSessionRepository::find_active_for_user(&self.db, user_id)
            .await?
            .map(|s| s.id)
            .ok_or(CashError::SessionRequired(user_id))
    }

    /// Posts an advance payment into a session's ledger as a single CREDIT
    /// entry. Credits increase the available balance, matching the balance
    /// calculator's polarity.
    ///
    /// # Errors
    ///
    /// - `Validation` for a non-positive amount
    /// - `SessionNotFound` / `SessionInactive` when the target session is
    ///   gone or no longer open
    pub async fn post_advance(
        &self,
        session_id: Uuid,
        amount: Decimal,
        note: &str,
    ) -> Result<ledger_entries::Model, CashError> {
        if amount <= Decimal::ZERO {
            return Err(CashError::Validation(format!(
                "advance amount must be positive, got {amount}"
            )));
        }

        let txn = self.db.begin().await?;

        let session = cash_sessions::Entity::find_by_id(session_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CashError::SessionNotFound(session_id))?;

        if !session.is_active() {
            return Err(CashError::SessionInactive(session_id));
        }

        let written = CashSessionRepository::insert_entries(
            &txn,
            session.id,
            vec![NewLedgerEntry {
                reason: Some(note.to_string()),
                sign: EntrySign::Credit,
                denomination: None,
                rate: None,
                quantity: None,
                amount,
            }],
        )
        .await?;

        txn.commit().await?;

        info!(
            session_id = %session_id,
            amount = %amount,
            "Order advance posted to cash session"
        );

        let entry = written
            .into_iter()
            .next()
            .ok_or_else(|| CashError::Validation("advance entry was not written".to_string()))?;

        Ok(entry)
    }
}
