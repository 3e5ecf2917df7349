//! Audit manager: records a mid-session cash withdrawal against an open
//! session, enforcing sufficiency of the available balance.

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use caja_core::cash::{
    BalanceSummary, LineInput, positive_lines, total_amount, validate_withdrawal_input,
    withdrawal_exceeds_available,
};

use crate::entities::{cash_sessions, ledger_entries, sea_orm_active_enums::EntrySign};
use crate::repositories::{
    error::CashError,
    rates::price_lines,
    session::{CashSessionRepository, NewLedgerEntry},
};

/// Input for recording a withdrawal.
#[derive(Debug, Clone)]
pub struct AuditInput {
    /// Acting user.
    pub user_id: Uuid,
    /// Explicit session identifier; the user's active session when absent.
    pub session_id: Option<Uuid>,
    /// Free-text reason for the withdrawal.
    pub reason: String,
    /// Withdrawal lines; non-positive quantities are dropped.
    pub lines: Vec<LineInput>,
}

/// Result of a recorded withdrawal.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// Session header.
    pub session: cash_sessions::Model,
    /// The session's full ledger after the write.
    pub ledger: Vec<ledger_entries::Model>,
    /// Balance summary after the write.
    pub summary: BalanceSummary,
}

/// Audit manager over the session store.
#[derive(Debug, Clone)]
pub struct CashAuditRepository {
    db: DatabaseConnection,
}

impl CashAuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a withdrawal: one DEBIT ledger entry per positive line, with
    /// the reason attached to exactly the first entry written.
    ///
    /// The session is resolved under an exclusive row lock, so two
    /// concurrent withdrawals against the same drawer cannot both observe
    /// the same available balance and jointly overdraw it.
    ///
    /// # Errors
    ///
    /// - `Validation` before any persistence is touched for an empty reason
    ///   or no positive-quantity line
    /// - resolver errors per [`CashSessionRepository::resolve`]
    /// - `InsufficientBalance` when the requested total overdraws the
    ///   available balance beyond the tolerance
    pub async fn record(&self, input: AuditInput) -> Result<AuditOutcome, CashError> {
        validate_withdrawal_input(&input.reason, &input.lines)?;

        let txn = self.db.begin().await?;

        let session =
            CashSessionRepository::resolve(&txn, input.user_id, input.session_id, true).await?;

        let summary = CashSessionRepository::summarize(&txn, &session).await?;
        let available = summary.available_balance();

        let priced = price_lines(&txn, &positive_lines(&input.lines)).await?;
        let requested = total_amount(&priced);

        if withdrawal_exceeds_available(requested, available) {
            return Err(CashError::InsufficientBalance {
                expected: available,
                provided: requested,
            });
        }

        let entries: Vec<NewLedgerEntry> = priced
            .iter()
            .enumerate()
            .map(|(i, line)| NewLedgerEntry {
                reason: (i == 0).then(|| input.reason.clone()),
                sign: EntrySign::Debit,
                denomination: Some(line.denomination.clone()),
                rate: Some(line.rate),
                quantity: Some(line.quantity),
                amount: line.amount,
            })
            .collect();

        CashSessionRepository::insert_entries(&txn, session.id, entries).await?;

        txn.commit().await?;

        info!(
            session_id = %session.id,
            user_id = %input.user_id,
            requested = %requested,
            "Cash withdrawal recorded"
        );

        let ledger = CashSessionRepository::ledger(&self.db, session.id).await?;
        let summary = CashSessionRepository::summarize(&self.db, &session).await?;

        Ok(AuditOutcome {
            session,
            ledger,
            summary,
        })
    }

    /// Advisory available-balance breakdown for the resolved session. Takes
    /// no lock; display paths may observe slightly stale aggregates.
    ///
    /// # Errors
    ///
    /// Returns resolver errors or `Database` if a query fails.
    pub async fn available(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
    ) -> Result<(cash_sessions::Model, BalanceSummary), CashError> {
        let session = CashSessionRepository::resolve(&self.db, user_id, session_id, false).await?;
        let summary = CashSessionRepository::summarize(&self.db, &session).await?;
        Ok((session, summary))
    }

    /// Withdrawal history for the resolved session: the DEBIT side of the
    /// ledger in entry order.
    ///
    /// # Errors
    ///
    /// Returns resolver errors or `Database` if a query fails.
    pub async fn history(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
    ) -> Result<Vec<ledger_entries::Model>, CashError> {
        let session = CashSessionRepository::resolve(&self.db, user_id, session_id, false).await?;
        let ledger = CashSessionRepository::ledger(&self.db, session.id).await?;

        Ok(ledger
            .into_iter()
            .filter(|e| e.sign == EntrySign::Debit)
            .collect())
    }
}
