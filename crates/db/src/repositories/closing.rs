//! Closing manager: finalizes a session by comparing counted cash against
//! the theoretical balance and recording the signed discrepancy.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use caja_core::cash::{
    BalanceSummary, LineInput, closing_difference, positive_lines, total_amount,
    validate_counted_input,
};

use crate::entities::{cash_sessions, closing_lines, closing_records};
use crate::repositories::{error::CashError, rates::price_lines, session::CashSessionRepository};

/// Input for closing a session.
#[derive(Debug, Clone)]
pub struct CloseInput {
    /// Acting user.
    pub user_id: Uuid,
    /// Explicit session identifier; the user's active session when absent.
    pub session_id: Option<Uuid>,
    /// Counted cash lines.
    pub lines: Vec<LineInput>,
}

/// Filters for the closing history listing.
#[derive(Debug, Clone, Default)]
pub struct ClosingFilter {
    /// Restrict to the caller's own sessions.
    pub mine: bool,
    /// Restrict to one session.
    pub session_id: Option<Uuid>,
}

/// A closing record hydrated with detail and the component totals used to
/// derive it.
#[derive(Debug, Clone)]
pub struct ClosingOutcome {
    /// Closing header.
    pub record: closing_records::Model,
    /// Counted-cash detail rows.
    pub lines: Vec<closing_lines::Model>,
    /// Component totals (credits, debits, opening amount, prior balance).
    pub summary: BalanceSummary,
}

/// Closing manager over the session store.
#[derive(Debug, Clone)]
pub struct CashClosingRepository {
    db: DatabaseConnection,
}

impl CashClosingRepository {
    /// Creates a new closing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Closes a session exactly once.
    ///
    /// Resolves the session under an exclusive row lock, derives the
    /// theoretical balance and the counted total, writes the header, then
    /// clears and rewrites the detail, and finally transitions the session
    /// out of ACTIVE. The whole operation commits or rolls back as one.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or all-zero counted set
    /// - resolver errors per [`CashSessionRepository::resolve`]
    /// - `AlreadyClosed` when the session already has a closing record; the
    ///   existing record is left untouched
    pub async fn close(&self, input: CloseInput) -> Result<ClosingOutcome, CashError> {
        validate_counted_input(&input.lines)?;

        let txn = self.db.begin().await?;

        // A session that already carries a closing record reports
        // AlreadyClosed, not SessionInactive, so the caller can tell a
        // finished close from a drawer closed some other way.
        let session =
            match CashSessionRepository::resolve(&txn, input.user_id, input.session_id, true).await
            {
                Ok(session) => session,
                Err(CashError::SessionInactive(id)) => {
                    if find_for_session(&txn, id).await?.is_some() {
                        return Err(CashError::AlreadyClosed(id));
                    }
                    return Err(CashError::SessionInactive(id));
                }
                Err(e) => return Err(e),
            };

        // Checked while holding the session lock; the UNIQUE constraint on
        // closing_records.session_id backstops it.
        if find_for_session(&txn, session.id).await?.is_some() {
            return Err(CashError::AlreadyClosed(session.id));
        }

        let summary = CashSessionRepository::summarize(&txn, &session).await?;
        let theoretical = summary.theoretical_balance();

        let priced = price_lines(&txn, &positive_lines(&input.lines)).await?;
        let counted_total = total_amount(&priced);
        let difference = closing_difference(counted_total, theoretical);

        let now = chrono::Utc::now().into();
        let record = closing_records::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session.id),
            closed_at: Set(now),
            counted_total: Set(counted_total),
            difference: Set(difference),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        // Idempotent re-derivation of the detail from the validated input.
        closing_lines::Entity::delete_many()
            .filter(closing_lines::Column::SessionId.eq(session.id))
            .exec(&txn)
            .await?;

        let mut lines = Vec::with_capacity(priced.len());
        for line in &priced {
            let row = closing_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                session_id: Set(session.id),
                denomination: Set(line.denomination.clone()),
                rate: Set(line.rate),
                quantity: Set(line.quantity),
                amount: Set(line.amount),
            };
            lines.push(row.insert(&txn).await?);
        }

        CashSessionRepository::mark_closed(&txn, session.id).await?;

        txn.commit().await?;

        info!(
            session_id = %session.id,
            user_id = %input.user_id,
            counted_total = %counted_total,
            difference = %difference,
            "Cash session closed"
        );

        Ok(ClosingOutcome {
            record,
            lines,
            summary,
        })
    }

    /// Advisory theoretical-balance breakdown for the resolved session.
    /// Takes no lock.
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

    /// Closing history, newest first, honoring the filters.
    ///
    /// # Errors
    ///
    /// Returns `Database` if a query fails.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: ClosingFilter,
    ) -> Result<Vec<(closing_records::Model, Vec<closing_lines::Model>)>, CashError> {
        let mut query = closing_records::Entity::find();

        if let Some(session_id) = filter.session_id {
            query = query.filter(closing_records::Column::SessionId.eq(session_id));
        }

        if filter.mine {
            let own: Vec<Uuid> = CashSessionRepository::new(self.db.clone())
                .list_for_user(user_id)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();
            query = query.filter(closing_records::Column::SessionId.is_in(own));
        }

        let records = query
            .order_by_desc(closing_records::Column::ClosedAt)
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let lines = closing_lines::Entity::find()
                .filter(closing_lines::Column::SessionId.eq(record.session_id))
                .all(&self.db)
                .await?;
            out.push((record, lines));
        }

        Ok(out)
    }
}

/// Finds the closing record for a session, if one exists.
async fn find_for_session<C: ConnectionTrait>(
    conn: &C,
    session_id: Uuid,
) -> Result<Option<closing_records::Model>, sea_orm::DbErr> {
    closing_records::Entity::find()
        .filter(closing_records::Column::SessionId.eq(session_id))
        .one(conn)
        .await
}
