//! Opening manager: creates a new session from a multi-denomination float.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use caja_core::cash::{BalanceSummary, LineInput, PricedLine, positive_lines, total_amount};

use crate::entities::{
    cash_registers,
    cash_sessions::{self, STATE_ACTIVE},
    session_float_lines,
};
use crate::repositories::{error::CashError, rates::price_lines, session::CashSessionRepository};

/// Input for opening a session.
#[derive(Debug, Clone)]
pub struct OpenSessionInput {
    /// Owning user.
    pub user_id: Uuid,
    /// Drawer being opened.
    pub cash_register_id: Uuid,
    /// Balance carried in from a predecessor session, if any.
    pub prior_balance: Option<Decimal>,
    /// Float lines; non-positive quantities are dropped.
    pub lines: Vec<LineInput>,
}

/// A session hydrated with its float detail and balances.
#[derive(Debug, Clone)]
pub struct OpenedSession {
    /// Session header.
    pub session: cash_sessions::Model,
    /// Float detail rows.
    pub float_lines: Vec<session_float_lines::Model>,
    /// Balance summary; zero ledger totals right after opening.
    pub summary: BalanceSummary,
}

/// Opening manager over the session store.
#[derive(Debug, Clone)]
pub struct CashOpeningRepository {
    db: DatabaseConnection,
}

impl CashOpeningRepository {
    /// Creates a new opening repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a session: prices the float, writes the header and detail as
    /// one atomic unit, and returns the hydrated session.
    ///
    /// # Errors
    ///
    /// - `Validation` for an unknown register or a user that already has an
    ///   active session
    /// - `UnknownDenomination` for a float line missing from the catalog
    /// - `Database` if any write fails; no partial session is left behind
    pub async fn open(&self, input: OpenSessionInput) -> Result<OpenedSession, CashError> {
        let kept = positive_lines(&input.lines);

        let txn = self.db.begin().await?;

        if cash_registers::Entity::find_by_id(input.cash_register_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(CashError::Validation(format!(
                "unknown cash register: {}",
                input.cash_register_id
            )));
        }

        // The partial unique index backstops this check under concurrency.
        if CashSessionRepository::find_active_for_user(&txn, input.user_id)
            .await?
            .is_some()
        {
            return Err(CashError::Validation(format!(
                "user {} already has an active cash session",
                input.user_id
            )));
        }

        let priced = price_lines(&txn, &kept).await?;
        let opening_amount = total_amount(&priced);
        let prior_balance = input.prior_balance.unwrap_or(Decimal::ZERO);

        let now = chrono::Utc::now().into();
        let session = cash_sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            cash_register_id: Set(input.cash_register_id),
            user_id: Set(input.user_id),
            opened_at: Set(now),
            opening_amount: Set(opening_amount),
            prior_balance: Set(prior_balance),
            state: Set(STATE_ACTIVE),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let float_lines = insert_float_lines(&txn, session.id, &priced).await?;

        txn.commit().await?;

        info!(
            session_id = %session.id,
            user_id = %input.user_id,
            opening_amount = %opening_amount,
            lines = float_lines.len(),
            "Cash session opened"
        );

        Ok(OpenedSession {
            summary: BalanceSummary {
                total_credits: Decimal::ZERO,
                total_debits: Decimal::ZERO,
                opening_amount,
                prior_balance,
            },
            session,
            float_lines,
        })
    }

    /// Lists the caller's sessions hydrated with float detail and balances.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OpenedSession>, CashError> {
        let sessions = CashSessionRepository::new(self.db.clone())
            .list_for_user(user_id)
            .await?;

        let mut out = Vec::with_capacity(sessions.len());
        for session in sessions {
            let float_lines = CashSessionRepository::float_lines(&self.db, session.id).await?;
            let summary = CashSessionRepository::summarize(&self.db, &session).await?;
            out.push(OpenedSession {
                session,
                float_lines,
                summary,
            });
        }

        Ok(out)
    }
}

/// Writes the float detail rows for a freshly created session.
async fn insert_float_lines(
    txn: &DatabaseTransaction,
    session_id: Uuid,
    priced: &[PricedLine],
) -> Result<Vec<session_float_lines::Model>, CashError> {
    let mut rows = Vec::with_capacity(priced.len());

    for line in priced {
        let row = session_float_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session_id),
            denomination: Set(line.denomination.clone()),
            rate: Set(line.rate),
            quantity: Set(line.quantity),
            amount: Set(line.amount),
        };
        rows.push(row.insert(txn).await?);
    }

    Ok(rows)
}
