//! Session store and resolver.
//!
//! Persistence operations over cash sessions plus the resolver that locates
//! the target session for a request, enforcing ownership and active-state
//! invariants. The locked fetch variant takes `SELECT ... FOR UPDATE` on the
//! session row and serializes every mutating operation against that drawer;
//! the lock is released when the caller's transaction commits or rolls back.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use caja_core::cash::{BalanceSummary, summarize};

use crate::entities::{
    cash_sessions::{self, STATE_ACTIVE, STATE_CLOSED},
    ledger_entries,
    sea_orm_active_enums::EntrySign,
    session_float_lines,
};
use crate::repositories::error::CashError;

/// A ledger entry ready to be written.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// Free-text reason; carried by the first entry of an audit group.
    pub reason: Option<String>,
    /// Entry polarity.
    pub sign: EntrySign,
    /// Per-currency breakdown, absent for order advances.
    pub denomination: Option<String>,
    /// Exchange rate at time of entry.
    pub rate: Option<Decimal>,
    /// Number of units.
    pub quantity: Option<Decimal>,
    /// Computed amount in the base accounting currency.
    pub amount: Decimal,
}

/// Repository over cash sessions and their ledger.
#[derive(Debug, Clone)]
pub struct CashSessionRepository {
    db: DatabaseConnection,
}

impl CashSessionRepository {
    /// Creates a new cash session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a session by ID without locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<cash_sessions::Model>, DbErr> {
        cash_sessions::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists sessions owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<cash_sessions::Model>, DbErr> {
        cash_sessions::Entity::find()
            .filter(cash_sessions::Column::UserId.eq(user_id))
            .order_by_desc(cash_sessions::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Finds the single ACTIVE session owned by a user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Option<cash_sessions::Model>, DbErr> {
        cash_sessions::Entity::find()
            .filter(cash_sessions::Column::UserId.eq(user_id))
            .filter(cash_sessions::Column::State.eq(STATE_ACTIVE))
            .one(conn)
            .await
    }

    /// Locates the target session for a request.
    ///
    /// Without an explicit identifier the single ACTIVE session owned by
    /// `user_id` is used. With `lock` set, the fetch takes an exclusive row
    /// lock that blocks concurrent resolvers targeting the same session
    /// until the surrounding transaction finishes; pass a transaction as
    /// `conn` in that case.
    ///
    /// # Errors
    ///
    /// - `SessionRequired` when no explicit id is given and the user has no
    ///   active session
    /// - `SessionNotFound` when the identifier does not resolve
    /// - `OwnershipMismatch` when the session belongs to another user
    /// - `SessionInactive` when the session is not ACTIVE
    pub async fn resolve<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        explicit_id: Option<Uuid>,
        lock: bool,
    ) -> Result<cash_sessions::Model, CashError> {
        let target_id = match explicit_id {
            Some(id) => id,
            None => Self::find_active_for_user(conn, user_id)
                .await?
                .map(|s| s.id)
                .ok_or(CashError::SessionRequired(user_id))?,
        };

        let mut query = cash_sessions::Entity::find_by_id(target_id);
        if lock {
            query = query.lock_exclusive();
        }

        let session = query
            .one(conn)
            .await?
            .ok_or(CashError::SessionNotFound(target_id))?;

        // Ownership is enforced even when an explicit identifier is supplied.
        if session.user_id != user_id {
            return Err(CashError::OwnershipMismatch(target_id));
        }

        // Re-checked after the lock is granted; the session may have been
        // closed while we waited.
        if !session.is_active() {
            return Err(CashError::SessionInactive(target_id));
        }

        Ok(session)
    }

    /// Loads the float detail for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn float_lines<C: ConnectionTrait>(
        conn: &C,
        session_id: Uuid,
    ) -> Result<Vec<session_float_lines::Model>, DbErr> {
        session_float_lines::Entity::find()
            .filter(session_float_lines::Column::SessionId.eq(session_id))
            .all(conn)
            .await
    }

    /// Loads a session's ledger in entry order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ledger<C: ConnectionTrait>(
        conn: &C,
        session_id: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find()
            .filter(ledger_entries::Column::SessionId.eq(session_id))
            .order_by_asc(ledger_entries::Column::EntryAt)
            .order_by_asc(ledger_entries::Column::Id)
            .all(conn)
            .await
    }

    /// Aggregates a session's ledger into a balance summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be loaded.
    pub async fn summarize<C: ConnectionTrait>(
        conn: &C,
        session: &cash_sessions::Model,
    ) -> Result<BalanceSummary, CashError> {
        let entries = Self::ledger(conn, session.id).await?;

        Ok(summarize(
            session.opening_amount,
            session.prior_balance,
            entries.iter().map(|e| ((&e.sign).into(), e.amount)),
        ))
    }

    /// Appends ledger entries to a session. Callers pass the surrounding
    /// transaction so a later failure rolls the whole group back.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub async fn insert_entries<C: ConnectionTrait>(
        conn: &C,
        session_id: Uuid,
        entries: Vec<NewLedgerEntry>,
    ) -> Result<Vec<ledger_entries::Model>, DbErr> {
        let now = chrono::Utc::now().into();
        let mut written = Vec::with_capacity(entries.len());

        for entry in entries {
            let row = ledger_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                session_id: Set(session_id),
                entry_at: Set(now),
                reason: Set(entry.reason),
                sign: Set(entry.sign),
                denomination: Set(entry.denomination),
                rate: Set(entry.rate),
                quantity: Set(entry.quantity),
                amount: Set(entry.amount),
            };
            written.push(row.insert(conn).await?);
        }

        Ok(written)
    }

    /// Transitions a session out of the ACTIVE state.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_closed<C: ConnectionTrait>(
        conn: &C,
        session_id: Uuid,
    ) -> Result<cash_sessions::Model, DbErr> {
        cash_sessions::ActiveModel {
            id: Set(session_id),
            state: Set(STATE_CLOSED),
            ..Default::default()
        }
        .update(conn)
        .await
    }
}
