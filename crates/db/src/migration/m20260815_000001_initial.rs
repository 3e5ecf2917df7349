//! Initial migration for the cash-session schema.
//!
//! Creates registers, currency reference data, sessions and their float
//! detail, the append-only ledger, and the write-once closing records.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS closing_lines, closing_records, ledger_entries,
             session_float_lines, cash_sessions, currency_rates, cash_registers CASCADE;
             DROP TYPE IF EXISTS entry_sign;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Ledger entry polarity
CREATE TYPE entry_sign AS ENUM ('credit', 'debit');

-- Physical drawers
CREATE TABLE cash_registers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(120) NOT NULL UNIQUE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Denomination catalog (external reference data, read-only here)
CREATE TABLE currency_rates (
    code VARCHAR(16) PRIMARY KEY,
    rate NUMERIC(18, 6) NOT NULL CHECK (rate > 0),
    name VARCHAR(120) NOT NULL,
    symbol VARCHAR(8) NOT NULL
);

-- One opening-to-closing working period per row
CREATE TABLE cash_sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cash_register_id UUID NOT NULL REFERENCES cash_registers(id),
    user_id UUID NOT NULL,
    opened_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    opening_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
    prior_balance NUMERIC(18, 2) NOT NULL DEFAULT 0,
    state SMALLINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- At most one ACTIVE session per user
CREATE UNIQUE INDEX idx_cash_sessions_active_user ON cash_sessions(user_id) WHERE state = 1;

-- Session lookup by owner
CREATE INDEX idx_cash_sessions_user ON cash_sessions(user_id, created_at DESC);

-- Opening float detail, immutable once written
CREATE TABLE session_float_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL REFERENCES cash_sessions(id) ON DELETE CASCADE,
    denomination VARCHAR(16) NOT NULL REFERENCES currency_rates(code),
    rate NUMERIC(18, 6) NOT NULL,
    quantity NUMERIC(18, 2) NOT NULL CHECK (quantity > 0),
    amount NUMERIC(18, 2) NOT NULL
);

CREATE INDEX idx_session_float_lines_session ON session_float_lines(session_id);

-- Append-only credit/debit movements
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL REFERENCES cash_sessions(id) ON DELETE CASCADE,
    entry_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    reason TEXT,
    sign entry_sign NOT NULL,
    denomination VARCHAR(16) REFERENCES currency_rates(code),
    rate NUMERIC(18, 6),
    quantity NUMERIC(18, 2),
    amount NUMERIC(18, 2) NOT NULL
);

CREATE INDEX idx_ledger_entries_session ON ledger_entries(session_id, entry_at);

-- Write-once closing header; the UNIQUE constraint enforces one close per session
CREATE TABLE closing_records (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL UNIQUE REFERENCES cash_sessions(id),
    closed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    counted_total NUMERIC(18, 2) NOT NULL,
    difference NUMERIC(18, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Counted-cash detail, rewritten inside the closing transaction
CREATE TABLE closing_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL REFERENCES cash_sessions(id) ON DELETE CASCADE,
    denomination VARCHAR(16) NOT NULL REFERENCES currency_rates(code),
    rate NUMERIC(18, 6) NOT NULL,
    quantity NUMERIC(18, 2) NOT NULL,
    amount NUMERIC(18, 2) NOT NULL
);

CREATE INDEX idx_closing_lines_session ON closing_lines(session_id);
";
