//! `SeaORM` entity definitions for the cash-session schema.

pub mod cash_registers;
pub mod cash_sessions;
pub mod closing_lines;
pub mod closing_records;
pub mod currency_rates;
pub mod ledger_entries;
pub mod sea_orm_active_enums;
pub mod session_float_lines;
