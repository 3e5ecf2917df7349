//! Database layer with `SeaORM` entities and cash repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the cash-session schema
//! - Repository abstractions for the session lifecycle (opening, audit,
//!   closing) and the order-integration guard
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    CashAuditRepository, CashClosingRepository, CashError, CashOpeningRepository,
    CashSessionRepository, CurrencyRateRepository, OrderSessionGuard,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
