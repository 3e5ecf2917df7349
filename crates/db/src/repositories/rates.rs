//! Currency rate resolver.
//!
//! Read-only lookups against the denomination catalog. Rate resolution is
//! side-effect-free, so it may run inside or outside a caller's transaction.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use caja_core::cash::{LineInput, PricedLine};

use crate::entities::currency_rates;
use crate::repositories::error::CashError;

/// Repository over the currency catalog.
#[derive(Debug, Clone)]
pub struct CurrencyRateRepository {
    db: DatabaseConnection,
}

impl CurrencyRateRepository {
    /// Creates a new currency rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks up a denomination by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, code: &str) -> Result<Option<currency_rates::Model>, DbErr> {
        currency_rates::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
    }

    /// Lists the full denomination catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<currency_rates::Model>, DbErr> {
        currency_rates::Entity::find()
            .order_by_asc(currency_rates::Column::Code)
            .all(&self.db)
            .await
    }
}

/// Prices a set of cash lines against the catalog: each line gets the rate
/// in force now, and `amount = rate × quantity`.
///
/// Denominations are resolved once per distinct code. An unknown code fails
/// the whole set.
///
/// # Errors
///
/// Returns `CashError::UnknownDenomination` for a code missing from the
/// catalog, or `CashError::Database` if the lookup fails.
pub async fn price_lines<C: ConnectionTrait>(
    conn: &C,
    lines: &[LineInput],
) -> Result<Vec<PricedLine>, CashError> {
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let mut codes: Vec<String> = lines.iter().map(|l| l.denomination.clone()).collect();
    codes.sort();
    codes.dedup();

    let rates: HashMap<String, Decimal> = currency_rates::Entity::find()
        .filter(currency_rates::Column::Code.is_in(codes))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.code, m.rate))
        .collect();

    lines
        .iter()
        .map(|line| {
            let rate = rates
                .get(&line.denomination)
                .copied()
                .ok_or_else(|| CashError::UnknownDenomination(line.denomination.clone()))?;
            Ok(PricedLine::price(
                line.denomination.clone(),
                rate,
                line.quantity,
            ))
        })
        .collect()
}
