//! `SeaORM` Entity for the cash_sessions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State value for an open session. Anything else is inactive.
pub const STATE_ACTIVE: i16 = 1;
/// State value set by the closing manager.
pub const STATE_CLOSED: i16 = 2;

/// One opening-to-closing working period for a cash drawer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cash_register_id: Uuid,
    pub user_id: Uuid,
    pub opened_at: DateTimeWithTimeZone,
    pub opening_amount: Decimal,
    pub prior_balance: Decimal,
    pub state: i16,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this session is still open for audits and closing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == STATE_ACTIVE
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_registers::Entity",
        from = "Column::CashRegisterId",
        to = "super::cash_registers::Column::Id"
    )]
    CashRegisters,
    #[sea_orm(has_many = "super::session_float_lines::Entity")]
    SessionFloatLines,
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
    #[sea_orm(has_one = "super::closing_records::Entity")]
    ClosingRecords,
}

impl Related<super::cash_registers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashRegisters.def()
    }
}

impl Related<super::session_float_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionFloatLines.def()
    }
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::closing_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClosingRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
