//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Polarity of a ledger entry, mapped to the `entry_sign` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_sign")]
pub enum EntrySign {
    /// Money added to the drawer.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Money removed from the drawer.
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl From<&EntrySign> for caja_core::cash::EntrySign {
    fn from(sign: &EntrySign) -> Self {
        match sign {
            EntrySign::Credit => Self::Credit,
            EntrySign::Debit => Self::Debit,
        }
    }
}
