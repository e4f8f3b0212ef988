use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Per-user balance aggregate. Amounts are integer minor units.
///
/// Invariant: `balance == total_earned - total_withdrawn` and `balance >= 0`.
/// Only `WalletService` is allowed to touch these columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub balance: i64,
    pub total_earned: i64,
    pub total_withdrawn: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
