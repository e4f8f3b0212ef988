use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl std::fmt::Display for TransactionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionDirection::Credit => write!(f, "credit"),
            TransactionDirection::Debit => write!(f, "debit"),
        }
    }
}

/// Why the money moved.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "cashout")]
    Cashout,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "bonus")]
    Bonus,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "order_payment")]
    OrderPayment,
    #[sea_orm(string_value = "deposit")]
    Deposit,
}

impl std::fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionSource::Sale => write!(f, "sale"),
            TransactionSource::Cashout => write!(f, "cashout"),
            TransactionSource::Refund => write!(f, "refund"),
            TransactionSource::Bonus => write!(f, "bonus"),
            TransactionSource::Adjustment => write!(f, "adjustment"),
            TransactionSource::OrderPayment => write!(f, "order_payment"),
            TransactionSource::Deposit => write!(f, "deposit"),
        }
    }
}

/// Append-only ledger row. Exactly one per successful wallet mutation;
/// never updated or deleted after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub direction: TransactionDirection,
    pub source: TransactionSource,
    pub amount: i64,
    pub balance_after: i64,
    pub reference_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
