use crate::entities::wallet_transactions::{self, TransactionDirection, TransactionSource};
use crate::entities::wallets;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    pub id: i64,
    pub user_id: i64,
    /// Spendable amount in minor units.
    pub balance: i64,
    /// Lifetime sum of credits.
    pub total_earned: i64,
    /// Lifetime sum of debits.
    pub total_withdrawn: i64,
}

impl From<wallets::Model> for WalletResponse {
    fn from(wallet: wallets::Model) -> Self {
        Self {
            id: wallet.id,
            user_id: wallet.user_id,
            balance: wallet.balance,
            total_earned: wallet.total_earned,
            total_withdrawn: wallet.total_withdrawn,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i64,
    pub direction: TransactionDirection,
    pub source: TransactionSource,
    pub amount: i64,
    pub balance_after: i64,
    pub reference_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<wallet_transactions::Model> for TransactionResponse {
    fn from(tx: wallet_transactions::Model) -> Self {
        Self {
            id: tx.id,
            direction: tx.direction,
            source: tx.source,
            amount: tx.amount,
            balance_after: tx.balance_after,
            reference_id: tx.reference_id,
            description: tx.description,
            created_at: tx.created_at,
        }
    }
}

/// Manual credit/debit issued by an administrator (bonus, correction).
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustBalanceRequest {
    pub amount: i64,
    pub source: Option<TransactionSource>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
