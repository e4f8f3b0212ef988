use crate::entities::wallet_transactions::{TransactionDirection, TransactionSource};
use crate::entities::{
    wallet_entity as wallets, wallet_transaction_entity as wallet_transactions,
};
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, PaginationParams, TransactionResponse};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// The only code path allowed to mutate wallet balances. Every credit/debit
/// updates the aggregate and appends one ledger row inside one database
/// transaction, so a partially applied mutation is never observable.
#[derive(Clone)]
pub struct WalletService {
    pool: DatabaseConnection,
}

impl WalletService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Fetch a user's wallet, creating a zeroed one on first access.
    pub async fn get_or_create_wallet(&self, user_id: i64) -> AppResult<wallets::Model> {
        let txn = self.pool.begin().await?;
        let wallet = self.get_or_create_tx(&txn, user_id).await?;
        txn.commit().await?;
        Ok(wallet)
    }

    /// Increase a wallet's balance. `amount` must be positive.
    pub async fn credit(
        &self,
        user_id: i64,
        amount: i64,
        source: TransactionSource,
        reference_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<wallets::Model> {
        let txn = self.pool.begin().await?;
        let wallet = self
            .apply_tx(
                &txn,
                user_id,
                amount,
                TransactionDirection::Credit,
                source,
                reference_id,
                description,
            )
            .await?;
        txn.commit().await?;
        Ok(wallet)
    }

    /// Decrease a wallet's balance. Fails with `InsufficientBalance` (and no
    /// effect) when the wallet cannot cover `amount`.
    pub async fn debit(
        &self,
        user_id: i64,
        amount: i64,
        source: TransactionSource,
        reference_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<wallets::Model> {
        let txn = self.pool.begin().await?;
        let wallet = self
            .apply_tx(
                &txn,
                user_id,
                amount,
                TransactionDirection::Debit,
                source,
                reference_id,
                description,
            )
            .await?;
        txn.commit().await?;
        Ok(wallet)
    }

    /// Ledger mutation scoped to a caller-owned transaction. The cashout
    /// approval uses this so the deferred debit and the status change commit
    /// or roll back together.
    pub(crate) async fn apply_tx(
        &self,
        txn: &DatabaseTransaction,
        user_id: i64,
        amount: i64,
        direction: TransactionDirection,
        source: TransactionSource,
        reference_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<wallets::Model> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount);
        }

        let wallet = self.get_or_create_tx(txn, user_id).await?;

        let (new_balance, new_earned, new_withdrawn) = match direction {
            TransactionDirection::Credit => (
                wallet.balance + amount,
                wallet.total_earned + amount,
                wallet.total_withdrawn,
            ),
            TransactionDirection::Debit => {
                if wallet.balance < amount {
                    return Err(AppError::InsufficientBalance);
                }
                (
                    wallet.balance - amount,
                    wallet.total_earned,
                    wallet.total_withdrawn + amount,
                )
            }
        };

        let wallet_id = wallet.id;
        let mut active = wallet.into_active_model();
        active.balance = Set(new_balance);
        active.total_earned = Set(new_earned);
        active.total_withdrawn = Set(new_withdrawn);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(txn).await?;

        wallet_transactions::ActiveModel {
            wallet_id: Set(wallet_id),
            direction: Set(direction),
            source: Set(source),
            amount: Set(amount),
            balance_after: Set(new_balance),
            reference_id: Set(reference_id),
            description: Set(description),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(updated)
    }

    /// Ledger rows for a user, newest first.
    pub async fn get_transaction_history(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<TransactionResponse>> {
        let wallet = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?;

        let Some(wallet) = wallet else {
            // No wallet yet means no history; not an error.
            return Ok(PaginatedResponse::new(Vec::new(), params, 0));
        };

        let total = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletId.eq(wallet.id))
            .count(&self.pool)
            .await? as i64;

        let models = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletId.eq(wallet.id))
            .order_by_desc(wallet_transactions::Column::CreatedAt)
            .order_by_desc(wallet_transactions::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<TransactionResponse> =
            models.into_iter().map(TransactionResponse::from).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn get_transaction_count(&self, user_id: i64) -> AppResult<u64> {
        let wallet = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?;

        let Some(wallet) = wallet else {
            return Ok(0);
        };

        let count = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletId.eq(wallet.id))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    /// Row-locked wallet read inside a transaction. The lock clause is
    /// Postgres-only: SQLite has no `FOR UPDATE` and serializes writers with
    /// its own database lock.
    async fn find_for_update(
        txn: &DatabaseTransaction,
        user_id: i64,
    ) -> AppResult<Option<wallets::Model>> {
        let mut query = wallets::Entity::find().filter(wallets::Column::UserId.eq(user_id));
        if txn.get_database_backend() == DatabaseBackend::Postgres {
            query = query.lock_exclusive();
        }
        Ok(query.one(txn).await?)
    }

    async fn get_or_create_tx(
        &self,
        txn: &DatabaseTransaction,
        user_id: i64,
    ) -> AppResult<wallets::Model> {
        if let Some(wallet) = Self::find_for_update(txn, user_id).await? {
            return Ok(wallet);
        }

        // First access: insert a zeroed row. DO NOTHING keeps a concurrent
        // first-access race from aborting the surrounding transaction; the
        // re-select below picks up whichever insert won.
        let now = Utc::now();
        let insert = wallets::Entity::insert(wallets::ActiveModel {
            user_id: Set(user_id),
            balance: Set(0),
            total_earned: Set(0),
            total_withdrawn: Set(0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(wallets::Column::UserId)
                .do_nothing()
                .to_owned(),
        );

        match insert.exec(txn).await {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        Self::find_for_update(txn, user_id)
            .await?
            .ok_or_else(|| AppError::InternalError("Wallet missing after insert".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> WalletService {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        WalletService::new(db)
    }

    #[tokio::test]
    async fn test_new_wallet_is_zeroed() {
        let service = setup().await;
        let wallet = service.get_or_create_wallet(1).await.unwrap();
        assert_eq!(wallet.user_id, 1);
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.total_earned, 0);
        assert_eq!(wallet.total_withdrawn, 0);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let service = setup().await;
        let first = service.get_or_create_wallet(1).await.unwrap();
        let second = service.get_or_create_wallet(1).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_credit_updates_balance_and_logs() {
        let service = setup().await;
        let wallet = service
            .credit(1, 1000, TransactionSource::Sale, None, Some("order #1".to_string()))
            .await
            .unwrap();
        assert_eq!(wallet.balance, 1000);
        assert_eq!(wallet.total_earned, 1000);
        assert_eq!(wallet.total_withdrawn, 0);

        let history = service
            .get_transaction_history(1, &PaginationParams::new(None, None))
            .await
            .unwrap();
        assert_eq!(history.items.len(), 1);
        assert_eq!(history.items[0].direction, TransactionDirection::Credit);
        assert_eq!(history.items[0].amount, 1000);
        assert_eq!(history.items[0].balance_after, 1000);
    }

    #[tokio::test]
    async fn test_credit_rejects_non_positive_amount() {
        let service = setup().await;
        for amount in [0, -5] {
            let result = service
                .credit(1, amount, TransactionSource::Bonus, None, None)
                .await;
            assert!(matches!(result, Err(AppError::InvalidAmount)));
        }
        assert_eq!(service.get_transaction_count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_credit_then_debit_restores_balance() {
        let service = setup().await;
        service
            .credit(1, 700, TransactionSource::Sale, None, None)
            .await
            .unwrap();
        service
            .credit(1, 250, TransactionSource::Sale, None, None)
            .await
            .unwrap();
        let wallet = service
            .debit(1, 250, TransactionSource::OrderPayment, None, None)
            .await
            .unwrap();

        assert_eq!(wallet.balance, 700);
        assert_eq!(wallet.total_earned, 950);
        assert_eq!(wallet.total_withdrawn, 250);
        assert_eq!(wallet.balance, wallet.total_earned - wallet.total_withdrawn);
        assert_eq!(service.get_transaction_count(1).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_debit_entire_balance() {
        let service = setup().await;
        service
            .credit(1, 300, TransactionSource::Sale, None, None)
            .await
            .unwrap();
        let wallet = service
            .debit(1, 300, TransactionSource::OrderPayment, None, None)
            .await
            .unwrap();
        assert_eq!(wallet.balance, 0);
    }

    #[tokio::test]
    async fn test_debit_over_balance_fails_without_effect() {
        let service = setup().await;
        service
            .credit(1, 700, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let result = service
            .debit(1, 701, TransactionSource::OrderPayment, None, None)
            .await;
        assert!(matches!(result, Err(AppError::InsufficientBalance)));

        let wallet = service.get_or_create_wallet(1).await.unwrap();
        assert_eq!(wallet.balance, 700);
        assert_eq!(wallet.total_withdrawn, 0);
        // the failed debit must not leave a ledger row behind
        assert_eq!(service.get_transaction_count(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_paginated() {
        let service = setup().await;
        for i in 1..=5 {
            service
                .credit(1, i * 100, TransactionSource::Sale, Some(i), None)
                .await
                .unwrap();
        }

        let page = service
            .get_transaction_history(1, &PaginationParams::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.items[0].amount, 500);
        assert_eq!(page.items[1].amount, 400);

        let last = service
            .get_transaction_history(1, &PaginationParams::new(Some(3), Some(2)))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].amount, 100);
    }

    #[tokio::test]
    async fn test_wallets_are_isolated_per_user() {
        let service = setup().await;
        service
            .credit(1, 500, TransactionSource::Sale, None, None)
            .await
            .unwrap();
        service
            .credit(2, 900, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let first = service.get_or_create_wallet(1).await.unwrap();
        let second = service.get_or_create_wallet(2).await.unwrap();
        assert_eq!(first.balance, 500);
        assert_eq!(second.balance, 900);
        assert_eq!(service.get_transaction_count(1).await.unwrap(), 1);
    }
}
