use crate::entities::cashout_request_entity as cashout_requests;
use crate::entities::cashout_requests::CashoutStatus;
use crate::entities::wallet_transactions::{TransactionDirection, TransactionSource};
use crate::error::{AppError, AppResult};
use crate::models::{CashoutResponse, PaginatedResponse, PaginationParams, RequestCashoutRequest};
use crate::services::WalletService;
use crate::utils::{format_mobile_number, generate_invoice_reference, validate_mobile_number};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};

const DEFAULT_COUNTRY_CODE: &str = "254";

/// Withdrawal workflow on top of the wallet ledger.
///
/// A request holds no funds: the wallet is only checked advisorily at
/// submission and the real debit is deferred to `approve_cashout`, which
/// fails closed (request stays pending) when the balance has since dropped.
#[derive(Clone)]
pub struct CashoutService {
    pool: DatabaseConnection,
    wallet_service: WalletService,
    min_cashout_amount: i64,
}

impl CashoutService {
    pub fn new(
        pool: DatabaseConnection,
        wallet_service: WalletService,
        min_cashout_amount: i64,
    ) -> Self {
        Self {
            pool,
            wallet_service,
            min_cashout_amount,
        }
    }

    /// Submit a withdrawal request. No debit happens here.
    pub async fn request_cashout(
        &self,
        user_id: i64,
        request: RequestCashoutRequest,
    ) -> AppResult<cashout_requests::Model> {
        if request.amount <= 0 {
            return Err(AppError::InvalidAmount);
        }
        if request.amount < self.min_cashout_amount {
            return Err(AppError::BelowMinimum(self.min_cashout_amount));
        }
        if request.account_details.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Account details are required".to_string(),
            ));
        }
        let account_details = if request.payment_method.is_mobile_money() {
            // accept local-format numbers (07xx...) and store them normalized
            let normalized =
                format_mobile_number(request.account_details.trim(), DEFAULT_COUNTRY_CODE);
            validate_mobile_number(&normalized)?;
            normalized
        } else {
            request.account_details.trim().to_string()
        };

        // Advisory only; the balance is re-validated at approval time.
        let wallet = self.wallet_service.get_or_create_wallet(user_id).await?;
        if wallet.balance < request.amount {
            return Err(AppError::InsufficientBalance);
        }

        let insert = cashout_requests::ActiveModel {
            user_id: Set(user_id),
            amount: Set(request.amount),
            payment_method: Set(request.payment_method),
            account_details: Set(account_details),
            status: Set(CashoutStatus::Pending),
            requested_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match insert {
            Ok(model) => Ok(model),
            // the partial unique index on (user_id) WHERE status = 'pending'
            // is the authoritative one-pending-per-user check
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::ConflictExistingPending)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Approve a pending request: debit the wallet and mark it approved in
    /// one transaction. An insufficient balance rolls everything back and
    /// the request remains pending.
    pub async fn approve_cashout(
        &self,
        request_id: i64,
        admin_id: i64,
    ) -> AppResult<cashout_requests::Model> {
        let txn = self.pool.begin().await?;

        let request = Self::find_for_update(&txn, request_id).await?;
        if !request.status.can_transition_to(CashoutStatus::Approved) {
            return Err(AppError::InvalidStateTransition {
                from: request.status,
                to: CashoutStatus::Approved,
            });
        }

        self.wallet_service
            .apply_tx(
                &txn,
                request.user_id,
                request.amount,
                TransactionDirection::Debit,
                TransactionSource::Cashout,
                Some(request.id),
                Some(format!("Cashout request #{}", request.id)),
            )
            .await?;

        let mut active = request.into_active_model();
        active.status = Set(CashoutStatus::Approved);
        active.invoice_reference = Set(Some(generate_invoice_reference()));
        active.processed_by = Set(Some(admin_id));
        active.processed_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Cashout request {} approved by admin {} (amount {})",
            updated.id,
            admin_id,
            updated.amount
        );
        Ok(updated)
    }

    /// Reject a pending request. No ledger effect.
    pub async fn reject_cashout(
        &self,
        request_id: i64,
        admin_id: i64,
        reason: &str,
    ) -> AppResult<cashout_requests::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::ValidationError(
                "A rejection reason is required".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        let request = Self::find_for_update(&txn, request_id).await?;
        if !request.status.can_transition_to(CashoutStatus::Rejected) {
            return Err(AppError::InvalidStateTransition {
                from: request.status,
                to: CashoutStatus::Rejected,
            });
        }

        let mut active = request.into_active_model();
        active.status = Set(CashoutStatus::Rejected);
        active.admin_note = Set(Some(reason.to_string()));
        active.processed_by = Set(Some(admin_id));
        active.processed_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Record that the approved amount was actually transferred out-of-band.
    pub async fn mark_as_paid(
        &self,
        request_id: i64,
        transaction_reference: &str,
    ) -> AppResult<cashout_requests::Model> {
        let transaction_reference = transaction_reference.trim();
        if transaction_reference.is_empty() {
            return Err(AppError::ValidationError(
                "A transaction reference is required".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        let request = Self::find_for_update(&txn, request_id).await?;
        if !request.status.can_transition_to(CashoutStatus::Paid) {
            return Err(AppError::InvalidStateTransition {
                from: request.status,
                to: CashoutStatus::Paid,
            });
        }

        let mut active = request.into_active_model();
        active.status = Set(CashoutStatus::Paid);
        active.transaction_reference = Set(Some(transaction_reference.to_string()));
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn get_request_by_id(&self, request_id: i64) -> AppResult<cashout_requests::Model> {
        cashout_requests::Entity::find_by_id(request_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cashout request {request_id} not found")))
    }

    pub async fn get_user_cashouts(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CashoutResponse>> {
        let filter = cashout_requests::Entity::find()
            .filter(cashout_requests::Column::UserId.eq(user_id));

        let total = filter.clone().count(&self.pool).await? as i64;
        let models = filter
            .order_by_desc(cashout_requests::Column::RequestedAt)
            .order_by_desc(cashout_requests::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<CashoutResponse> = models.into_iter().map(CashoutResponse::from).collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn get_requests_by_status(
        &self,
        status: CashoutStatus,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CashoutResponse>> {
        let filter =
            cashout_requests::Entity::find().filter(cashout_requests::Column::Status.eq(status));

        let total = filter.clone().count(&self.pool).await? as i64;
        let models = filter
            .order_by_desc(cashout_requests::Column::RequestedAt)
            .order_by_desc(cashout_requests::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<CashoutResponse> = models.into_iter().map(CashoutResponse::from).collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    /// Live count; the pending backlog is never maintained as a counter.
    pub async fn get_pending_count(&self) -> AppResult<u64> {
        let count = cashout_requests::Entity::find()
            .filter(cashout_requests::Column::Status.eq(CashoutStatus::Pending))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_for_update(
        txn: &DatabaseTransaction,
        request_id: i64,
    ) -> AppResult<cashout_requests::Model> {
        let mut query = cashout_requests::Entity::find_by_id(request_id);
        if txn.get_database_backend() == DatabaseBackend::Postgres {
            query = query.lock_exclusive();
        }
        query
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cashout request {request_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::cashout_requests::PaymentMethod;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    const MIN_CASHOUT: i64 = 500;

    async fn setup() -> (WalletService, CashoutService) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let wallet_service = WalletService::new(db.clone());
        let cashout_service = CashoutService::new(db, wallet_service.clone(), MIN_CASHOUT);
        (wallet_service, cashout_service)
    }

    fn bank_request(amount: i64) -> RequestCashoutRequest {
        RequestCashoutRequest {
            amount,
            payment_method: PaymentMethod::BankTransfer,
            account_details: "acct-123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_cashout_lifecycle() {
        let (wallets, cashouts) = setup().await;

        // earn 1000, spend 300
        wallets
            .credit(1, 1000, TransactionSource::Sale, Some(1), Some("order #1".to_string()))
            .await
            .unwrap();
        let wallet = wallets
            .debit(1, 300, TransactionSource::OrderPayment, Some(2), Some("order #2".to_string()))
            .await
            .unwrap();
        assert_eq!(wallet.balance, 700);
        assert_eq!(wallet.total_withdrawn, 300);

        // over-drawing fails and changes nothing
        let result = wallets
            .debit(1, 1000, TransactionSource::OrderPayment, None, None)
            .await;
        assert!(matches!(result, Err(AppError::InsufficientBalance)));
        assert_eq!(wallets.get_or_create_wallet(1).await.unwrap().balance, 700);

        // request 600 of the 700
        let request = cashouts.request_cashout(1, bank_request(600)).await.unwrap();
        assert_eq!(request.status, CashoutStatus::Pending);
        assert_eq!(request.amount, 600);
        assert_eq!(cashouts.get_pending_count().await.unwrap(), 1);

        // a second request while one is pending conflicts
        let second = cashouts.request_cashout(1, bank_request(500)).await;
        assert!(matches!(second, Err(AppError::ConflictExistingPending)));

        // approval performs the deferred debit
        let approved = cashouts.approve_cashout(request.id, 99).await.unwrap();
        assert_eq!(approved.status, CashoutStatus::Approved);
        assert!(approved.invoice_reference.is_some());
        assert_eq!(approved.processed_by, Some(99));
        assert!(approved.processed_at.is_some());

        let wallet = wallets.get_or_create_wallet(1).await.unwrap();
        assert_eq!(wallet.balance, 100);
        assert_eq!(wallet.total_withdrawn, 900);
        assert_eq!(wallet.balance, wallet.total_earned - wallet.total_withdrawn);

        // out-of-band transfer confirmed
        let paid = cashouts.mark_as_paid(request.id, "TXN-REF-42").await.unwrap();
        assert_eq!(paid.status, CashoutStatus::Paid);
        assert_eq!(paid.transaction_reference.as_deref(), Some("TXN-REF-42"));

        // terminal states refuse further transitions
        let rejected = cashouts.reject_cashout(request.id, 99, "too late").await;
        assert!(matches!(
            rejected,
            Err(AppError::InvalidStateTransition {
                from: CashoutStatus::Paid,
                to: CashoutStatus::Rejected,
            })
        ));
    }

    #[tokio::test]
    async fn test_request_below_minimum() {
        let (wallets, cashouts) = setup().await;
        wallets
            .credit(1, 1000, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let result = cashouts.request_cashout(1, bank_request(499)).await;
        assert!(matches!(result, Err(AppError::BelowMinimum(MIN_CASHOUT))));
    }

    #[tokio::test]
    async fn test_request_rejects_non_positive_amount() {
        let (_, cashouts) = setup().await;
        let result = cashouts.request_cashout(1, bank_request(0)).await;
        assert!(matches!(result, Err(AppError::InvalidAmount)));
    }

    #[tokio::test]
    async fn test_request_requires_covering_balance() {
        let (wallets, cashouts) = setup().await;
        wallets
            .credit(1, 550, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let result = cashouts.request_cashout(1, bank_request(600)).await;
        assert!(matches!(result, Err(AppError::InsufficientBalance)));
    }

    #[tokio::test]
    async fn test_mobile_money_validates_account_details() {
        let (wallets, cashouts) = setup().await;
        wallets
            .credit(1, 1000, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let bad = cashouts
            .request_cashout(
                1,
                RequestCashoutRequest {
                    amount: 600,
                    payment_method: PaymentMethod::Mpesa,
                    account_details: "not-a-phone".to_string(),
                },
            )
            .await;
        assert!(matches!(bad, Err(AppError::ValidationError(_))));

        let good = cashouts
            .request_cashout(
                1,
                RequestCashoutRequest {
                    amount: 600,
                    payment_method: PaymentMethod::Mpesa,
                    account_details: "+254712345678".to_string(),
                },
            )
            .await;
        assert!(good.is_ok());
    }

    #[tokio::test]
    async fn test_mobile_money_normalizes_local_numbers() {
        let (wallets, cashouts) = setup().await;
        wallets
            .credit(1, 1000, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let request = cashouts
            .request_cashout(
                1,
                RequestCashoutRequest {
                    amount: 600,
                    payment_method: PaymentMethod::Mpesa,
                    account_details: "0712345678".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(request.account_details, "+254712345678");
    }

    #[tokio::test]
    async fn test_approval_fails_closed_when_balance_dropped() {
        let (wallets, cashouts) = setup().await;
        wallets
            .credit(1, 700, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let request = cashouts.request_cashout(1, bank_request(600)).await.unwrap();

        // funds spent elsewhere between request and approval
        wallets
            .debit(1, 400, TransactionSource::OrderPayment, None, None)
            .await
            .unwrap();

        let result = cashouts.approve_cashout(request.id, 99).await;
        assert!(matches!(result, Err(AppError::InsufficientBalance)));

        // the request must still be pending and the wallet untouched
        let reloaded = cashouts.get_request_by_id(request.id).await.unwrap();
        assert_eq!(reloaded.status, CashoutStatus::Pending);
        assert!(reloaded.invoice_reference.is_none());
        let wallet = wallets.get_or_create_wallet(1).await.unwrap();
        assert_eq!(wallet.balance, 300);
        assert_eq!(wallet.total_withdrawn, 400);
    }

    #[tokio::test]
    async fn test_reject_requires_reason_and_skips_ledger() {
        let (wallets, cashouts) = setup().await;
        wallets
            .credit(1, 1000, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let request = cashouts.request_cashout(1, bank_request(600)).await.unwrap();

        let missing = cashouts.reject_cashout(request.id, 99, "  ").await;
        assert!(matches!(missing, Err(AppError::ValidationError(_))));

        let rejected = cashouts
            .reject_cashout(request.id, 99, "account details mismatch")
            .await
            .unwrap();
        assert_eq!(rejected.status, CashoutStatus::Rejected);
        assert_eq!(
            rejected.admin_note.as_deref(),
            Some("account details mismatch")
        );

        // no debit happened
        let wallet = wallets.get_or_create_wallet(1).await.unwrap();
        assert_eq!(wallet.balance, 1000);
        assert_eq!(wallets.get_transaction_count(1).await.unwrap(), 1);

        // the terminal request frees the one-pending slot
        let next = cashouts.request_cashout(1, bank_request(500)).await;
        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn test_mark_as_paid_requires_approved() {
        let (wallets, cashouts) = setup().await;
        wallets
            .credit(1, 1000, TransactionSource::Sale, None, None)
            .await
            .unwrap();

        let request = cashouts.request_cashout(1, bank_request(600)).await.unwrap();
        let result = cashouts.mark_as_paid(request.id, "TXN-1").await;
        assert!(matches!(
            result,
            Err(AppError::InvalidStateTransition {
                from: CashoutStatus::Pending,
                to: CashoutStatus::Paid,
            })
        ));
    }

    #[tokio::test]
    async fn test_unknown_request_is_not_found() {
        let (_, cashouts) = setup().await;
        assert!(matches!(
            cashouts.approve_cashout(12345, 99).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            cashouts.get_request_by_id(12345).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_status_listings_and_pending_count() {
        let (wallets, cashouts) = setup().await;
        for user_id in 1..=3 {
            wallets
                .credit(user_id, 1000, TransactionSource::Sale, None, None)
                .await
                .unwrap();
            cashouts
                .request_cashout(user_id, bank_request(600))
                .await
                .unwrap();
        }
        assert_eq!(cashouts.get_pending_count().await.unwrap(), 3);

        let first = cashouts
            .get_requests_by_status(CashoutStatus::Pending, &PaginationParams::new(None, None))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 3);

        let approved = cashouts.approve_cashout(first.items[0].id, 99).await.unwrap();
        assert_eq!(cashouts.get_pending_count().await.unwrap(), 2);

        let approved_list = cashouts
            .get_requests_by_status(CashoutStatus::Approved, &PaginationParams::new(None, None))
            .await
            .unwrap();
        assert_eq!(approved_list.items.len(), 1);
        assert_eq!(approved_list.items[0].id, approved.id);

        let mine = cashouts
            .get_user_cashouts(1, &PaginationParams::new(None, None))
            .await
            .unwrap();
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].user_id, 1);
    }
}
