use crate::entities::cashout_requests::{self, CashoutStatus, PaymentMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestCashoutRequest {
    pub amount: i64,
    pub payment_method: PaymentMethod,
    /// Bank account number or mobile-money phone number.
    pub account_details: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectCashoutRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkPaidRequest {
    /// Reference of the out-of-band transfer (bank slip, mobile-money code).
    pub transaction_reference: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CashoutQuery {
    pub status: Option<CashoutStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CashoutResponse {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub account_details: String,
    pub status: CashoutStatus,
    pub admin_note: Option<String>,
    pub invoice_reference: Option<String>,
    pub transaction_reference: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<i64>,
}

impl From<cashout_requests::Model> for CashoutResponse {
    fn from(request: cashout_requests::Model) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            amount: request.amount,
            payment_method: request.payment_method,
            account_details: request.account_details,
            status: request.status,
            admin_note: request.admin_note,
            invoice_reference: request.invoice_reference,
            transaction_reference: request.transaction_reference,
            requested_at: request.requested_at,
            processed_at: request.processed_at,
            processed_by: request.processed_by,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingCountResponse {
    pub pending: u64,
}
