use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "mpesa")]
    Mpesa,
    #[sea_orm(string_value = "airtel_money")]
    AirtelMoney,
}

impl PaymentMethod {
    /// Mobile-money channels carry a phone number in `account_details`.
    pub fn is_mobile_money(&self) -> bool {
        matches!(self, PaymentMethod::Mpesa | PaymentMethod::AirtelMoney)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::Mpesa => write!(f, "mpesa"),
            PaymentMethod::AirtelMoney => write!(f, "airtel_money"),
        }
    }
}

/// Lifecycle of a withdrawal request.
///
/// `pending -> approved -> paid`, or `pending -> rejected`. Terminal states
/// are never left. The decode is strict: a persisted value outside these four
/// is a `DbErr`, never coerced back to `pending`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum CashoutStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl CashoutStatus {
    pub fn can_transition_to(&self, next: CashoutStatus) -> bool {
        matches!(
            (self, next),
            (CashoutStatus::Pending, CashoutStatus::Approved)
                | (CashoutStatus::Pending, CashoutStatus::Rejected)
                | (CashoutStatus::Approved, CashoutStatus::Paid)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CashoutStatus::Rejected | CashoutStatus::Paid)
    }
}

impl std::fmt::Display for CashoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CashoutStatus::Pending => write!(f, "pending"),
            CashoutStatus::Approved => write!(f, "approved"),
            CashoutStatus::Rejected => write!(f, "rejected"),
            CashoutStatus::Paid => write!(f, "paid"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cashout_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(CashoutStatus::Pending.can_transition_to(CashoutStatus::Approved));
        assert!(CashoutStatus::Pending.can_transition_to(CashoutStatus::Rejected));
        assert!(CashoutStatus::Approved.can_transition_to(CashoutStatus::Paid));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!CashoutStatus::Pending.can_transition_to(CashoutStatus::Paid));
        assert!(!CashoutStatus::Approved.can_transition_to(CashoutStatus::Rejected));
        assert!(!CashoutStatus::Rejected.can_transition_to(CashoutStatus::Approved));
        assert!(!CashoutStatus::Paid.can_transition_to(CashoutStatus::Paid));
        assert!(!CashoutStatus::Paid.can_transition_to(CashoutStatus::Rejected));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CashoutStatus::Pending.is_terminal());
        assert!(!CashoutStatus::Approved.is_terminal());
        assert!(CashoutStatus::Rejected.is_terminal());
        assert!(CashoutStatus::Paid.is_terminal());
    }
}
