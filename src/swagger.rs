use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::cashout_requests::{CashoutStatus, PaymentMethod};
use crate::entities::users::UserRole;
use crate::entities::wallet_transactions::{TransactionDirection, TransactionSource};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::wallet::get_wallet,
        handlers::wallet::get_transactions,
        handlers::cashout::request_cashout,
        handlers::cashout::get_my_cashouts,
        handlers::admin::list_cashouts,
        handlers::admin::pending_count,
        handlers::admin::get_cashout,
        handlers::admin::approve_cashout,
        handlers::admin::reject_cashout,
        handlers::admin::mark_as_paid,
        handlers::admin::credit_wallet,
        handlers::admin::debit_wallet,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            UserResponse,
            UserRole,
            WalletResponse,
            TransactionResponse,
            TransactionDirection,
            TransactionSource,
            AdjustBalanceRequest,
            RequestCashoutRequest,
            RejectCashoutRequest,
            MarkPaidRequest,
            CashoutResponse,
            CashoutStatus,
            PaymentMethod,
            PendingCountResponse,
            PaginationParams,
            PaginationInfo,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and token endpoints"),
        (name = "wallet", description = "Wallet balances and ledger history"),
        (name = "cashout", description = "User withdrawal requests"),
        (name = "admin", description = "Finance-staff cashout processing and manual adjustments")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
