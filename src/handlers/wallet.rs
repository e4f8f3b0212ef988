use crate::handlers::current_user;
use crate::models::*;
use crate::services::WalletService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/wallet",
    tag = "wallet",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current wallet balances", body = WalletResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_wallet(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match wallet_service.get_or_create_wallet(user.id).await {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletResponse::from(wallet)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/transactions",
    tag = "wallet",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ledger history, newest first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_transactions(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    let params = PaginationParams::new(query.page, query.per_page);
    match wallet_service.get_transaction_history(user.id, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .route("", web::get().to(get_wallet))
            .route("/transactions", web::get().to(get_transactions)),
    );
}
