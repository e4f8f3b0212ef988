use crate::entities::cashout_requests::CashoutStatus;
use crate::entities::wallet_transactions::TransactionSource;
use crate::handlers::require_admin;
use crate::models::*;
use crate::services::{CashoutService, WalletService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/cashouts",
    tag = "admin",
    params(
        ("status" = Option<CashoutStatus>, Query, description = "Filter by workflow status (default pending)"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cashout requests in the given status"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_cashouts(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
    query: web::Query<CashoutQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    let status = query.status.unwrap_or(CashoutStatus::Pending);
    let params = PaginationParams::new(query.page, query.per_page);
    match cashout_service.get_requests_by_status(status, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/cashouts/pending-count",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of pending requests", body = PendingCountResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn pending_count(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match cashout_service.get_pending_count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": PendingCountResponse { pending: count }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/cashouts/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Cashout request id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cashout request", body = CashoutResponse),
        (status = 404, description = "Unknown request id")
    )
)]
pub async fn get_cashout(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match cashout_service.get_request_by_id(path.into_inner()).await {
        Ok(model) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CashoutResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/cashouts/{id}/approve",
    tag = "admin",
    params(("id" = i64, Path, description = "Cashout request id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Request approved and wallet debited", body = CashoutResponse),
        (status = 400, description = "Balance no longer covers the amount"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn approve_cashout(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(e) => return Ok(e.error_response()),
    };

    match cashout_service
        .approve_cashout(path.into_inner(), admin.id)
        .await
    {
        Ok(model) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CashoutResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/cashouts/{id}/reject",
    tag = "admin",
    params(("id" = i64, Path, description = "Cashout request id")),
    request_body = RejectCashoutRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Request rejected", body = CashoutResponse),
        (status = 400, description = "Missing rejection reason"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_cashout(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<RejectCashoutRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(e) => return Ok(e.error_response()),
    };

    match cashout_service
        .reject_cashout(path.into_inner(), admin.id, &request.reason)
        .await
    {
        Ok(model) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CashoutResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/cashouts/{id}/paid",
    tag = "admin",
    params(("id" = i64, Path, description = "Cashout request id")),
    request_body = MarkPaidRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Out-of-band transfer recorded", body = CashoutResponse),
        (status = 409, description = "Request is not approved")
    )
)]
pub async fn mark_as_paid(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<MarkPaidRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match cashout_service
        .mark_as_paid(path.into_inner(), &request.transaction_reference)
        .await
    {
        Ok(model) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CashoutResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/wallets/{user_id}/credit",
    tag = "admin",
    params(("user_id" = i64, Path, description = "Wallet owner")),
    request_body = AdjustBalanceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Wallet credited", body = WalletResponse),
        (status = 400, description = "Invalid amount")
    )
)]
pub async fn credit_wallet(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AdjustBalanceRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    let request = request.into_inner();
    let source = request.source.unwrap_or(TransactionSource::Adjustment);
    match wallet_service
        .credit(path.into_inner(), request.amount, source, None, request.description)
        .await
    {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletResponse::from(wallet)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/wallets/{user_id}/debit",
    tag = "admin",
    params(("user_id" = i64, Path, description = "Wallet owner")),
    request_body = AdjustBalanceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Wallet debited", body = WalletResponse),
        (status = 400, description = "Invalid amount or insufficient balance")
    )
)]
pub async fn debit_wallet(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AdjustBalanceRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    let request = request.into_inner();
    let source = request.source.unwrap_or(TransactionSource::Adjustment);
    match wallet_service
        .debit(path.into_inner(), request.amount, source, None, request.description)
        .await
    {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletResponse::from(wallet)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/cashouts", web::get().to(list_cashouts))
            .route("/cashouts/pending-count", web::get().to(pending_count))
            .route("/cashouts/{id}", web::get().to(get_cashout))
            .route("/cashouts/{id}/approve", web::post().to(approve_cashout))
            .route("/cashouts/{id}/reject", web::post().to(reject_cashout))
            .route("/cashouts/{id}/paid", web::post().to(mark_as_paid))
            .route("/wallets/{user_id}/credit", web::post().to(credit_wallet))
            .route("/wallets/{user_id}/debit", web::post().to(debit_wallet)),
    );
}
