use crate::handlers::current_user;
use crate::models::*;
use crate::services::CashoutService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/cashouts",
    tag = "cashout",
    request_body = RequestCashoutRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cashout request created", body = CashoutResponse),
        (status = 400, description = "Invalid amount or account details"),
        (status = 409, description = "A pending request already exists")
    )
)]
pub async fn request_cashout(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
    request: web::Json<RequestCashoutRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match cashout_service
        .request_cashout(user.id, request.into_inner())
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
    get,
    path = "/cashouts",
    tag = "cashout",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own cashout requests, newest first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_my_cashouts(
    cashout_service: web::Data<CashoutService>,
    req: HttpRequest,
    query: web::Query<CashoutQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    let params = PaginationParams::new(query.page, query.per_page);
    match cashout_service.get_user_cashouts(user.id, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cashout_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cashouts")
            .route("", web::post().to(request_cashout))
            .route("", web::get().to(get_my_cashouts)),
    );
}
