use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{PurchaseRequest, PurchaseSummary},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::{ErrorBody, PurchaseBody},
    routes::extract::{AppJson, AppPath},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(purchase))
        .route("/{user_id}", get(list_purchases))
        .route("/{user_id}/summary", get(purchase_summary))
}

#[utoipa::path(
    post,
    path = "/api/purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Cart converted to orders", body = PurchaseBody),
        (status = 400, description = "Cart is empty", body = ErrorBody),
        (status = 403, description = "Not your cart", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn purchase(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<PurchaseRequest>,
) -> AppResult<Json<PurchaseBody>> {
    user.ensure_self(payload.user_id)?;
    let orders =
        order_service::complete_purchase(&state, payload.user_id, payload.product_id).await?;
    Ok(Json(PurchaseBody {
        success: true,
        orders,
    }))
}

#[utoipa::path(
    get,
    path = "/api/purchase/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Buyer")
    ),
    responses(
        (status = 200, description = "Purchase history, most recent first", body = Vec<Order>),
        (status = 403, description = "Not your history", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<Order>>> {
    user.ensure_self(user_id)?;
    let orders = order_service::list_orders(&state, user_id).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/purchase/{user_id}/summary",
    params(
        ("user_id" = Uuid, Path, description = "Buyer")
    ),
    responses(
        (status = 200, description = "Number of orders and total spent", body = PurchaseSummary),
        (status = 403, description = "Not your history", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn purchase_summary(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<PurchaseSummary>> {
    user.ensure_self(user_id)?;
    let summary = order_service::purchase_summary(&state, user_id).await?;
    Ok(Json(summary))
}
