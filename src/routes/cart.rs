use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::AddToCartRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartLine,
    response::{ErrorBody, SuccessBody},
    routes::extract::{AppJson, AppPath},
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_to_cart))
        .route("/{user_id}", get(cart_list))
        .route("/{user_id}/{product_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner")
    ),
    responses(
        (status = 200, description = "Cart lines, newest first", body = Vec<CartLine>),
        (status = 403, description = "Not your cart", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<CartLine>>> {
    user.ensure_self(user_id)?;
    let lines = cart_service::list_cart(&state, user_id).await?;
    Ok(Json(lines))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Added, or quantity incremented", body = SuccessBody),
        (status = 403, description = "Not your cart", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AddToCartRequest>,
) -> AppResult<Json<SuccessBody>> {
    user.ensure_self(payload.user_id)?;
    cart_service::add_to_cart(&state, payload.user_id, payload.product_id).await?;
    Ok(Json(SuccessBody::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{user_id}/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed (no-op when absent)", body = SuccessBody),
        (status = 403, description = "Not your cart", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((user_id, product_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<Json<SuccessBody>> {
    user.ensure_self(user_id)?;
    cart_service::remove_from_cart(&state, user_id, product_id).await?;
    Ok(Json(SuccessBody::ok()))
}
