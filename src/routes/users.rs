use axum::{Json, Router, extract::State, routing::get};
use uuid::Uuid;

use crate::{
    dto::users::UpdateProfileRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ErrorBody,
    routes::extract::{AppJson, AppPath},
    services::identity_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_profile).put(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = User),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "Users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<User>> {
    let user = identity_service::get_profile(&state, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/user/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Invalid input or email taken", body = ErrorBody),
        (status = 403, description = "Not your profile", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<User>> {
    user.ensure_self(id)?;
    let user = identity_service::update_profile(&state, id, payload).await?;
    Ok(Json(user))
}
