use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::auth::{LoginRequest, LoginResponse, RegisterRequest, normalize_email};
use crate::{
    dto::users::UpdateProfileRequest,
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::issue_token,
    models::User,
    state::AppState,
};

const EMAIL_TAKEN: &str = "Email is already registered";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(FromRow)]
struct CredentialRow {
    id: Uuid,
    email: String,
    username: String,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
    password_hash: String,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn register_user(state: &AppState, payload: RegisterRequest) -> AppResult<User> {
    payload.validate()?;
    let email = normalize_email(&payload.email);

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, username)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, username, avatar, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(payload.username.trim())
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if AppError::is_unique_violation(&err) {
            AppError::BadRequest(EMAIL_TAKEN.to_string())
        } else {
            AppError::DbError(err)
        }
    })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    let email = normalize_email(&payload.email);
    let row: Option<CredentialRow> = sqlx::query_as(
        "SELECT id, email, username, avatar, created_at, password_hash FROM users WHERE email = $1",
    )
    .bind(email.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let row = match row {
        Some(r) => r,
        None => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into())),
    };

    let parsed_hash = PasswordHash::new(&row.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = issue_token(
        row.id,
        &row.email,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;

    tracing::info!(user_id = %row.id, "user logged in");
    Ok(LoginResponse {
        token,
        user: User {
            id: row.id,
            email: row.email,
            username: row.username,
            avatar: row.avatar,
            created_at: row.created_at,
        },
    })
}

pub async fn get_profile(state: &AppState, user_id: Uuid) -> AppResult<User> {
    let user = Users::find_by_id(user_id).one(&state.orm).await?;
    match user {
        Some(u) => Ok(user_from_entity(u)),
        None => Err(AppError::NotFound),
    }
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    payload: UpdateProfileRequest,
) -> AppResult<User> {
    payload.validate()?;
    let existing = Users::find_by_id(user_id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let email = payload
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|email| *email != existing.email);

    if let Some(email) = &email {
        let taken = Users::find()
            .filter(UserCol::Email.eq(email.as_str()))
            .filter(UserCol::Id.ne(user_id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest(EMAIL_TAKEN.to_string()));
        }
    }

    let mut active: UserActive = existing.into();
    if let Some(username) = payload.username {
        active.username = Set(username.trim().to_string());
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(avatar) = payload.avatar {
        let avatar = avatar.trim().to_string();
        active.avatar = Set((!avatar.is_empty()).then_some(avatar));
    }

    let user = active.update(&state.orm).await.map_err(|err| {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            AppError::BadRequest(EMAIL_TAKEN.to_string())
        } else {
            AppError::OrmError(err)
        }
    })?;

    tracing::info!(user_id = %user.id, "profile updated");
    Ok(user_from_entity(user))
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        avatar: model.avatar,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
