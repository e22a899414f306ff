use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::cart_items::{Column as CartCol, Entity as CartItems},
    entity::products::Entity as Products,
    entity::users::{Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    models::CartLine,
    services::product_service::product_from_entity,
    state::AppState,
};

/// Add one copy of a product. A repeat add bumps the quantity in a single statement.
pub async fn add_to_cart(state: &AppState, user_id: Uuid, product_id: Uuid) -> AppResult<i32> {
    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound);
    }

    let (quantity,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + 1
        RETURNING quantity
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(product_id)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| match err.as_database_error() {
        // product removed between the check and the upsert
        Some(db) if db.is_foreign_key_violation() => AppError::NotFound,
        _ => AppError::DbError(err),
    })?;

    tracing::info!(%user_id, %product_id, quantity, "cart updated");
    Ok(quantity)
}

/// Cart lines newest first. Entries whose product is gone are skipped.
pub async fn list_cart(state: &AppState, user_id: Uuid) -> AppResult<Vec<CartLine>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_desc(CartCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let seller_ids: Vec<Uuid> = rows
        .iter()
        .filter_map(|(_, product)| product.as_ref().map(|p| p.user_id))
        .collect();
    let sellers: HashMap<Uuid, _> = Users::find()
        .filter(UserCol::Id.is_in(seller_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let lines = rows
        .into_iter()
        .filter_map(|(item, product)| {
            let product = product?;
            let seller = sellers.get(&product.user_id).cloned();
            Some(CartLine {
                product: product_from_entity(product, seller),
                quantity: item.quantity,
                added_at: item.created_at.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(lines)
}

/// Removing a product that is not in the cart is a no-op.
pub async fn remove_from_cart(state: &AppState, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(%user_id, %product_id, "removed from cart");
    }
    Ok(())
}
