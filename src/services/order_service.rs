use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::PurchaseSummary,
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        products::{Column as ProdCol, Entity as Products},
        purchases::{ActiveModel as PurchaseActive, Column as PurchaseCol, Entity as Purchases, Model as PurchaseModel},
    },
    error::{AppError, AppResult},
    models::Order,
    state::AppState,
};

/// Convert the user's cart into purchase records in one transaction.
///
/// Every cart entry becomes one order priced at the product's current price,
/// and the entries are removed. With `only_product` set, only that entry is
/// converted. Either all selected entries convert or none do.
pub async fn complete_purchase(
    state: &AppState,
    user_id: Uuid,
    only_product: Option<Uuid>,
) -> AppResult<Vec<Order>> {
    let txn = state.orm.begin().await?;

    let mut finder = CartItems::find().filter(CartCol::UserId.eq(user_id));
    if let Some(product_id) = only_product {
        finder = finder.filter(CartCol::ProductId.eq(product_id));
    }
    let entries = finder
        .order_by_asc(CartCol::CreatedAt)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if entries.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let product_ids: Vec<Uuid> = entries.iter().map(|e| e.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut orders: Vec<Order> = Vec::with_capacity(entries.len());
    for entry in &entries {
        let Some(product) = products.get(&entry.product_id) else {
            continue;
        };
        let purchase = PurchaseActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product.id),
            title: Set(product.title.clone()),
            image: Set(product.image.clone()),
            price: Set(product.price),
            quantity: Set(entry.quantity),
            purchased_at: NotSet,
        }
        .insert(&txn)
        .await?;

        orders.push(order_from_entity(purchase));
    }

    if orders.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let entry_ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
    CartItems::delete_many()
        .filter(CartCol::Id.is_in(entry_ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(%user_id, orders = orders.len(), "purchase completed");
    Ok(orders)
}

/// Purchase history, most recent first.
pub async fn list_orders(state: &AppState, user_id: Uuid) -> AppResult<Vec<Order>> {
    let orders = Purchases::find()
        .filter(PurchaseCol::UserId.eq(user_id))
        .order_by_desc(PurchaseCol::PurchasedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();
    Ok(orders)
}

pub async fn purchase_summary(state: &AppState, user_id: Uuid) -> AppResult<PurchaseSummary> {
    let (count, total_spent): (i64, Decimal) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(price * quantity), 0)::NUMERIC
        FROM purchases
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(PurchaseSummary { count, total_spent })
}

fn order_from_entity(model: PurchaseModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        title: model.title,
        image: model.image,
        price: model.price,
        quantity: model.quantity,
        purchased_at: model.purchased_at.with_timezone(&Utc),
    }
}
