use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    dto::products::{NewProduct, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    entity::users::{Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    routes::params::{ProductFilter, like_pattern},
    state::AppState,
};

pub async fn list_products(state: &AppState, filter: ProductFilter) -> AppResult<Vec<Product>> {
    let mut condition = Condition::all();

    if let Some(category) = filter.category {
        condition = condition.add(Column::Category.eq(category));
    }

    if let Some(search) = filter.search.as_deref() {
        condition = condition.add(Expr::col(Column::Title).ilike(like_pattern(search)));
    }

    if let Some(seller_id) = filter.seller_id {
        condition = condition.add(Column::UserId.eq(seller_id));
    }

    let items = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, seller)| product_from_entity(product, seller))
        .collect();

    Ok(items)
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<Product> {
    let result = Products::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?;
    match result {
        Some((product, seller)) => Ok(product_from_entity(product, seller)),
        None => Err(AppError::NotFound),
    }
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: NewProduct,
) -> AppResult<Product> {
    if let Some(seller_id) = payload.seller_id {
        user.ensure_self(seller_id)?;
    }

    let stored_image = match payload.image {
        Some(image) => state.images.put_image(image).await?,
        None => String::new(),
    };

    let fields = payload.fields;
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(fields.title),
        description: Set(fields.description),
        category: Set(fields.category),
        price: Set(fields.price),
        image: Set(stored_image.clone()),
        user_id: Set(user.user_id),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await.map_err(|err| {
        if !stored_image.is_empty() {
            tracing::warn!(image = %stored_image, error = %err, "listing insert failed, image left orphaned");
        }
        if matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) {
            AppError::BadRequest("seller does not exist".into())
        } else {
            AppError::OrmError(err)
        }
    })?;

    tracing::info!(product_id = %product.id, seller_id = %user.user_id, "product created");
    get_product(state, product.id).await
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    let fields = payload.validate()?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    user.ensure_self(existing.user_id)?;

    let mut active: ActiveModel = existing.into();
    active.title = Set(fields.title);
    active.description = Set(fields.description);
    active.category = Set(fields.category);
    active.price = Set(fields.price);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    tracing::info!(product_id = %product.id, "product updated");
    get_product(state, product.id).await
}

/// Deleting an id that does not exist still succeeds.
pub async fn delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let Some(existing) = existing else {
        return Ok(());
    };
    user.ensure_self(existing.user_id)?;

    Products::delete_by_id(id).exec(&state.orm).await?;

    tracing::info!(product_id = %id, "product deleted");
    Ok(())
}

pub(crate) fn product_from_entity(model: ProductModel, seller: Option<UserModel>) -> Product {
    Product {
        id: model.id,
        title: model.title,
        description: model.description,
        price: model.price,
        category: model.category,
        image: model.image,
        seller_id: model.user_id,
        seller_name: seller.map(|s| s.username),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
