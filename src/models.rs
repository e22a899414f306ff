use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Public projection of a user. The credential never leaves the identity service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fixed set of listing categories, stored by display name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Category {
    #[sea_orm(string_value = "Electronics")]
    Electronics,
    #[sea_orm(string_value = "Clothing")]
    Clothing,
    #[serde(rename = "Home & Garden")]
    #[sea_orm(string_value = "Home & Garden")]
    HomeAndGarden,
    #[sea_orm(string_value = "Sports")]
    Sports,
    #[sea_orm(string_value = "Books")]
    Books,
    #[sea_orm(string_value = "Toys")]
    Toys,
    #[sea_orm(string_value = "Furniture")]
    Furniture,
    #[sea_orm(string_value = "Automotive")]
    Automotive,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Electronics,
        Category::Clothing,
        Category::HomeAndGarden,
        Category::Sports,
        Category::Books,
        Category::Toys,
        Category::Furniture,
        Category::Automotive,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::HomeAndGarden => "Home & Garden",
            Category::Sports => "Sports",
            Category::Books => "Books",
            Category::Toys => "Toys",
            Category::Furniture => "Furniture",
            Category::Automotive => "Automotive",
            Category::Other => "Other",
        }
    }

    /// Exact match on the display name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    pub category: Category,
    pub image: String,
    pub seller_id: Uuid,
    pub seller_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product in a user's cart together with how many copies they want.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

/// Immutable purchase record. Title, image and price are snapshots taken at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub image: String,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    pub quantity: i32,
    pub purchased_at: DateTime<Utc>,
}
