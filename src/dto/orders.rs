use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    pub user_id: Uuid,
    /// Convert only this cart line instead of the whole cart.
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseSummary {
    pub count: i64,
    #[schema(value_type = String, example = "250.00")]
    pub total_spent: Decimal,
}
