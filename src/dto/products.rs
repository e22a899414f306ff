use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Category,
    storage::ImageUpload,
};

/// Largest price a `NUMERIC(12, 2)` column holds.
// 9_999_999_999.99 (999_999_999_999 scaled by 2); `Decimal::new` is not const.
pub const MAX_PRICE: Decimal = Decimal::from_parts(
    (999_999_999_999u64 & 0xFFFF_FFFF) as u32,
    (999_999_999_999u64 >> 32) as u32,
    0,
    false,
    2,
);

/// The four mutable listing fields after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFields {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price: Decimal,
}

impl ListingFields {
    pub fn validate(
        title: &str,
        description: &str,
        category: &str,
        price: Decimal,
    ) -> AppResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("title is required".into()));
        }
        let category = Category::parse(category.trim())
            .ok_or_else(|| AppError::BadRequest(format!("unknown category: {category}")))?;
        if price <= Decimal::ZERO {
            return Err(AppError::BadRequest("price must be greater than 0".into()));
        }
        if price > MAX_PRICE {
            return Err(AppError::BadRequest(format!("price must not exceed {MAX_PRICE}")));
        }
        let price = price.normalize();
        if price.scale() > 2 {
            return Err(AppError::BadRequest(
                "price must have at most two decimal places".into(),
            ));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.trim().to_string(),
            category,
            price,
        })
    }
}

/// Fields of the `multipart/form-data` body accepted by `POST /api/products`.
#[derive(Debug, Default, ToSchema)]
pub struct CreateProductForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub user_id: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<ImageUpload>,
}

/// A validated listing ready to be inserted.
#[derive(Debug)]
pub struct NewProduct {
    pub fields: ListingFields,
    pub seller_id: Option<Uuid>,
    pub image: Option<ImageUpload>,
}

impl CreateProductForm {
    pub fn into_new_product(self) -> AppResult<NewProduct> {
        let title = required(self.title, "title")?;
        let category = required(self.category, "category")?;
        let price = required(self.price, "price")?;
        let price = Decimal::from_str(price.trim())
            .map_err(|_| AppError::BadRequest(format!("invalid price: {price}")))?;
        let fields = ListingFields::validate(
            &title,
            self.description.as_deref().unwrap_or_default(),
            &category,
            price,
        )?;

        let seller_id = match self.user_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::BadRequest(format!("invalid user_id: {raw}")))?,
            ),
            _ => None,
        };

        Ok(NewProduct {
            fields,
            seller_id,
            image: self.image.filter(|img| !img.bytes.is_empty()),
        })
    }
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<ListingFields> {
        ListingFields::validate(&self.title, &self.description, &self.category, self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(price: &str) -> CreateProductForm {
        CreateProductForm {
            title: Some("Bike".into()),
            description: Some("Road bike".into()),
            category: Some("Sports".into()),
            price: Some(price.into()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_complete_listing() {
        let product = form("100").into_new_product().unwrap();
        assert_eq!(product.fields.title, "Bike");
        assert_eq!(product.fields.category, Category::Sports);
        assert_eq!(product.fields.price, Decimal::new(100, 0));
        assert!(product.seller_id.is_none());
        assert!(product.image.is_none());
    }

    #[test]
    fn rejects_zero_and_negative_prices() {
        for price in ["0", "0.00", "-5"] {
            let err = form(price).into_new_product().unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "price {price}");
        }
    }

    #[test]
    fn rejects_prices_beyond_column_range() {
        assert!(form("9999999999.99").into_new_product().is_ok());
        for price in ["10000000000", "100000000000"] {
            let err = form(price).into_new_product().unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "price {price}");
        }
    }

    #[test]
    fn trailing_zeros_do_not_count_as_decimal_places() {
        let product = form("100.000").into_new_product().unwrap();
        assert_eq!(product.fields.price, Decimal::new(100, 0));
        assert!(form("12.50").into_new_product().is_ok());
        assert!(form("12.505").into_new_product().is_err());
    }

    #[test]
    fn rejects_missing_fields_and_unknown_category() {
        let mut missing_title = form("10");
        missing_title.title = None;
        assert!(missing_title.into_new_product().is_err());

        let mut bad_category = form("10");
        bad_category.category = Some("Weapons".into());
        assert!(bad_category.into_new_product().is_err());

        assert!(form("ten").into_new_product().is_err());
        assert!(form("1.999").into_new_product().is_err());
    }

    #[test]
    fn empty_image_part_is_treated_as_absent() {
        let mut with_empty = form("10");
        with_empty.image = Some(ImageUpload {
            file_name: Some("a.png".into()),
            content_type: None,
            bytes: Vec::new(),
        });
        assert!(with_empty.into_new_product().unwrap().image.is_none());
    }

    #[test]
    fn update_uses_the_same_rules() {
        let req = UpdateProductRequest {
            title: "Lamp".into(),
            description: String::new(),
            category: "Home & Garden".into(),
            price: Decimal::ZERO,
        };
        assert!(req.validate().is_err());
    }
}
