use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Category,
};

/// Raw query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Exact category name, e.g. `Home & Garden`.
    pub category: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub seller_id: Option<Uuid>,
}

/// Listing filters; every present filter must match.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub seller_id: Option<Uuid>,
}

impl ProductQuery {
    /// Blank values do not restrict the result set.
    pub fn into_filter(self) -> AppResult<ProductFilter> {
        let category = match non_blank(self.category) {
            Some(raw) => Some(
                Category::parse(&raw)
                    .ok_or_else(|| AppError::BadRequest(format!("unknown category: {raw}")))?,
            ),
            None => None,
        };

        Ok(ProductFilter {
            category,
            search: non_blank(self.search),
            seller_id: self.seller_id,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Escape `LIKE` metacharacters so user input only ever matches literally.
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
