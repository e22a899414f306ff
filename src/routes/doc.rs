use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::AddToCartRequest,
        orders::{PurchaseRequest, PurchaseSummary},
        products::{CreateProductForm, UpdateProductRequest},
        users::UpdateProfileRequest,
    },
    models::{CartLine, Category, Order, Product, User},
    response::{ErrorBody, PurchaseBody, SuccessBody},
    routes::{auth, cart, health, products, purchases, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        users::get_profile,
        users::update_profile,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        purchases::purchase,
        purchases::list_purchases,
        purchases::purchase_summary
    ),
    components(
        schemas(
            User,
            Product,
            Category,
            CartLine,
            Order,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            CreateProductForm,
            UpdateProductRequest,
            AddToCartRequest,
            PurchaseRequest,
            PurchaseSummary,
            PurchaseBody,
            SuccessBody,
            ErrorBody
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "User profiles"),
        (name = "Products", description = "Listings"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Purchases", description = "Checkout and purchase history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
