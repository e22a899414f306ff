pub mod cart_items;
pub mod products;
pub mod purchases;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use products::Entity as Products;
pub use purchases::Entity as Purchases;
pub use users::Entity as Users;
