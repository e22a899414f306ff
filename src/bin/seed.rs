use rust_decimal::Decimal;
use secondhand_market::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::Category,
    services::identity_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;

    let seller_id = ensure_user(&pool, "seller@example.com", "seller123", "seller").await?;
    let buyer_id = ensure_user(&pool, "buyer@example.com", "buyer123", "buyer").await?;
    seed_products(&pool, seller_id).await?;

    println!("Seed completed. Seller ID: {seller_id}, Buyer ID: {buyer_id}");
    pool.close().await;
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    email: &str,
    password: &str,
    username: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, username)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET username = EXCLUDED.username
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(username)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn seed_products(pool: &DbPool, seller_id: Uuid) -> anyhow::Result<()> {
    let products = vec![
        ("Road Bike", "Aluminium frame, 54cm, recently serviced", Category::Sports, Decimal::new(25000, 2)),
        ("Oak Bookshelf", "Five shelves, minor scratches", Category::Furniture, Decimal::new(8000, 2)),
        ("Noise Cancelling Headphones", "Barely used, original box", Category::Electronics, Decimal::new(12050, 2)),
        ("Garden Hose 20m", "With spray nozzle", Category::HomeAndGarden, Decimal::new(1500, 2)),
        ("The Rust Programming Language", "Paperback, second edition", Category::Books, Decimal::new(2000, 2)),
    ];

    for (title, description, category, price) in products {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE title = $1 AND user_id = $2")
                .bind(title)
                .bind(seller_id)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO products (id, title, description, category, price, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(category.as_str())
        .bind(price)
        .bind(seller_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
