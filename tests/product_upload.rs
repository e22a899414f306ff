use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secondhand_market::{
    app::build_app,
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::auth::RegisterRequest,
    middleware::auth::issue_token,
    models::User,
    services::identity_service,
    state::AppState,
    storage::LocalObjectStore,
};
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "----listing-form-boundary";

// Multipart listing creation through the full router. Needs Postgres.
async fn setup() -> anyhow::Result<Option<(Router, AppState, tempfile::TempDir)>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run upload tests.");
            return Ok(None);
        }
    };

    let uploads = tempfile::tempdir()?;
    let mut config = AppConfig::for_tests(database_url);
    config.upload_dir = uploads.path().to_string_lossy().into_owned();

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;

    let images = Arc::new(LocalObjectStore::new(
        config.upload_dir.clone(),
        config.public_base_url.clone(),
    ));
    let state = AppState::new(pool, config, images);
    Ok(Some((build_app(state.clone()), state, uploads)))
}

async fn seller(state: &AppState) -> anyhow::Result<(User, String)> {
    let user = identity_service::register_user(
        state,
        RegisterRequest {
            email: format!("seller-{}@x.com", Uuid::new_v4()),
            password: "pw".into(),
            username: "seller".into(),
        },
    )
    .await?;
    let token = issue_token(user.id, &user.email, &state.config.jwt_secret, 1)?;
    Ok((user, format!("Bearer {token}")))
}

fn text_part(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
    );
}

fn listing_form(price: &str, user_id: Uuid, image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    text_part(&mut body, "title", "Road bike");
    text_part(&mut body, "description", "barely used");
    text_part(&mut body, "category", "Sports");
    text_part(&mut body, "price", price);
    text_part(&mut body, "user_id", &user_id.to_string());
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"bike.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn create_request(auth: &str, body: Vec<u8>) -> Request<Body> {
    Request::post("/api/products")
        .header(header::AUTHORIZATION, auth)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn multipart_listing_is_created_with_image() -> anyhow::Result<()> {
    let Some((app, state, uploads)) = setup().await? else {
        return Ok(());
    };
    let (user, auth) = seller(&state).await?;

    let image = vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];
    let response = app
        .oneshot(create_request(&auth, listing_form("120.50", user.id, Some(&image))))
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await?;
    assert_eq!(body["title"], "Road bike");
    assert_eq!(body["category"], "Sports");
    assert_eq!(body["price"], "120.50");
    assert_eq!(body["seller_id"], user.id.to_string());

    let url = body["image"].as_str().unwrap_or_default();
    assert!(url.starts_with("http://127.0.0.1:5000/uploads/"));
    let name = url.rsplit('/').next().unwrap_or_default();
    assert_eq!(std::fs::read(uploads.path().join(name))?, image);

    Ok(())
}

#[tokio::test]
async fn multipart_listing_for_another_seller_is_forbidden() -> anyhow::Result<()> {
    let Some((app, state, _uploads)) = setup().await? else {
        return Ok(());
    };
    let (_user, auth) = seller(&state).await?;

    let response = app
        .oneshot(create_request(&auth, listing_form("10", Uuid::new_v4(), None)))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn out_of_range_price_is_rejected_before_storage() -> anyhow::Result<()> {
    let Some((app, state, uploads)) = setup().await? else {
        return Ok(());
    };
    let (user, auth) = seller(&state).await?;

    let response = app
        .oneshot(create_request(
            &auth,
            listing_form("100000000000", user.id, Some(b"jpeg")),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert!(body["error"].as_str().unwrap_or_default().contains("price"));
    assert_eq!(std::fs::read_dir(uploads.path())?.count(), 0);

    Ok(())
}
