//! Integration tests for the identity API.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use keystore_identity::{
    api::{create_router, create_router_with_rate_limit, AppState, RateLimitState},
    load_keystores, KeystoreRecord, KeystoreRegistry,
};
use tempfile::TempDir;
use tower::ServiceExt;

const KEYSTORE_400: &str = r#"{"address":"2ad1b3ccb3ec85337ca2dbfa99845c37e06ab400","crypto":{"cipher":"aes-128-ctr","cipherparams":{"iv":"f28cd5b3cb26a7f560c234f5cc5c0787"},"ciphertext":"0cbc13b52c07838c2b9ea606870ee651e930962f194bbf98ef860373632d43e0","kdf":"scrypt","kdfparams":{"dklen":32,"n":262144,"p":1,"r":8,"salt":"0b6cd52039d0829315c50e8ec15767c9a82b11d1e22bb200e0eb363ccbdca8d8"},"mac":"35ccb9e2562927b3af92c632a8d6ada241f58e4c5197e37bb0e0ad4782639ec6"},"id":"9cb14b83-6021-45a3-a1a9-4a86387310fc","version":3}"#;
const KEYSTORE_401: &str = r#"{"address":"2ad1b3ccb3ec85337ca2dbfa99845c37e06ab401","crypto":{"cipher":"aes-128-ctr","cipherparams":{"iv":"f28cd5b3cb26a7z341c234f5cc5c0530"},"ciphertext":"0cbc13b52c07838c2b9ea606870ee651e930962f194bbf98ef860373632d43e0","kdf":"scrypt","kdfparams":{"dklen":32,"n":262144,"p":1,"r":8,"salt":"0b6cd52039d0829315c50e8ec15767c9a82b11d1e22bb200e0eb363ccbdca8d8"},"mac":"35ccb9e2562927b3af92c632a8d6ada241f58e4c5197e37bb0e0ad4782715ec8"},"id":"9cb14b83-5921-45a3-a1a9-4a86387310fc","version":3}"#;

fn record(raw: &str) -> KeystoreRecord {
    KeystoreRecord::from_json(raw.as_bytes().to_vec()).unwrap()
}

/// Create a test app over the given registry.
fn create_test_app(registry: KeystoreRegistry) -> Router {
    create_router(AppState::new(registry))
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn assert_json_content_type(response: &Response) {
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
}

#[tokio::test]
async fn test_info_endpoint() {
    let app = create_test_app(KeystoreRegistry::default());

    let response = get(app, "/api/v1/info").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_json_content_type(&response);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["providerName"], "Acme");
}

#[tokio::test]
async fn test_accounts_empty_then_loaded() {
    let registry = KeystoreRegistry::default();
    let app = create_test_app(registry.clone());

    let response = get(app.clone(), "/api/v1/accounts").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_json_content_type(&response);

    let accounts: Vec<String> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(accounts.is_empty());

    registry
        .set_keystores(vec![
            KeystoreRecord {
                address: "2ad1b3ccb3ec85337ca2dbfa99845c37e06ab238".into(),
                raw: Vec::new(),
            },
            KeystoreRecord {
                address: "2ad1b3ccb3ec85337ca2dbfa99845c37e06ab239".into(),
                raw: Vec::new(),
            },
        ])
        .await;

    let response = get(app, "/api/v1/accounts").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_json_content_type(&response);

    let accounts: Vec<String> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(
        accounts,
        vec![
            "0x2ad1b3ccb3ec85337ca2dbfa99845c37e06ab238",
            "0x2ad1b3ccb3ec85337ca2dbfa99845c37e06ab239",
        ]
    );
}

#[tokio::test]
async fn test_account_lookup() {
    let registry = KeystoreRegistry::default();
    let keystores = vec![record(KEYSTORE_400), record(KEYSTORE_401)];
    let bare_address = keystores[0].address.clone();
    let upper_address = format!("0x{}", keystores[1].address.to_uppercase());
    registry.set_keystores(keystores).await;

    let app = create_test_app(registry);

    // Not found
    let response = get(app.clone(), "/api/v1/account/0xbadkey").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_json_content_type(&response);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["code"], "NOT_FOUND");

    // Bad request
    let response = get(app.clone(), &format!("/api/v1/account/{}", bare_address)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_json_content_type(&response);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["code"], "MALFORMED_ADDRESS");

    // Normal, upper-cased address
    let response = get(app, &format!("/api/v1/account/{}", upper_address)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_json_content_type(&response);
    assert_eq!(body_bytes(response).await, KEYSTORE_401.as_bytes());
}

#[tokio::test]
async fn test_serves_keystores_loaded_from_disk() {
    let dir = TempDir::new().unwrap();
    // Pretty-printed on purpose: the body must not be re-serialized
    let pretty = "{\n  \"address\": \"AbCdEf0000000000000000000000000000000001\",\n  \"version\": 3\n}\n";
    std::fs::write(dir.path().join("UTC--account.json"), pretty).unwrap();
    std::fs::create_dir(dir.path().join("backup")).unwrap();

    let entries = load_keystores(dir.path()).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[1].is_none());

    let registry = KeystoreRegistry::default();
    registry
        .set_keystores(entries.into_iter().flatten().collect())
        .await;
    let app = create_test_app(registry);

    let response = get(app.clone(), "/api/v1/accounts").await;
    let accounts: Vec<String> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(accounts, vec!["0xAbCdEf0000000000000000000000000000000001"]);

    let response = get(
        app.clone(),
        "/api/v1/account/0xabcdef0000000000000000000000000000000001",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, pretty.as_bytes());

    // The skipped subdirectory leaves no empty-address entry behind
    let response = get(app, "/api/v1/account/0x").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_json_content_type(&response);
}

#[tokio::test]
async fn test_health_endpoint() {
    let registry = KeystoreRegistry::default();
    let app = create_test_app(registry.clone());

    let response = get(app.clone(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["accounts"], 0);
    assert!(json["loaded_at"].is_null());

    registry.set_keystores(vec![record(KEYSTORE_400)]).await;

    let response = get(app, "/health").await;
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["accounts"], 1);
    assert!(json["loaded_at"].is_string());
}

#[tokio::test]
async fn test_only_get_is_routed() {
    let app = create_test_app(KeystoreRegistry::default());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_rate_limiting() {
    // Very restrictive rate limit: 1 request per minute
    let app = create_router_with_rate_limit(
        AppState::new(KeystoreRegistry::default()),
        RateLimitState::new(1),
    );

    let response = get(app.clone(), "/api/v1/accounts").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app, "/api/v1/accounts").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_json_content_type(&response);
}
