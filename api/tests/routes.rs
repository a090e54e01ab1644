use std::time::Duration;

use app::database;
use rocket::{
    http::{ContentType, Status},
    local::asynchronous::{Client, LocalResponse},
};
use serde_json::{json, Value};

async fn client_with_limit(limit: usize) -> Client {
    let db = database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    let rocket = api::register(
        rocket::build(),
        db,
        api::Cors::new("*"),
        api::RateLimit::new(limit, Duration::from_secs(60)),
    );
    Client::tracked(rocket).await.unwrap()
}

async fn client() -> Client {
    client_with_limit(100).await
}

async fn body(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.unwrap()
}

async fn register(client: &Client, email: &str, password: &str) -> (Status, Value) {
    let response = client
        .post("/api/register")
        .header(ContentType::JSON)
        .body(json!({ "name": "Ann", "email": email, "password": password }).to_string())
        .dispatch()
        .await;
    (response.status(), body(response).await)
}

async fn post(client: &Client, uri: String) -> (Status, Value) {
    let response = client.post(uri).dispatch().await;
    (response.status(), body(response).await)
}

#[tokio::test]
async fn register_returns_created_user() {
    let client = client().await;
    let (status, user) = register(&client, "ann@example.com", "secret1").await;
    assert_eq!(status, Status::Created);
    assert_eq!(user["name"], "Ann");
    assert_eq!(user["email"], "ann@example.com");
    assert_eq!(user["stamps"], 0);
    assert!(user["id"].as_i64().is_some());
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn registering_twice_is_a_bad_request() {
    let client = client().await;
    register(&client, "ann@example.com", "secret1").await;
    let (status, error) = register(&client, "ann@example.com", "secret1").await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(error["code"], "EMAIL_TAKEN");
    assert_eq!(error["field"], "email");
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn validation_errors_name_the_field() {
    let client = client().await;
    let (status, error) = register(&client, "ann.example.com", "secret1").await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(error["field"], "email");

    let (status, error) = register(&client, "ann@example.com", "abc").await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(error["field"], "password");
    assert_eq!(error["error"], "password must be at least 6 characters long");
}

#[tokio::test]
async fn wrong_password_is_unauthorized_without_details() {
    let client = client().await;
    register(&client, "ann@example.com", "secret1").await;

    let login = |email: &'static str, password: &'static str| {
        client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(json!({ "email": email, "password": password }).to_string())
            .dispatch()
    };

    let wrong_password = login("ann@example.com", "wrong-one").await;
    assert_eq!(wrong_password.status(), Status::Unauthorized);
    let wrong_password = body(wrong_password).await;

    let unknown_email = login("bob@example.com", "secret1").await;
    assert_eq!(unknown_email.status(), Status::Unauthorized);
    let unknown_email = body(unknown_email).await;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["field"], Value::Null);

    let ok = login("ann@example.com", "secret1").await;
    assert_eq!(ok.status(), Status::Ok);
    assert_eq!(body(ok).await["email"], "ann@example.com");
}

#[tokio::test]
async fn scan_clamps_and_redeem_resets() {
    let client = client().await;
    let (_, user) = register(&client, "ann@example.com", "secret1").await;
    let id = user["id"].as_i64().unwrap();

    for expected in 1..=5 {
        let (status, card) = post(&client, format!("/api/users/{}/scan", id)).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(card, json!({ "id": id, "stamps": expected }));
    }
    let (_, card) = post(&client, format!("/api/users/{}/scan", id)).await;
    assert_eq!(card["stamps"], 5);

    let (status, card) = post(&client, format!("/api/users/{}/redeem", id)).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(card, json!({ "id": id, "stamps": 0 }));

    let (_, card) = post(&client, format!("/api/users/{}/redeem", id)).await;
    assert_eq!(card["stamps"], 0);
}

#[tokio::test]
async fn get_user_and_missing_user() {
    let client = client().await;
    let (_, user) = register(&client, "ann@example.com", "secret1").await;
    let id = user["id"].as_i64().unwrap();

    let response = client.get(format!("/api/users/{}", id)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response).await, user);

    let response = client.get("/api/users/999").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await["code"], "USER_NOT_FOUND");

    let (status, error) = post(&client, "/api/users/999/scan".to_owned()).await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(error["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn update_keeps_blank_fields() {
    let client = client().await;
    let (_, user) = register(&client, "ann@example.com", "secret1").await;
    let id = user["id"].as_i64().unwrap();

    let response = client
        .put(format!("/api/users/{}", id))
        .header(ContentType::JSON)
        .body(json!({ "name": "Annie", "email": "", "password": "" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated = body(response).await;
    assert_eq!(updated["name"], "Annie");
    assert_eq!(updated["email"], "ann@example.com");
    assert_eq!(updated["stamps"], 0);

    let response = client
        .post("/api/login")
        .header(ContentType::JSON)
        .body(json!({ "email": "ann@example.com", "password": "secret1" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn update_to_taken_email_is_a_bad_request() {
    let client = client().await;
    register(&client, "ann@example.com", "secret1").await;
    let (_, bob) = register(&client, "bob@example.com", "secret1").await;

    let response = client
        .put(format!("/api/users/{}", bob["id"]))
        .header(ContentType::JSON)
        .body(json!({ "email": "ann@example.com" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn stamp_requests_are_throttled() {
    let client = client_with_limit(2).await;
    let (_, user) = register(&client, "ann@example.com", "secret1").await;
    let id = user["id"].as_i64().unwrap();

    post(&client, format!("/api/users/{}/scan", id)).await;
    post(&client, format!("/api/users/{}/scan", id)).await;
    let (status, error) = post(&client, format!("/api/users/{}/redeem", id)).await;
    assert_eq!(status, Status::TooManyRequests);
    assert_eq!(error["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn unknown_routes_and_bad_bodies_get_json_errors() {
    let client = client().await;
    let response = client.get("/api/nope").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await["code"], "NOT_FOUND");

    let response = client
        .post("/api/register")
        .header(ContentType::JSON)
        .body("{not json")
        .dispatch()
        .await;
    assert!(response.status().code >= 400 && response.status().code < 500);
    assert_eq!(body(response).await["code"], "MALFORMED_REQUEST");
}

#[tokio::test]
async fn cors_headers_and_preflight() {
    let client = client().await;
    let response = client.options("/api/register").dispatch().await;
    assert_eq!(response.status(), Status::NoContent);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    assert_eq!(
        response.into_string().await.as_deref(),
        Some("DigiStamp backend is running")
    );
}

#[tokio::test]
async fn openapi_document_is_served() {
    let client = client().await;
    let response = client.get("/api/openapi.json").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let document = body(response).await;
    let paths = document["paths"].as_object().unwrap();
    assert!(paths.keys().any(|path| path.ends_with("/register")));
    assert!(paths.keys().any(|path| path.ends_with("/scan")));
}
