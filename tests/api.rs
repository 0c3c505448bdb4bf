use std::{fs::File, net::SocketAddr};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use carshare::{
    auth,
    config::AppConfig,
    db::{init_pool, DbPool},
    models::car::{Car, CarInput},
    routes::create_router,
    state::AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    db: DbPool,
    _root: TempDir,
}

async fn spawn_app() -> TestApp {
    let root = TempDir::new().expect("temp dir");
    let db_path = root.path().join("api.sqlite");
    File::create(&db_path).expect("db file");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy());

    let config = AppConfig {
        database_url: database_url.clone(),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cors_origin: "http://localhost:8000".into(),
    };

    let db = init_pool(&database_url).await.expect("pool");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("migrations");

    let state = AppState::new(config, db.clone());
    TestApp {
        router: create_router(state),
        db,
        _root: root,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, body.to_vec())
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request body")
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request body")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request body")
}

async fn seed_car(app: &TestApp, size: &str, fuel: &str, door: i64, transmission: &str) -> Car {
    let input = CarInput {
        size: size.into(),
        fuel: fuel.into(),
        door,
        transmission: transmission.into(),
    };
    Car::create(&app.db, &input).await.expect("seed car")
}

#[tokio::test]
async fn listing_cars_returns_their_fields() {
    let app = spawn_app().await;
    seed_car(&app, "m", "electric", 4, "auto").await;
    seed_car(&app, "s", "petrol", 2, "manual").await;

    let (status, body) = send(&app, get_request("/api/cars/")).await;
    assert_eq!(status, StatusCode::OK);
    let cars: Value = serde_json::from_slice(&body).expect("json body");
    let cars = cars.as_array().expect("array body");
    assert_eq!(cars.len(), 2);
    assert!(cars.iter().all(|car| car.get("door").is_some()));
    assert!(cars.iter().all(|car| car.get("size").is_some()));
}

#[tokio::test]
async fn list_filters_intersect() {
    let app = spawn_app().await;
    seed_car(&app, "s", "petrol", 2, "manual").await;
    seed_car(&app, "m", "electric", 4, "auto").await;
    seed_car(&app, "m", "hybrid", 5, "auto").await;

    let (status, body) = send(&app, get_request("/api/cars/?size=m&door=5")).await;
    assert_eq!(status, StatusCode::OK);
    let cars: Value = serde_json::from_slice(&body).expect("json body");
    let cars = cars.as_array().expect("array body");
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["size"], "m");
    assert_eq!(cars[0]["door"], 5);
}

#[tokio::test]
async fn creating_a_car_requires_a_valid_bearer_token() {
    let app = spawn_app().await;
    let input = json!({ "size": "m", "door": 4 });

    let (status, _) = send(&app, json_request("POST", "/api/cars/", None, &input)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/cars/", Some("ghost"), &input),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_car_round_trips_with_defaults() {
    let app = spawn_app().await;
    auth::create_user(&app.db, "alice", "correctpass")
        .await
        .expect("seed user");

    let input = json!({ "size": "m", "door": 4 });
    let (status, body) = send(
        &app,
        json_request("POST", "/api/cars/", Some("alice"), &input),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created: Value = serde_json::from_slice(&body).expect("json body");
    let id = created["id"].as_i64().expect("generated id");

    let (status, body) = send(&app, get_request(&format!("/api/cars/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(fetched["size"], "m");
    assert_eq!(fetched["door"], 4);
    assert_eq!(fetched["fuel"], "electric");
    assert_eq!(fetched["transmission"], "auto");
    assert_eq!(fetched["trips"], json!([]));
}

#[tokio::test]
async fn updating_a_car_replaces_fields_in_place() {
    let app = spawn_app().await;
    let car = seed_car(&app, "s", "petrol", 2, "manual").await;

    let input = json!({ "size": "l", "fuel": "hybrid", "door": 5, "transmission": "auto" });
    let (status, body) = send(
        &app,
        json_request("PUT", &format!("/api/cars/{}", car.id), None, &input),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(updated["id"], car.id);
    assert_eq!(updated["size"], "l");
    assert_eq!(updated["fuel"], "hybrid");
    assert_eq!(updated["door"], 5);
    assert_eq!(updated["transmission"], "auto");

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/cars/9999", None, &input),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_car_then_fetching_it_fails() {
    let app = spawn_app().await;
    let car = seed_car(&app, "m", "electric", 4, "auto").await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/cars/{}", car.id))
        .body(Body::empty())
        .expect("request body");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get_request(&format!("/api/cars/{}", car.id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/cars/{}", car.id))
        .body(Body::empty())
        .expect("request body");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trip_car_id_comes_from_the_path() {
    let app = spawn_app().await;
    let car = seed_car(&app, "m", "electric", 4, "auto").await;

    // A car_id smuggled into the body is ignored.
    let input = json!({ "start": 5, "end": 6, "description": "miles", "car_id": 9999 });
    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/cars/{}/trips", car.id), None, &input),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let trip: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(trip["car_id"], car.id);
    assert_eq!(trip["start"], 5);
    assert_eq!(trip["end"], 6);
    assert_eq!(trip["description"], "miles");

    let (status, body) = send(&app, get_request(&format!("/api/cars/{}", car.id))).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(fetched["trips"].as_array().expect("trips array").len(), 1);
    assert_eq!(fetched["trips"][0]["description"], "miles");

    let (status, _) = send(
        &app,
        json_request("POST", "/api/cars/9999/trips", None, &input),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_issues_the_username_as_bearer_token() {
    let app = spawn_app().await;
    auth::create_user(&app.db, "alice", "correctpass")
        .await
        .expect("seed user");

    let (status, body) = send(
        &app,
        form_request("/auth/token", "username=alice&password=correctpass"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(token["access_token"], "alice");
    assert_eq!(token["token_type"], "bearer");

    let (status, _) = send(
        &app,
        form_request("/auth/token", "username=alice&password=wrongpass"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        form_request("/auth/token", "username=ghost&password=whatever"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn web_pages_render() {
    let app = spawn_app().await;
    seed_car(&app, "m", "electric", 4, "auto").await;

    let (status, body) = send(&app, get_request("/")).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).expect("utf8 body");
    assert!(html.contains("<form"));

    let (status, body) = send(&app, form_request("/search", "size=m&doors=4")).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).expect("utf8 body");
    assert!(html.contains("Matching cars"));
    assert!(html.contains("electric"));
}
