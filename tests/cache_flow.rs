use std::sync::Arc;

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
    routing::get,
};
use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;
use tower::ServiceExt;

use account_server::{
    db::entities::{user, user_info, user_permission},
    middleware::response_cache_middleware,
    test_helpers::{test_router, test_state},
};

fn user_model(id: i32, username: &str) -> user::Model {
    user::Model {
        id,
        username: Some(username.to_string()),
        enable: true,
        password: Some("$x".to_string()),
        token: "d".repeat(20),
        created_by: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn info_model(id: i32, name: &str) -> user_info::Model {
    user_info::Model {
        id,
        name: Some(name.to_string()),
        address: None,
        expert_id: None,
        phone_number: Some("0912345678".to_string()),
        avatar_url: None,
        city: None,
        is_deleted: false,
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should buffer");
    serde_json::from_slice(&bytes).expect("body should be json")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

#[tokio::test]
async fn second_get_is_served_from_the_cache() {
    // Mock results for exactly one listing; a second trip to storage
    // would fail the test.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(1, "alice")]])
        .append_query_results([vec![info_model(1, "Alice")]])
        .append_query_results([Vec::<user_permission::Model>::new()])
        .into_connection();
    let app = test_router(db, &["/user"]);

    let first = app
        .clone()
        .oneshot(get_request("/user"))
        .await
        .expect("request should complete");
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = json_body(first).await;

    let second = app
        .oneshot(get_request("/user"))
        .await
        .expect("request should complete");
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        second
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let second_body = json_body(second).await;

    assert_eq!(first_body, second_body);
    assert_eq!(second_body[0]["username"], "alice");
}

#[tokio::test]
async fn query_strings_key_separate_entries() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(1, "alice")]])
        .append_query_results([vec![info_model(1, "Alice")]])
        .append_query_results([Vec::<user_permission::Model>::new()])
        .append_query_results([vec![user_model(2, "bob")]])
        .append_query_results([vec![info_model(2, "Bob")]])
        .append_query_results([Vec::<user_permission::Model>::new()])
        .into_connection();
    let app = test_router(db, &["/user"]);

    let first = json_body(
        app.clone()
            .oneshot(get_request("/user?name=Ali"))
            .await
            .expect("request should complete"),
    )
    .await;
    let second = json_body(
        app.oneshot(get_request("/user?name=Bob"))
            .await
            .expect("request should complete"),
    )
    .await;

    assert_eq!(first[0]["username"], "alice");
    assert_eq!(second[0]["username"], "bob");
}

#[tokio::test]
async fn any_write_invalidates_the_cache() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // first listing
        .append_query_results([vec![user_model(1, "alice")]])
        .append_query_results([vec![info_model(1, "Alice")]])
        .append_query_results([Vec::<user_permission::Model>::new()])
        // listing after invalidation
        .append_query_results([vec![user_model(2, "bob")]])
        .append_query_results([vec![info_model(2, "Bob")]])
        .append_query_results([Vec::<user_permission::Model>::new()])
        .into_connection();
    let app = test_router(db, &["/user"]);

    let before = json_body(
        app.clone()
            .oneshot(get_request("/user"))
            .await
            .expect("request should complete"),
    )
    .await;
    assert_eq!(before[0]["username"], "alice");

    // The write itself fails validation, but it still clears the cache.
    let write = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/user")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({}).to_string()))
                .expect("request should build"),
        )
        .await
        .expect("request should complete");
    assert_eq!(write.status(), StatusCode::BAD_REQUEST);

    let after = json_body(
        app.oneshot(get_request("/user"))
            .await
            .expect("request should complete"),
    )
    .await;
    assert_eq!(after[0]["username"], "bob");
}

#[tokio::test]
async fn non_allow_listed_paths_bypass_the_cache() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(3, "bob")]])
        .append_query_results([vec![info_model(3, "Bob")]])
        .append_query_results([Vec::<user_permission::Model>::new()])
        .append_query_results([vec![user_model(3, "bob")]])
        .append_query_results([vec![info_model(3, "Bob")]])
        .append_query_results([Vec::<user_permission::Model>::new()])
        .into_connection();
    // Allow-list covers a different path, so /user/3 always hits storage.
    let app = test_router(db, &["/user"]);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_request("/user/3"))
            .await
            .expect("request should complete");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["id"], 3);
    }
}

#[tokio::test]
async fn empty_cacheable_bodies_become_an_empty_array() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = test_state(db, &["/empty"]);
    let app = Router::new()
        .route("/empty", get(|| async { StatusCode::OK }))
        .layer(from_fn_with_state(
            Arc::clone(&state),
            response_cache_middleware,
        ))
        .with_state(state);

    let response = app
        .oneshot(get_request("/empty"))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should buffer");
    assert_eq!(&bytes[..], b"[]");
}
