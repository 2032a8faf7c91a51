use axum::http::StatusCode;
use book_catalog::model::Statistics;
use serde_json::json;

use crate::{AppStateTest, FakeBook, body_json, delete, get, insert_fake_book, json_request};

#[tokio::test]
async fn statistics_should_be_cached_until_a_write_succeeds() {
    let mut test_state = AppStateTest::new(true).await;

    insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            cover_id: Some(7),
            ..Default::default()
        },
    )
    .await;

    let response = test_state.generate_response(get("/api/statistics")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let statistics: Statistics = body_json(response).await;
    assert_eq!(statistics.total_books, 1);
    assert_eq!(statistics.books_with_covers, 1);
    assert!(test_state.app_state.statistics.cached().await.is_some());

    // Written behind the router's back, so the cached value stays stale.
    insert_fake_book(&test_state.app_state.pool, FakeBook::default()).await;

    let statistics: Statistics =
        body_json(test_state.generate_response(get("/api/statistics")).await).await;
    assert_eq!(statistics.total_books, 1);

    let response = test_state
        .generate_response(json_request("POST", "/api/categories", json!({ "name": "Travel" })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(test_state.app_state.statistics.cached().await.is_none());

    let statistics: Statistics =
        body_json(test_state.generate_response(get("/api/statistics")).await).await;
    assert_eq!(statistics.total_books, 2);
    assert_eq!(statistics.total_categories, 1);
    assert_eq!(statistics.missing_covers, 1);

    test_state.cleanup().await;
}

#[tokio::test]
async fn failed_write_should_keep_statistics_cached() {
    let mut test_state = AppStateTest::new(true).await;

    let response = test_state.generate_response(get("/api/statistics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(test_state.app_state.statistics.cached().await.is_some());

    let response = test_state
        .generate_response(json_request("POST", "/api/categories", json!({ "name": "" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(test_state.app_state.statistics.cached().await.is_some());

    let response = test_state.generate_response(delete("/api/books/999999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(test_state.app_state.statistics.cached().await.is_some());

    test_state.cleanup().await;
}
