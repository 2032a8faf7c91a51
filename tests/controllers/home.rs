use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::Value;

use crate::{AppStateTest, FakeBook, body_json, get, insert_fake_book, insert_fake_books};

#[tokio::test]
async fn health_check_should_be_ok() {
    let mut test_state = AppStateTest::new(false).await;

    let response = test_state.generate_response(get("/health_check")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let response_body = response.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(&response_body[..], b"Alive");

    test_state.cleanup().await;
}

#[tokio::test]
async fn home_should_split_books_into_sections() {
    let mut test_state = AppStateTest::new(true).await;

    insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            authors: &["Octavia Butler"],
            categories: &["Fiction"],
            ..Default::default()
        },
    )
    .await;
    insert_fake_books(&test_state.app_state.pool, 15).await;

    let response = test_state.generate_response(get("/api/home")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let home: Value = body_json(response).await;
    assert_eq!(home["featured"].as_array().unwrap().len(), 6);
    assert_eq!(home["popular"].as_array().unwrap().len(), 8);
    assert_eq!(home["latest"].as_array().unwrap().len(), 8);
    assert_eq!(home["special"].as_array().unwrap().len(), 5);
    assert_eq!(home["books_by_category"]["all"].as_array().unwrap().len(), 16);
    assert_eq!(home["books_by_category"]["fiction"].as_array().unwrap().len(), 1);
    assert_eq!(home["authors"].as_array().unwrap().len(), 1);
    assert_eq!(home["authors"][0]["name"], "octavia butler");
    assert_eq!(home["authors"][0]["book_count"], 1);
    assert_eq!(home["stats"]["total_books"], 16);

    test_state.cleanup().await;
}

#[tokio::test]
async fn home_should_be_ok_with_empty_catalog() {
    let mut test_state = AppStateTest::new(true).await;

    let response = test_state.generate_response(get("/api/home")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let home: Value = body_json(response).await;
    assert!(home["featured"].as_array().unwrap().is_empty());
    assert!(home["books_by_category"]["all"].as_array().unwrap().is_empty());
    assert!(home["authors"].as_array().unwrap().is_empty());
    assert_eq!(home["stats"]["total_books"], 0);

    test_state.cleanup().await;
}
