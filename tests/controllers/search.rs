use axum::http::StatusCode;
use serde_json::Value;

use crate::{AppStateTest, FakeBook, body_json, get, insert_fake_book};

#[tokio::test]
async fn search_should_be_empty_without_query() {
    let mut test_state = AppStateTest::new(true).await;

    insert_fake_book(&test_state.app_state.pool, FakeBook::default()).await;

    let response = test_state.generate_response(get("/api/search?q=%20")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = body_json(response).await;
    assert!(body["books"].as_array().unwrap().is_empty());
    assert!(body["authors"].as_array().unwrap().is_empty());

    test_state.cleanup().await;
}

#[tokio::test]
async fn search_should_match_books_and_authors() {
    let mut test_state = AppStateTest::new(true).await;
    let pool = test_state.app_state.pool.clone();

    insert_fake_book(
        &pool,
        FakeBook {
            title: Some("The Dispossessed"),
            authors: &["Ursula Le Guin"],
            ..Default::default()
        },
    )
    .await;
    insert_fake_book(
        &pool,
        FakeBook {
            title: Some("A Wizard of Earthsea"),
            authors: &["Ursula Le Guin"],
            categories: &["Fantasy"],
            ..Default::default()
        },
    )
    .await;
    insert_fake_book(
        &pool,
        FakeBook {
            title: Some("Neuromancer"),
            authors: &["William Gibson"],
            ..Default::default()
        },
    )
    .await;

    let response = test_state.generate_response(get("/api/search?q=guin")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = body_json(response).await;
    assert_eq!(body["books"].as_array().unwrap().len(), 2);
    assert_eq!(body["authors"].as_array().unwrap().len(), 1);
    assert_eq!(body["authors"][0]["book_count"], 2);

    let response = test_state.generate_response(get("/api/search?q=FANTASY")).await;
    let body: Value = body_json(response).await;
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["books"][0]["title"], "a wizard of earthsea");
    assert!(body["authors"].as_array().unwrap().is_empty());

    test_state.cleanup().await;
}

#[tokio::test]
async fn search_should_order_authors_by_name() {
    let mut test_state = AppStateTest::new(true).await;
    let pool = test_state.app_state.pool.clone();

    insert_fake_book(
        &pool,
        FakeBook {
            authors: &["Zora Neale Hurston"],
            ..Default::default()
        },
    )
    .await;
    insert_fake_book(
        &pool,
        FakeBook {
            authors: &["Andre Norton"],
            ..Default::default()
        },
    )
    .await;

    let response = test_state.generate_response(get("/api/search?q=or")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = body_json(response).await;
    let names: Vec<&str> = body["authors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|author| author["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["andre norton", "zora neale hurston"]);

    test_state.cleanup().await;
}
