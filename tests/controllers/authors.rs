use axum::http::StatusCode;
use book_catalog::model::{Author, AuthorWithBooks};
use serde_json::{Value, json};

use crate::{AppStateTest, FakeBook, body_json, delete, get, insert_fake_book, json_request};

async fn create_author(test_state: &mut AppStateTest, name: &str) -> Author {
    let response = test_state
        .generate_response(json_request("POST", "/api/authors", json!({ "name": name })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await
}

#[tokio::test]
async fn store_should_reject_case_insensitive_duplicates() {
    let mut test_state = AppStateTest::new(true).await;

    let author = create_author(&mut test_state, "Octavia  Butler").await;
    assert_eq!(author.name, "octavia butler");

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/authors",
            json!({ "name": "OCTAVIA BUTLER" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = body_json(response).await;
    assert_eq!(body["conflicting_id"], author.id);

    test_state.cleanup().await;
}

#[tokio::test]
async fn update_should_report_conflicting_author() {
    let mut test_state = AppStateTest::new(true).await;

    let first = create_author(&mut test_state, "First Name").await;
    let second = create_author(&mut test_state, "Second Name").await;

    let response = test_state
        .generate_response(json_request(
            "PUT",
            &format!("/api/authors/{}", second.id),
            json!({ "name": "first name" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = body_json(response).await;
    assert_eq!(body["conflicting_id"], first.id);

    let response = test_state
        .generate_response(json_request(
            "PUT",
            &format!("/api/authors/{}", second.id),
            json!({ "name": "Renamed" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let author: Author = body_json(response).await;
    assert_eq!(author.name, "renamed");

    let response = test_state
        .generate_response(json_request(
            "PUT",
            "/api/authors/999999",
            json!({ "name": "Nobody" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_paginate_and_search() {
    let mut test_state = AppStateTest::new(true).await;

    for name in ["Carol", "alice", "Bob", "Alfred"] {
        create_author(&mut test_state, name).await;
    }

    let response = test_state
        .generate_response(get("/api/authors?per_page=2"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = body_json(response).await;
    assert_eq!(page["authors"][0]["name"], "alfred");
    assert_eq!(page["authors"][1]["name"], "alice");
    assert_eq!(page["pagination"]["total"], 4);
    assert_eq!(page["pagination"]["pages"], 2);

    let response = test_state
        .generate_response(get("/api/authors?search=AL"))
        .await;
    let page: Value = body_json(response).await;
    assert_eq!(page["authors"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["total"], 2);

    test_state.cleanup().await;
}

#[tokio::test]
async fn show_and_search_should_include_books() {
    let mut test_state = AppStateTest::new(true).await;

    insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            title: Some("Kindred"),
            authors: &["Octavia Butler"],
            ..Default::default()
        },
    )
    .await;

    let response = test_state
        .generate_response(get("/api/authors/search?name=butler"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let authors: Vec<AuthorWithBooks> = body_json(response).await;
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].book_count, 1);
    assert_eq!(authors[0].book_titles, vec!["kindred"]);

    let response = test_state
        .generate_response(get(&format!("/api/authors/{}", authors[0].id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let author: AuthorWithBooks = body_json(response).await;
    assert_eq!(author.name, "octavia butler");

    let response = test_state.generate_response(get("/api/authors/999999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}

#[tokio::test]
async fn search_should_require_name() {
    let mut test_state = AppStateTest::new(false).await;

    let response = test_state
        .generate_response(get("/api/authors/search?name="))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test_state.generate_response(get("/api/authors/search")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = body_json(response).await;
    assert_eq!(body["error"], "Name parameter is required");

    test_state.cleanup().await;
}

#[tokio::test]
async fn update_image_should_require_http_url() {
    let mut test_state = AppStateTest::new(true).await;

    let author = create_author(&mut test_state, "Pictured").await;
    let uri = format!("/api/authors/{}/image", author.id);

    let response = test_state
        .generate_response(json_request(
            "PUT",
            &uri,
            json!({ "image_url": "ftp://example.com/a.png" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test_state
        .generate_response(json_request(
            "PUT",
            &uri,
            json!({ "image_url": "https://example.com/a.png" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let author: Author = body_json(response).await;
    assert_eq!(author.image_url.as_deref(), Some("https://example.com/a.png"));

    test_state.cleanup().await;
}

#[tokio::test]
async fn book_links_should_be_idempotent() {
    let mut test_state = AppStateTest::new(true).await;

    let author = create_author(&mut test_state, "Linked").await;
    let book_id = insert_fake_book(&test_state.app_state.pool, FakeBook::default()).await;
    let uri = format!("/api/authors/{}/books", author.id);

    let response = test_state
        .generate_response(json_request("POST", &uri, json!({ "book_id": book_id })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["linked"], true);

    let response = test_state
        .generate_response(json_request("POST", &uri, json!({ "book_id": book_id })))
        .await;
    let body: Value = body_json(response).await;
    assert_eq!(body["linked"], false);

    let response = test_state
        .generate_response(json_request("POST", &uri, json!({ "book_id": book_id + 1000 })))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remove_uri = format!("/api/authors/{}/books/{}", author.id, book_id);
    let response = test_state.generate_response(delete(&remove_uri)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state.generate_response(delete(&remove_uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}

#[tokio::test]
async fn destroy_should_unlink_books() {
    let mut test_state = AppStateTest::new(true).await;

    let book_id = insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            authors: &["Removed Author", "Kept Author"],
            ..Default::default()
        },
    )
    .await;

    let response = test_state
        .generate_response(get("/api/authors/search?name=removed"))
        .await;
    let authors: Vec<AuthorWithBooks> = body_json(response).await;

    let response = test_state
        .generate_response(delete(&format!("/api/authors/{}", authors[0].id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(get(&format!("/api/books/{}", book_id)))
        .await;
    let book: Value = body_json(response).await;
    assert_eq!(book["authors"], json!(["kept author"]));

    test_state.cleanup().await;
}
