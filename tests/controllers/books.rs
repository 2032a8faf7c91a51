use axum::http::StatusCode;
use book_catalog::model::{Book, BookDetail, BookSummary};
use serde_json::{Value, json};

use crate::{
    AppStateTest, FakeBook, body_json, delete, get, insert_fake_book, insert_fake_books,
    insert_fake_collection, insert_fake_user, json_request,
};

fn books_of(page: &Value) -> Vec<BookSummary> {
    serde_json::from_value(page["books"].clone()).unwrap()
}

#[tokio::test]
async fn index_should_be_ok_with_books_is_empty() {
    let mut test_state = AppStateTest::new(true).await;

    let response = test_state.generate_response(get("/api/books")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = body_json(response).await;
    assert!(books_of(&page).is_empty());
    assert_eq!(page["pagination"]["total"], 0);
    assert_eq!(page["pagination"]["pages"], 0);
    assert_eq!(page["pagination"]["has_next"], false);

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_return_one_row_per_book_with_all_associations() {
    let mut test_state = AppStateTest::new(true).await;

    insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            title: Some("Good Omens"),
            authors: &["Terry Pratchett", "Neil Gaiman", "Ghost Writer"],
            categories: &["Fantasy", "Comedy"],
            ..Default::default()
        },
    )
    .await;

    let response = test_state.generate_response(get("/api/books")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = body_json(response).await;
    let books = books_of(&page);
    assert_eq!(books.len(), 1);
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(books[0].title, "good omens");
    assert_eq!(
        books[0].authors,
        vec!["ghost writer", "neil gaiman", "terry pratchett"]
    );
    assert_eq!(books[0].categories, vec!["comedy", "fantasy"]);
    assert_eq!(page["categories"][0]["name"], "comedy");
    assert_eq!(page["categories"][1]["name"], "fantasy");
    assert!(page["languages"].as_array().unwrap().is_empty());

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_keep_count_and_rows_consistent_under_filters() {
    let mut test_state = AppStateTest::new(true).await;
    let pool = test_state.app_state.pool.clone();

    insert_fake_book(
        &pool,
        FakeBook {
            title: Some("Dune"),
            authors: &["Frank Herbert"],
            categories: &["science fiction", "classic"],
            ..Default::default()
        },
    )
    .await;
    insert_fake_book(
        &pool,
        FakeBook {
            title: Some("Children of Dune"),
            authors: &["Frank Herbert", "Brian Herbert"],
            categories: &["science fiction"],
            ..Default::default()
        },
    )
    .await;
    insert_fake_book(
        &pool,
        FakeBook {
            title: Some("Emma"),
            authors: &["Jane Austen"],
            categories: &["classic"],
            ..Default::default()
        },
    )
    .await;

    for (uri, expected) in [
        ("/api/books?search=dune", 2),
        ("/api/books?search=HERBERT", 2),
        ("/api/books?search=classic", 2),
        ("/api/books?category=classic", 2),
        ("/api/books?category=Classic", 0),
        ("/api/books?category=classic&search=emma", 1),
        ("/api/books?search=%25", 0),
    ] {
        let response = test_state.generate_response(get(uri)).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let page: Value = body_json(response).await;
        assert_eq!(books_of(&page).len(), expected, "{}", uri);
        assert_eq!(page["pagination"]["total"], expected, "{}", uri);
    }

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_filter_by_author_id_and_keep_co_authors() {
    let mut test_state = AppStateTest::new(true).await;
    let pool = test_state.app_state.pool.clone();

    insert_fake_book(
        &pool,
        FakeBook {
            authors: &["Anne Author", "Bob Coauthor"],
            ..Default::default()
        },
    )
    .await;
    insert_fake_book(
        &pool,
        FakeBook {
            authors: &["Bob Coauthor"],
            ..Default::default()
        },
    )
    .await;

    let anne_id: i64 = sqlx::query_scalar("SELECT id FROM authors WHERE name = 'anne author'")
        .fetch_one(&pool)
        .await
        .unwrap();

    let response = test_state
        .generate_response(get(&format!("/api/books?author_id={}", anne_id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = body_json(response).await;
    let books = books_of(&page);
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].authors, vec!["anne author", "bob coauthor"]);
    assert_eq!(page["current_filters"]["author_id"], anne_id);

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_filter_by_collection_membership() {
    let mut test_state = AppStateTest::new(true).await;
    let pool = test_state.app_state.pool.clone();

    let book_ids = insert_fake_books(&pool, 5).await;
    let user_id = insert_fake_user(&pool).await;
    let collection_id = insert_fake_collection(&pool, user_id, &book_ids[..2]).await;

    let response = test_state
        .generate_response(get(&format!(
            "/api/books?include_collection_id={}",
            collection_id
        )))
        .await;
    let page: Value = body_json(response).await;
    let mut included: Vec<i64> = books_of(&page).iter().map(|b| b.id).collect();
    included.sort();
    assert_eq!(included, book_ids[..2].to_vec());

    let response = test_state
        .generate_response(get(&format!(
            "/api/books?exclude_collection_id={}",
            collection_id
        )))
        .await;
    let page: Value = body_json(response).await;
    let mut excluded: Vec<i64> = books_of(&page).iter().map(|b| b.id).collect();
    excluded.sort();
    assert_eq!(excluded, book_ids[2..].to_vec());

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_paginate() {
    let mut test_state = AppStateTest::new(true).await;

    insert_fake_books(&test_state.app_state.pool, 5).await;

    let response = test_state
        .generate_response(get("/api/books?page=3&per_page=2&sort=id"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = body_json(response).await;
    assert_eq!(books_of(&page).len(), 1);
    assert_eq!(page["pagination"]["total"], 5);
    assert_eq!(page["pagination"]["pages"], 3);
    assert_eq!(page["pagination"]["has_prev"], true);
    assert_eq!(page["pagination"]["has_next"], false);
    assert_eq!(page["pagination"]["prev_num"], 2);
    assert_eq!(page["pagination"]["next_num"], Value::Null);

    let response = test_state
        .generate_response(get("/api/books?page=9&per_page=2"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = body_json(response).await;
    assert!(books_of(&page).is_empty());
    assert_eq!(page["pagination"]["total"], 5);

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_order_by_id_when_requested() {
    let mut test_state = AppStateTest::new(true).await;
    let pool = test_state.app_state.pool.clone();

    let zeta = insert_fake_book(
        &pool,
        FakeBook {
            title: Some("Zeta"),
            ..Default::default()
        },
    )
    .await;
    let alpha = insert_fake_book(
        &pool,
        FakeBook {
            title: Some("Alpha"),
            ..Default::default()
        },
    )
    .await;

    let page: Value = body_json(test_state.generate_response(get("/api/books")).await).await;
    let ids: Vec<i64> = books_of(&page).iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![alpha, zeta]);

    let page: Value =
        body_json(test_state.generate_response(get("/api/books?sort=id")).await).await;
    let ids: Vec<i64> = books_of(&page).iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![zeta, alpha]);

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_reject_invalid_page_size() {
    let mut test_state = AppStateTest::new(true).await;

    for uri in ["/api/books?per_page=0", "/api/books?per_page=-3", "/api/books?page=0"] {
        let response = test_state.generate_response(get(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body: Value = body_json(response).await;
        assert!(body["error"].is_string());
    }

    test_state.cleanup().await;
}

#[tokio::test]
async fn show_should_return_details_or_not_found() {
    let mut test_state = AppStateTest::new(true).await;

    let book_id = insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            languages: &["English", "French"],
            ..Default::default()
        },
    )
    .await;

    let response = test_state
        .generate_response(get(&format!("/api/books/{}", book_id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let book: BookDetail = body_json(response).await;
    assert_eq!(book.id, book_id);
    assert_eq!(book.languages, vec!["english", "french"]);

    let response = test_state
        .generate_response(get(&format!("/api/books/{}", book_id + 1000)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = body_json(response).await;
    assert_eq!(body["error"], "Book not found");

    test_state.cleanup().await;
}

#[tokio::test]
async fn store_should_create_book_and_reject_duplicates() {
    let mut test_state = AppStateTest::new(true).await;

    let payload = json!({
        "title": "  The Hobbit ",
        "publication_year": 1937,
        "cover_id": 42,
        "authors": ["J. R. R. Tolkien", "j. r. r. tolkien"],
        "categories": ["Fantasy"],
        "languages": ["English"]
    });

    let response = test_state
        .generate_response(json_request("POST", "/api/books", payload.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let book: BookDetail = body_json(response).await;
    assert_eq!(book.title, "the hobbit");
    assert_eq!(book.publication_year, Some(1937));
    assert_eq!(book.authors, vec!["j. r. r. tolkien"]);

    let response = test_state
        .generate_response(json_request("POST", "/api/books", payload))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = body_json(response).await;
    assert_eq!(body["conflicting_id"], book.id);

    test_state.cleanup().await;
}

#[tokio::test]
async fn store_should_validate_payload() {
    let mut test_state = AppStateTest::new(true).await;

    let response = test_state
        .generate_response(json_request("POST", "/api/books", json!({ "title": "" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test_state
        .generate_response(json_request("POST", "/api/books", json!({ "title": "   " })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    test_state.cleanup().await;
}

#[tokio::test]
async fn update_should_replace_present_association_sets() {
    let mut test_state = AppStateTest::new(true).await;

    let book_id = insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            authors: &["Old Author"],
            categories: &["Kept"],
            ..Default::default()
        },
    )
    .await;

    let response = test_state
        .generate_response(json_request(
            "PUT",
            &format!("/api/books/{}", book_id),
            json!({ "publication_year": 2001, "authors": ["New Author"] }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let book: BookDetail = body_json(response).await;
    assert_eq!(book.publication_year, Some(2001));
    assert_eq!(book.authors, vec!["new author"]);
    assert_eq!(book.categories, vec!["kept"]);

    let response = test_state
        .generate_response(json_request(
            "PUT",
            "/api/books/999999",
            json!({ "publication_year": 2001 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}

#[tokio::test]
async fn destroy_should_delete_once() {
    let mut test_state = AppStateTest::new(true).await;

    let book_id = insert_fake_book(&test_state.app_state.pool, FakeBook::default()).await;
    let uri = format!("/api/books/{}", book_id);

    let response = test_state.generate_response(delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state.generate_response(delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}

#[tokio::test]
async fn by_author_should_return_newest_first() {
    let mut test_state = AppStateTest::new(true).await;
    let pool = test_state.app_state.pool.clone();

    for (title, year) in [("Early", Some(1990)), ("Undated", None), ("Late", Some(2010))] {
        insert_fake_book(
            &pool,
            FakeBook {
                title: Some(title),
                publication_year: year,
                authors: &["Ursula K. Le Guin"],
                ..Default::default()
            },
        )
        .await;
    }

    let response = test_state
        .generate_response(get("/api/books/by-author?author=Ursula%20K.%20Le%20Guin"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let books: Vec<Book> = body_json(response).await;
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["late", "early", "undated"]);

    let response = test_state
        .generate_response(get("/api/books/by-author?author="))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    test_state.cleanup().await;
}

#[tokio::test]
async fn show_by_title_should_match_normalised_title() {
    let mut test_state = AppStateTest::new(true).await;

    let book_id = insert_fake_book(
        &test_state.app_state.pool,
        FakeBook {
            title: Some("War and Peace"),
            ..Default::default()
        },
    )
    .await;

    let response = test_state
        .generate_response(get("/api/books/title/WAR%20AND%20PEACE"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let book: Book = body_json(response).await;
    assert_eq!(book.id, book_id);

    let response = test_state
        .generate_response(get("/api/books/title/missing"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}
