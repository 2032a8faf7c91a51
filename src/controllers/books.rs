use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use validator::Validate;

use crate::{
    db::{
        books::{
            delete_book, get_book_by_id, get_book_by_title, get_books_by_author_name, insert_book,
            update_book,
        },
        error::DatabaseError,
    },
    error::Error,
    model::{Book, BookChanges, BookDetail, NewBook},
    query::{BookSort, FilterCriteria},
    services::books::{BooksPage, books_page},
    state::SharedAppState,
};

use super::{Message, UrlPath};

#[derive(serde::Deserialize, serde::Serialize, Debug, Default, Validate)]
pub struct BooksQuery {
    #[validate(length(max = 200))]
    search: Option<String>,

    #[validate(length(max = 200))]
    category: Option<String>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    language_id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    author_id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    include_collection_id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    exclude_collection_id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1))]
    page: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, max = 100))]
    per_page: Option<i64>,

    sort: Option<String>,
}

impl From<&BooksQuery> for FilterCriteria {
    fn from(query: &BooksQuery) -> Self {
        FilterCriteria {
            search: query.search.clone(),
            category: query.category.clone(),
            language_id: query.language_id,
            author_id: query.author_id,
            include_collection_id: query.include_collection_id,
            exclude_collection_id: query.exclude_collection_id,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct AuthorQuery {
    #[serde(default)]
    author: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct TitlePath {
    title: String,
}

#[tracing::instrument(name = "[GET] books", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<BooksQuery>,
) -> Result<Json<BooksPage>, Error> {
    query.validate().map_err(Error::Validation)?;

    let sort = query.sort.as_deref().map(BookSort::from).unwrap_or_default();
    let result = books_page(
        &app_state.pool,
        FilterCriteria::from(&query),
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(app_state.config.application.page_size),
        sort,
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] books/{id}", skip_all, fields(path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<BookDetail>, Error> {
    let result = get_book_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] books/title/{title}", skip_all)]
pub async fn show_by_title(
    State(app_state): State<SharedAppState>,
    Path(path): Path<TitlePath>,
) -> Result<Json<Book>, Error> {
    let result = get_book_by_title(&app_state.pool, &path.title).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] books/by-author", skip_all)]
pub async fn by_author(
    State(app_state): State<SharedAppState>,
    Query(query): Query<AuthorQuery>,
) -> Result<Json<Vec<Book>>, Error> {
    if query.author.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "Author name is required".to_string(),
        ));
    }

    let result = get_books_by_author_name(&app_state.pool, &query.author).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] books", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    axum::extract::Json(book): axum::extract::Json<NewBook>,
) -> Result<(StatusCode, Json<BookDetail>), Error> {
    book.validate().map_err(Error::Validation)?;

    let mut tx = app_state
        .pool
        .begin()
        .await
        .map_err(DatabaseError::DatabaseError)?;
    let book_id = insert_book(&mut tx, &book).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let result = get_book_by_id(&app_state.pool, book_id).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] books/{id}", skip_all, fields(path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(changes): axum::extract::Json<BookChanges>,
) -> Result<Json<BookDetail>, Error> {
    changes.validate().map_err(Error::Validation)?;

    let mut tx = app_state
        .pool
        .begin()
        .await
        .map_err(DatabaseError::DatabaseError)?;
    update_book(&mut tx, path.id, &changes).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let result = get_book_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] books/{id}", skip_all, fields(path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Message>, Error> {
    delete_book(&app_state.pool, path.id).await?;

    Ok(Json(Message::new("Book deleted")))
}
