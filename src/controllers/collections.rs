use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use validator::Validate;

use crate::{
    db::{
        books::{book_exists, fetch_books},
        collections::{
            add_book, collection_exists, create_collection, delete_collection,
            get_collection_by_id, list_collections, remove_book, update_collection,
        },
        error::DatabaseError,
        users::user_exists,
    },
    error::Error,
    model::{BookRef, BookSummary, Collection, CollectionChanges, NewCollection},
    query::{BookSort, FilterCriteria, PageRequest},
    services::books::{BooksPage, books_page},
    state::SharedAppState,
};

use super::{MemberPath, Message, PageQuery, UrlPath};

const AVAILABLE_PAGE_SIZE: i64 = 20;
const MIN_SEARCH_LENGTH: usize = 2;

#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
pub struct CollectionsQuery {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    user_id: Option<i64>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Default, Validate)]
pub struct AvailableQuery {
    #[serde(default)]
    q: String,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 0))]
    offset: Option<i64>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct AvailableBooks {
    pub books: Vec<BookSummary>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
pub struct CollectionMembership {
    pub collection_id: i64,
    pub book_id: i64,
    pub added: bool,
}

async fn ensure_collection(app_state: &SharedAppState, collection_id: i64) -> Result<(), Error> {
    if !collection_exists(&app_state.pool, collection_id).await? {
        return Err(Error::Database(DatabaseError::NotFound("Collection")));
    }

    Ok(())
}

#[tracing::instrument(name = "[GET] collections", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<CollectionsQuery>,
) -> Result<Json<Vec<Collection>>, Error> {
    let result = list_collections(&app_state.pool, query.user_id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] collections/{id}", skip_all, fields(path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Collection>, Error> {
    let result = get_collection_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] collections", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    axum::extract::Json(collection): axum::extract::Json<NewCollection>,
) -> Result<(StatusCode, Json<Collection>), Error> {
    collection.validate().map_err(Error::Validation)?;
    if collection.name.trim().is_empty() {
        return Err(Error::InvalidArgument("Name is required".to_string()));
    }
    if !user_exists(&app_state.pool, collection.user_id).await? {
        return Err(Error::Database(DatabaseError::NotFound("User")));
    }

    let result = create_collection(&app_state.pool, &collection).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] collections/{id}", skip_all, fields(path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(changes): axum::extract::Json<CollectionChanges>,
) -> Result<Json<Collection>, Error> {
    changes.validate().map_err(Error::Validation)?;
    if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(Error::InvalidArgument("Name is required".to_string()));
    }

    let result = update_collection(&app_state.pool, path.id, &changes).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] collections/{id}", skip_all, fields(path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Message>, Error> {
    delete_collection(&app_state.pool, path.id).await?;

    Ok(Json(Message::new("Collection deleted")))
}

#[tracing::instrument(name = "[GET] collections/{id}/books", skip_all, fields(path.id))]
pub async fn books(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Query(query): Query<PageQuery>,
) -> Result<Json<BooksPage>, Error> {
    query.validate().map_err(Error::Validation)?;
    ensure_collection(&app_state, path.id).await?;

    let result = books_page(
        &app_state.pool,
        FilterCriteria::default().in_collection(path.id),
        query.page(),
        query.per_page(app_state.config.application.page_size),
        BookSort::Title,
    )
    .await?;

    Ok(Json(result))
}

/// Books matching `q` that are not yet in the collection.
#[tracing::instrument(name = "[GET] collections/{id}/available", skip_all, fields(path.id))]
pub async fn available(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<AvailableBooks>, Error> {
    query.validate().map_err(Error::Validation)?;

    let search = query.q.trim();
    if search.chars().count() < MIN_SEARCH_LENGTH {
        return Err(Error::InvalidArgument(format!(
            "Search query must be at least {} characters",
            MIN_SEARCH_LENGTH
        )));
    }
    ensure_collection(&app_state, path.id).await?;

    let offset = query.offset.unwrap_or(0);
    let filters = FilterCriteria::default()
        .with_search(search)
        .not_in_collection(path.id);
    let books = fetch_books(
        &app_state.pool,
        &filters,
        PageRequest::bounded(AVAILABLE_PAGE_SIZE, offset),
        BookSort::Title,
    )
    .await?;

    Ok(Json(AvailableBooks {
        books,
        offset,
        limit: AVAILABLE_PAGE_SIZE,
    }))
}

#[tracing::instrument(name = "[POST] collections/{id}/books", skip_all, fields(path.id))]
pub async fn add(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(book): axum::extract::Json<BookRef>,
) -> Result<Json<CollectionMembership>, Error> {
    ensure_collection(&app_state, path.id).await?;
    if !book_exists(&app_state.pool, book.book_id).await? {
        return Err(Error::Database(DatabaseError::NotFound("Book")));
    }

    let added = add_book(&app_state.pool, path.id, book.book_id).await?;

    Ok(Json(CollectionMembership {
        collection_id: path.id,
        book_id: book.book_id,
        added,
    }))
}

#[tracing::instrument(name = "[DELETE] collections/{id}/books/{book_id}", skip_all, fields(path.id, path.book_id))]
pub async fn remove(
    State(app_state): State<SharedAppState>,
    Path(path): Path<MemberPath>,
) -> Result<Json<Message>, Error> {
    remove_book(&app_state.pool, path.id, path.book_id).await?;

    Ok(Json(Message::new("Book removed from collection")))
}
