use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use validator::Validate;

use crate::{
    db::{
        authors::{
            author_exists, count_authors, delete_author, get_author_by_id, insert_author,
            link_book, list_authors, search_authors, unlink_book, update_author,
            update_author_image,
        },
        books::book_exists,
        error::DatabaseError,
    },
    error::Error,
    model::{Author, AuthorListItem, AuthorWithBooks, BookRef, ImageInput, NameInput},
    query::PaginationState,
    state::SharedAppState,
};

use super::{MemberPath, Message, UrlPath, required_name};

#[derive(serde::Deserialize, serde::Serialize, Debug, Default, Validate)]
pub struct AuthorsQuery {
    #[validate(length(max = 200))]
    search: Option<String>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1))]
    page: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, max = 100))]
    per_page: Option<i64>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct NameQuery {
    #[serde(default)]
    name: String,
}

#[derive(serde::Serialize, Debug)]
pub struct AuthorsPage {
    pub authors: Vec<AuthorListItem>,
    pub pagination: PaginationState,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
pub struct AuthorBookLink {
    pub author_id: i64,
    pub book_id: i64,
    pub linked: bool,
}

#[tracing::instrument(name = "[GET] authors", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<AuthorsQuery>,
) -> Result<Json<AuthorsPage>, Error> {
    query.validate().map_err(Error::Validation)?;

    let search = query.search.as_deref();
    let total = count_authors(&app_state.pool, search).await?;
    let pagination = PaginationState::new(
        query.page.unwrap_or(1),
        query
            .per_page
            .unwrap_or(app_state.config.application.page_size),
        total,
    )?;
    let authors = list_authors(&app_state.pool, search, pagination.page_request()).await?;

    Ok(Json(AuthorsPage {
        authors,
        pagination,
    }))
}

#[tracing::instrument(name = "[GET] authors/{id}", skip_all, fields(path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<AuthorWithBooks>, Error> {
    let result = get_author_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] authors/search", skip_all)]
pub async fn search(
    State(app_state): State<SharedAppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Vec<AuthorWithBooks>>, Error> {
    if query.name.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "Name parameter is required".to_string(),
        ));
    }

    let result = search_authors(&app_state.pool, &query.name).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] authors", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    axum::extract::Json(input): axum::extract::Json<NameInput>,
) -> Result<(StatusCode, Json<Author>), Error> {
    input.validate().map_err(Error::Validation)?;
    let name = required_name(&input.name)?;

    let result = insert_author(&app_state.pool, &name).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] authors/{id}", skip_all, fields(path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(input): axum::extract::Json<NameInput>,
) -> Result<Json<Author>, Error> {
    input.validate().map_err(Error::Validation)?;
    let name = required_name(&input.name)?;

    let result = update_author(&app_state.pool, path.id, &name).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[PUT] authors/{id}/image", skip_all, fields(path.id))]
pub async fn update_image(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(input): axum::extract::Json<ImageInput>,
) -> Result<Json<Author>, Error> {
    input.validate().map_err(Error::Validation)?;

    let image_url = input.image_url.trim();
    if !(image_url.starts_with("http://") || image_url.starts_with("https://")) {
        return Err(Error::InvalidArgument(
            "Image URL must start with http:// or https://".to_string(),
        ));
    }

    let result = update_author_image(&app_state.pool, path.id, image_url).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] authors/{id}", skip_all, fields(path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Message>, Error> {
    delete_author(&app_state.pool, path.id).await?;

    Ok(Json(Message::new("Author deleted")))
}

#[tracing::instrument(name = "[POST] authors/{id}/books", skip_all, fields(path.id))]
pub async fn add_book(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(book): axum::extract::Json<BookRef>,
) -> Result<Json<AuthorBookLink>, Error> {
    if !author_exists(&app_state.pool, path.id).await? {
        return Err(Error::Database(DatabaseError::NotFound("Author")));
    }
    if !book_exists(&app_state.pool, book.book_id).await? {
        return Err(Error::Database(DatabaseError::NotFound("Book")));
    }

    let linked = link_book(&app_state.pool, path.id, book.book_id).await?;

    Ok(Json(AuthorBookLink {
        author_id: path.id,
        book_id: book.book_id,
        linked,
    }))
}

#[tracing::instrument(name = "[DELETE] authors/{id}/books/{book_id}", skip_all, fields(path.id, path.book_id))]
pub async fn remove_book(
    State(app_state): State<SharedAppState>,
    Path(path): Path<MemberPath>,
) -> Result<Json<Message>, Error> {
    if !unlink_book(&app_state.pool, path.id, path.book_id).await? {
        return Err(Error::Database(DatabaseError::NotFound("Author book")));
    }

    Ok(Json(Message::new("Book removed from author")))
}
