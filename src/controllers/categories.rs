use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    db::categories::{
        delete_category, get_category_by_id, insert_category, list_categories, rename_category,
    },
    error::Error,
    model::{Category, NameInput},
    query::{BookSort, FilterCriteria},
    services::books::{BooksPage, books_page},
    state::SharedAppState,
};

use super::{Message, PageQuery, UrlPath, required_name};

#[tracing::instrument(name = "[GET] categories", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<Category>>, Error> {
    let result = list_categories(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] categories/{id}", skip_all, fields(path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Category>, Error> {
    let result = get_category_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] categories/{id}/books", skip_all, fields(path.id))]
pub async fn books(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Query(query): Query<PageQuery>,
) -> Result<Json<BooksPage>, Error> {
    query.validate().map_err(Error::Validation)?;

    let category = get_category_by_id(&app_state.pool, path.id).await?;
    let result = books_page(
        &app_state.pool,
        FilterCriteria::default().with_category(category.name),
        query.page(),
        query.per_page(app_state.config.application.page_size),
        BookSort::Title,
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] categories", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    axum::extract::Json(input): axum::extract::Json<NameInput>,
) -> Result<(StatusCode, Json<Category>), Error> {
    input.validate().map_err(Error::Validation)?;
    let name = required_name(&input.name)?;

    let result = insert_category(&app_state.pool, &name).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] categories/{id}", skip_all, fields(path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(input): axum::extract::Json<NameInput>,
) -> Result<Json<Category>, Error> {
    input.validate().map_err(Error::Validation)?;
    let name = required_name(&input.name)?;

    let result = rename_category(&app_state.pool, path.id, &name).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] categories/{id}", skip_all, fields(path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Message>, Error> {
    delete_category(&app_state.pool, path.id).await?;

    Ok(Json(Message::new("Category deleted")))
}
