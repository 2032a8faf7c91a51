use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    db::languages::{
        delete_language, get_language_by_id, insert_language, list_languages, rename_language,
    },
    error::Error,
    model::{Language, NameInput},
    state::SharedAppState,
};

use super::{Message, UrlPath, required_name};

#[tracing::instrument(name = "[GET] languages", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<Language>>, Error> {
    let result = list_languages(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] languages/{id}", skip_all, fields(path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Language>, Error> {
    let result = get_language_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] languages", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    axum::extract::Json(input): axum::extract::Json<NameInput>,
) -> Result<(StatusCode, Json<Language>), Error> {
    input.validate().map_err(Error::Validation)?;
    let name = required_name(&input.name)?;

    let result = insert_language(&app_state.pool, &name).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] languages/{id}", skip_all, fields(path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(input): axum::extract::Json<NameInput>,
) -> Result<Json<Language>, Error> {
    input.validate().map_err(Error::Validation)?;
    let name = required_name(&input.name)?;

    let result = rename_language(&app_state.pool, path.id, &name).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] languages/{id}", skip_all, fields(path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Message>, Error> {
    delete_language(&app_state.pool, path.id).await?;

    Ok(Json(Message::new("Language deleted")))
}
