use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    db::users::{create_user, delete_user, get_user_by_id, list_users, update_user},
    error::Error,
    model::{NewUser, User, UserChanges, UserWithCollections},
    state::SharedAppState,
};

use super::{Message, UrlPath};

fn require_username(username: &str) -> Result<(), Error> {
    if username.trim().is_empty() {
        return Err(Error::InvalidArgument("Username is required".to_string()));
    }

    Ok(())
}

#[tracing::instrument(name = "[GET] users", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<UserWithCollections>>, Error> {
    let result = list_users(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] users/{id}", skip_all, fields(path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<User>, Error> {
    let result = get_user_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] users", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    axum::extract::Json(user): axum::extract::Json<NewUser>,
) -> Result<(StatusCode, Json<User>), Error> {
    user.validate().map_err(Error::Validation)?;
    require_username(&user.username)?;

    let result = create_user(&app_state.pool, &user).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] users/{id}", skip_all, fields(path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    axum::extract::Json(changes): axum::extract::Json<UserChanges>,
) -> Result<Json<User>, Error> {
    changes.validate().map_err(Error::Validation)?;
    if let Some(username) = &changes.username {
        require_username(username)?;
    }

    let result = update_user(&app_state.pool, path.id, &changes).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] users/{id}", skip_all, fields(path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Message>, Error> {
    delete_user(&app_state.pool, path.id).await?;

    Ok(Json(Message::new("User deleted")))
}
