use axum::{Json, extract::State};

use crate::{
    error::Error,
    services::home::{HomePage, home_page},
    state::SharedAppState,
};

pub async fn health_check() -> &'static str {
    "Alive"
}

#[tracing::instrument(name = "[GET] home", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<HomePage>, Error> {
    let result = home_page(&app_state).await?;

    Ok(Json(result))
}
