use axum::{Json, extract::State};

use crate::{error::Error, model::Statistics, state::SharedAppState};

#[tracing::instrument(name = "[GET] statistics", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Statistics>, Error> {
    let result = app_state.statistics.get_or_load(&app_state.pool).await?;

    Ok(Json(result))
}
