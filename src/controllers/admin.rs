use axum::{Json, extract::State};

use crate::{
    error::Error,
    services::admin::{Dashboard, dashboard as load_dashboard},
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] admin/dashboard", skip_all)]
pub async fn dashboard(State(app_state): State<SharedAppState>) -> Result<Json<Dashboard>, Error> {
    let result = load_dashboard(&app_state.pool).await?;

    Ok(Json(result))
}
