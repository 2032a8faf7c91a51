use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::state::SharedAppState;

fn is_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Drops the cached statistics once a write has succeeded.
#[tracing::instrument(name = "[MIDDLEWARE] invalidate statistics", skip_all)]
pub async fn invalidate_statistics(
    State(app_state): State<SharedAppState>,
    req: Request,
    next: Next,
) -> Response {
    let is_write = !is_read(req.method());

    let response = next.run(req).await;

    if is_write && response.status().is_success() {
        app_state.statistics.invalidate().await;
    }

    response
}
