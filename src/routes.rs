use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, Request, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    controllers::{
        admin, authors, books, categories, collections, home, languages, search, statistics,
        users,
    },
    middlewares::invalidate_statistics,
    state::{AppState, SharedAppState},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

fn api_router(state: SharedAppState) -> Router<SharedAppState> {
    let book_route = Router::new()
        .route("/", get(books::index).post(books::store))
        .route("/by-author", get(books::by_author))
        .route("/title/{title}", get(books::show_by_title))
        .route(
            "/{id}",
            get(books::show).put(books::update).delete(books::destroy),
        );

    let author_route = Router::new()
        .route("/", get(authors::index).post(authors::store))
        .route("/search", get(authors::search))
        .route(
            "/{id}",
            get(authors::show)
                .put(authors::update)
                .delete(authors::destroy),
        )
        .route("/{id}/image", put(authors::update_image))
        .route("/{id}/books", post(authors::add_book))
        .route("/{id}/books/{book_id}", delete(authors::remove_book));

    let category_route = Router::new()
        .route("/", get(categories::index).post(categories::store))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route("/{id}/books", get(categories::books));

    let language_route = Router::new()
        .route("/", get(languages::index).post(languages::store))
        .route(
            "/{id}",
            get(languages::show)
                .put(languages::update)
                .delete(languages::destroy),
        );

    let user_route = Router::new()
        .route("/", get(users::index).post(users::store))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        );

    let collection_route = Router::new()
        .route("/", get(collections::index).post(collections::store))
        .route(
            "/{id}",
            get(collections::show)
                .put(collections::update)
                .delete(collections::destroy),
        )
        .route(
            "/{id}/books",
            get(collections::books).post(collections::add),
        )
        .route("/{id}/available", get(collections::available))
        .route(
            "/{id}/books/{book_id}",
            delete(collections::remove),
        );

    Router::new()
        .route("/home", get(home::index))
        .route("/search", get(search::index))
        .route("/statistics", get(statistics::index))
        .route("/admin/dashboard", get(admin::dashboard))
        .nest("/books", book_route)
        .nest("/authors", author_route)
        .nest("/categories", category_route)
        .nest("/languages", language_route)
        .nest("/users", user_route)
        .nest("/collections", collection_route)
        .layer(middleware::from_fn_with_state(state, invalidate_statistics))
}

pub fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);

    let app = Router::new().route("/health_check", get(home::health_check));

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or("");
                let user_agent = request
                    .headers()
                    .get(header::USER_AGENT)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or("");

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.nest("/api", api_router(state.clone()))
        .layer(CompressionLayer::new())
        .layer(request_id_middleware)
        .with_state(state)
}
