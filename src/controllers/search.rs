use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    db::{authors::search_authors, books::fetch_books},
    error::Error,
    model::{AuthorWithBooks, BookSummary},
    query::{BookSort, FilterCriteria, PageRequest},
    state::SharedAppState,
};

#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default)]
pub struct SearchResults {
    pub books: Vec<BookSummary>,
    pub authors: Vec<AuthorWithBooks>,
}

#[tracing::instrument(name = "[GET] search", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, Error> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(SearchResults::default()));
    }

    let filters = FilterCriteria::default().with_search(q);
    let books = fetch_books(
        &app_state.pool,
        &filters,
        PageRequest::unbounded(),
        BookSort::Title,
    )
    .await?;
    let authors = search_authors(&app_state.pool, q).await?;

    Ok(Json(SearchResults { books, authors }))
}
