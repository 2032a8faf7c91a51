use sqlx::PgPool;

use crate::{
    db::{
        books::{count_books, fetch_books},
        categories::list_categories,
        languages::list_languages,
    },
    error::Error,
    model::{BookSummary, Category, Language},
    query::{BookSort, FilterCriteria, PaginationState},
};

#[derive(serde::Serialize, Debug)]
pub struct BooksPage {
    pub books: Vec<BookSummary>,
    pub pagination: PaginationState,
    pub current_filters: FilterCriteria,
    pub categories: Vec<Category>,
    pub languages: Vec<Language>,
}

/// Counts the matching books, then fetches the requested page with the same
/// criteria so the rows and the total always agree.
#[tracing::instrument(name = "books page", skip_all, fields(page, per_page))]
pub async fn books_page(
    pool: &PgPool,
    filters: FilterCriteria,
    page: i64,
    per_page: i64,
    sort: BookSort,
) -> Result<BooksPage, Error> {
    let filters = filters.normalize();

    let total = count_books(pool, &filters).await?;
    let pagination = PaginationState::new(page, per_page, total)?;
    let books = fetch_books(pool, &filters, pagination.page_request(), sort).await?;
    let categories = list_categories(pool).await?;
    let languages = list_languages(pool).await?;

    Ok(BooksPage {
        books,
        pagination,
        current_filters: filters,
        categories,
        languages,
    })
}
