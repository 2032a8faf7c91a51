use sqlx::PgPool;

use crate::{
    db::{
        authors::list_authors, books::get_book_details, categories::list_categories_with_counts,
        languages::list_languages_with_counts, users::list_users,
    },
    error::Error,
    model::{AuthorListItem, BookDetail, NamedCount, UserWithCollections},
    query::PageRequest,
};

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_authors: i64,
    pub total_categories: i64,
    pub total_languages: i64,
    pub total_users: i64,
    pub total_collections: i64,
    pub books_with_covers: i64,
    pub missing_covers: i64,
    pub cover_percentage: f64,
}

#[derive(serde::Serialize, Debug)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub books: Vec<BookDetail>,
    pub authors: Vec<AuthorListItem>,
    pub categories: Vec<NamedCount>,
    pub languages: Vec<NamedCount>,
    pub users: Vec<UserWithCollections>,
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

impl Dashboard {
    fn new(
        books: Vec<BookDetail>,
        authors: Vec<AuthorListItem>,
        categories: Vec<NamedCount>,
        languages: Vec<NamedCount>,
        users: Vec<UserWithCollections>,
    ) -> Self {
        let total_books = count(books.len());
        let books_with_covers = count(books.iter().filter(|b| b.cover_id.is_some()).count());
        let cover_percentage = if total_books > 0 {
            books_with_covers as f64 / total_books as f64 * 100.0
        } else {
            0.0
        };

        let stats = DashboardStats {
            total_books,
            total_authors: count(authors.len()),
            total_categories: count(categories.len()),
            total_languages: count(languages.len()),
            total_users: count(users.len()),
            total_collections: users.iter().map(|u| u.collection_count).sum(),
            books_with_covers,
            missing_covers: total_books - books_with_covers,
            cover_percentage,
        };

        Dashboard {
            stats,
            books,
            authors,
            categories,
            languages,
            users,
        }
    }
}

#[tracing::instrument(name = "admin dashboard", skip_all)]
pub async fn dashboard(pool: &PgPool) -> Result<Dashboard, Error> {
    let books = get_book_details(pool).await?;
    let authors = list_authors(pool, None, PageRequest::unbounded()).await?;
    let categories = list_categories_with_counts(pool).await?;
    let languages = list_languages_with_counts(pool).await?;
    let users = list_users(pool).await?;

    Ok(Dashboard::new(books, authors, categories, languages, users))
}
