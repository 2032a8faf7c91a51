use sqlx::PgPool;

use crate::{error::Error, model::Statistics};

use super::error::DatabaseError;

#[tracing::instrument(name = "get statistics", skip_all)]
pub async fn get_statistics(pool: &PgPool) -> Result<Statistics, Error> {
    let statistics = sqlx::query_as::<_, Statistics>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM books) AS total_books,
            (SELECT COUNT(*) FROM authors) AS total_authors,
            (SELECT COUNT(*) FROM categories) AS total_categories,
            (SELECT COUNT(*) FROM languages) AS total_languages,
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM collections) AS total_collections,
            (SELECT COUNT(*) FROM books WHERE cover_id IS NOT NULL) AS books_with_covers,
            (SELECT COUNT(*) FROM books WHERE cover_id IS NULL) AS missing_covers;
    "#,
    )
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(statistics)
}
