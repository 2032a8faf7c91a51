use sqlx::PgPool;

use crate::{
    error::Error,
    model::{Category, NamedCount},
};

use super::error::{DatabaseError, is_unique_violation};

fn category_conflict(e: sqlx::Error) -> Error {
    if is_unique_violation(&e) {
        Error::Conflict {
            message: "Category with this name already exists".to_string(),
            conflicting_id: None,
        }
    } else {
        Error::Database(DatabaseError::DatabaseError(e))
    }
}

#[tracing::instrument(name = "list categories", skip_all)]
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, Error> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name, id")
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(categories)
}

/// Categories with the number of books in each, most populated first.
#[tracing::instrument(name = "list categories with counts", skip_all)]
pub async fn list_categories_with_counts(pool: &PgPool) -> Result<Vec<NamedCount>, Error> {
    let categories = sqlx::query_as::<_, NamedCount>(
        r#"
        SELECT
            categories.id,
            categories.name,
            COUNT(book_categories.book_id) AS book_count
        FROM
            categories
        LEFT JOIN book_categories ON categories.id = book_categories.category_id
        GROUP BY categories.id
        ORDER BY book_count DESC, categories.name;
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(categories)
}

#[tracing::instrument(name = "get category by id", skip_all, fields(category_id))]
pub async fn get_category_by_id(pool: &PgPool, category_id: i64) -> Result<Category, Error> {
    sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?
        .ok_or(Error::Database(DatabaseError::NotFound("Category")))
}

#[tracing::instrument(name = "insert category", skip_all, fields(name))]
pub async fn insert_category(pool: &PgPool, name: &str) -> Result<Category, Error> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories
            (name)
        VALUES
            ($1)
        RETURNING id, name;
    "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(category_conflict)
}

#[tracing::instrument(name = "rename category", skip_all, fields(category_id, name))]
pub async fn rename_category(pool: &PgPool, category_id: i64, name: &str) -> Result<Category, Error> {
    sqlx::query_as::<_, Category>("UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name")
        .bind(name)
        .bind(category_id)
        .fetch_optional(pool)
        .await
        .map_err(category_conflict)?
        .ok_or(Error::Database(DatabaseError::NotFound("Category")))
}

#[tracing::instrument(name = "delete category", skip_all, fields(category_id))]
pub async fn delete_category(pool: &PgPool, category_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Category")));
    }

    Ok(())
}
