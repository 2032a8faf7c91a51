use sqlx::PgPool;

use crate::{
    error::Error,
    model::{Language, NamedCount},
};

use super::error::{DatabaseError, is_unique_violation};

#[tracing::instrument(name = "list languages", skip_all)]
pub async fn list_languages(pool: &PgPool) -> Result<Vec<Language>, Error> {
    let languages = sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name, id")
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(languages)
}

#[tracing::instrument(name = "list languages with counts", skip_all)]
pub async fn list_languages_with_counts(pool: &PgPool) -> Result<Vec<NamedCount>, Error> {
    let languages = sqlx::query_as::<_, NamedCount>(
        r#"
        SELECT
            languages.id,
            languages.name,
            COUNT(book_languages.book_id) AS book_count
        FROM
            languages
        LEFT JOIN book_languages ON languages.id = book_languages.language_id
        GROUP BY languages.id
        ORDER BY book_count DESC, languages.name;
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(languages)
}

#[tracing::instrument(name = "get language by id", skip_all, fields(language_id))]
pub async fn get_language_by_id(pool: &PgPool, language_id: i64) -> Result<Language, Error> {
    sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
        .bind(language_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?
        .ok_or(Error::Database(DatabaseError::NotFound("Language")))
}

fn language_conflict(e: sqlx::Error) -> Error {
    if is_unique_violation(&e) {
        Error::Conflict {
            message: "Language with this name already exists".to_string(),
            conflicting_id: None,
        }
    } else {
        Error::Database(DatabaseError::DatabaseError(e))
    }
}

#[tracing::instrument(name = "insert language", skip_all, fields(name))]
pub async fn insert_language(pool: &PgPool, name: &str) -> Result<Language, Error> {
    sqlx::query_as::<_, Language>("INSERT INTO languages (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(language_conflict)
}

#[tracing::instrument(name = "rename language", skip_all, fields(language_id, name))]
pub async fn rename_language(pool: &PgPool, language_id: i64, name: &str) -> Result<Language, Error> {
    sqlx::query_as::<_, Language>("UPDATE languages SET name = $1 WHERE id = $2 RETURNING id, name")
        .bind(name)
        .bind(language_id)
        .fetch_optional(pool)
        .await
        .map_err(language_conflict)?
        .ok_or(Error::Database(DatabaseError::NotFound("Language")))
}

#[tracing::instrument(name = "delete language", skip_all, fields(language_id))]
pub async fn delete_language(pool: &PgPool, language_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM languages WHERE id = $1")
        .bind(language_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Language")));
    }

    Ok(())
}
