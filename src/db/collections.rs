use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Error,
    model::{Collection, CollectionChanges, NewCollection},
};

use super::error::DatabaseError;

const COLLECTION_COLUMNS: &str = "id, user_id, name, description, created_at, updated_at";

#[tracing::instrument(name = "list collections", skip_all, fields(user_id))]
pub async fn list_collections(
    pool: &PgPool,
    user_id: Option<i64>,
) -> Result<Vec<Collection>, Error> {
    let mut collection_builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
    collection_builder
        .push(COLLECTION_COLUMNS)
        .push(" FROM collections");
    if let Some(user_id) = user_id {
        collection_builder.push(" WHERE user_id = ").push_bind(user_id);
    }
    collection_builder.push(" ORDER BY updated_at DESC, id");

    let collections = collection_builder
        .build_query_as::<Collection>()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(collections)
}

#[tracing::instrument(name = "get collection by id", skip_all, fields(collection_id))]
pub async fn get_collection_by_id(pool: &PgPool, collection_id: i64) -> Result<Collection, Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        SELECT
            id, user_id, name, description, created_at, updated_at
        FROM
            collections
        WHERE
            id = $1
    "#,
    )
    .bind(collection_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Collection")))
}

#[tracing::instrument(name = "collection exists", skip_all, fields(collection_id))]
pub async fn collection_exists(pool: &PgPool, collection_id: i64) -> Result<bool, Error> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM collections WHERE id = $1)")
            .bind(collection_id)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::DatabaseError)?;

    Ok(exists)
}

/// The owner must exist; callers check it first so a missing user maps to 404.
#[tracing::instrument(name = "create collection", skip_all, fields(user_id = collection.user_id))]
pub async fn create_collection(
    pool: &PgPool,
    collection: &NewCollection,
) -> Result<Collection, Error> {
    let collection = sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections
            (user_id, name, description)
        VALUES
            ($1, $2, $3)
        RETURNING id, user_id, name, description, created_at, updated_at;
    "#,
    )
    .bind(collection.user_id)
    .bind(collection.name.trim())
    .bind(collection.description.as_deref().map(str::trim))
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(collection)
}

#[tracing::instrument(name = "update collection", skip_all, fields(collection_id))]
pub async fn update_collection(
    pool: &PgPool,
    collection_id: i64,
    changes: &CollectionChanges,
) -> Result<Collection, Error> {
    if changes.name.is_none() && changes.description.is_none() {
        return Err(Error::InvalidArgument(
            "At least one of name or description is required".to_string(),
        ));
    }

    let mut update_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("UPDATE collections SET updated_at = now()");
    if let Some(name) = &changes.name {
        update_builder
            .push(", name = ")
            .push_bind(name.trim().to_string());
    }
    if let Some(description) = &changes.description {
        update_builder
            .push(", description = ")
            .push_bind(description.trim().to_string());
    }
    update_builder
        .push(" WHERE id = ")
        .push_bind(collection_id)
        .push(" RETURNING ")
        .push(COLLECTION_COLUMNS);

    update_builder
        .build_query_as::<Collection>()
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?
        .ok_or(Error::Database(DatabaseError::NotFound("Collection")))
}

#[tracing::instrument(name = "delete collection", skip_all, fields(collection_id))]
pub async fn delete_collection(pool: &PgPool, collection_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM collections WHERE id = $1")
        .bind(collection_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Collection")));
    }

    Ok(())
}

/// Adds the book to the collection. Returns `false` when it was already a member.
#[tracing::instrument(name = "add book to collection", skip_all, fields(collection_id, book_id))]
pub async fn add_book(pool: &PgPool, collection_id: i64, book_id: i64) -> Result<bool, Error> {
    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let result = sqlx::query(
        r#"
        INSERT INTO collection_books
            (collection_id, book_id)
        VALUES
            ($1, $2)
        ON CONFLICT (collection_id, book_id) DO NOTHING;
    "#,
    )
    .bind(collection_id)
    .bind(book_id)
    .execute(&mut *tx)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    let inserted = result.rows_affected() > 0;
    if inserted {
        sqlx::query("UPDATE collections SET updated_at = now() WHERE id = $1")
            .bind(collection_id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::DatabaseError)?;
    }

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(inserted)
}

#[tracing::instrument(name = "remove book from collection", skip_all, fields(collection_id, book_id))]
pub async fn remove_book(pool: &PgPool, collection_id: i64, book_id: i64) -> Result<(), Error> {
    let result =
        sqlx::query("DELETE FROM collection_books WHERE collection_id = $1 AND book_id = $2")
            .bind(collection_id)
            .bind(book_id)
            .execute(pool)
            .await
            .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Collection book")));
    }

    Ok(())
}
