use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Error,
    model::{Author, AuthorListItem, AuthorWithBooks},
    query::{PageRequest, filter::like_pattern},
};

use super::error::{DatabaseError, is_unique_violation};

const AUTHOR_WITH_BOOKS_SELECT: &str = r#"
        SELECT
            authors.id,
            authors.name,
            authors.image_url,
            COUNT(books.id) AS book_count,
            COALESCE(ARRAY_AGG(books.title) FILTER (WHERE books.title IS NOT NULL), ARRAY[]::text[]) AS book_titles
        FROM
            authors
        LEFT JOIN book_authors ON authors.id = book_authors.author_id
        LEFT JOIN books ON book_authors.book_id = books.id
"#;

fn push_name_search(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        builder
            .push(" WHERE authors.name ILIKE ")
            .push_bind(like_pattern(search));
    }
}

#[tracing::instrument(name = "count authors", skip_all, fields(search))]
pub async fn count_authors(pool: &PgPool, search: Option<&str>) -> Result<i64, Error> {
    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(DISTINCT authors.id) FROM authors");
    push_name_search(&mut count_builder, search);

    let total = count_builder
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(total)
}

/// Authors with their book counts, ordered case-insensitively by name.
#[tracing::instrument(name = "list authors", skip_all, fields(search, limit = ?page.limit, offset = page.offset))]
pub async fn list_authors(
    pool: &PgPool,
    search: Option<&str>,
    page: PageRequest,
) -> Result<Vec<AuthorListItem>, Error> {
    let mut author_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        SELECT
            authors.id, authors.name, authors.image_url,
            COUNT(DISTINCT book_authors.book_id) AS book_count
        FROM
            authors
        LEFT JOIN book_authors ON authors.id = book_authors.author_id
    "#,
    );
    push_name_search(&mut author_builder, search);
    author_builder.push(" GROUP BY authors.id ORDER BY LOWER(authors.name), authors.id");

    if let Some(limit) = page.limit {
        author_builder.push(" LIMIT ").push_bind(limit);
    }
    author_builder.push(" OFFSET ").push_bind(page.offset.max(0));

    let authors = author_builder
        .build_query_as::<AuthorListItem>()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(authors)
}

#[tracing::instrument(name = "get author by id", skip_all, fields(author_id))]
pub async fn get_author_by_id(pool: &PgPool, author_id: i64) -> Result<AuthorWithBooks, Error> {
    let mut author_builder: QueryBuilder<Postgres> = QueryBuilder::new(AUTHOR_WITH_BOOKS_SELECT);
    author_builder
        .push(" WHERE authors.id = ")
        .push_bind(author_id)
        .push(" GROUP BY authors.id");

    author_builder
        .build_query_as::<AuthorWithBooks>()
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?
        .ok_or(Error::Database(DatabaseError::NotFound("Author")))
}

#[tracing::instrument(name = "search authors", skip_all, fields(name))]
pub async fn search_authors(pool: &PgPool, name: &str) -> Result<Vec<AuthorWithBooks>, Error> {
    let mut author_builder: QueryBuilder<Postgres> = QueryBuilder::new(AUTHOR_WITH_BOOKS_SELECT);
    push_name_search(&mut author_builder, Some(name));
    author_builder.push(" GROUP BY authors.id ORDER BY LOWER(authors.name), authors.id");

    let authors = author_builder
        .build_query_as::<AuthorWithBooks>()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(authors)
}

#[tracing::instrument(name = "list authors with books", skip_all)]
pub async fn list_authors_with_books(pool: &PgPool) -> Result<Vec<AuthorWithBooks>, Error> {
    let mut author_builder: QueryBuilder<Postgres> = QueryBuilder::new(AUTHOR_WITH_BOOKS_SELECT);
    author_builder.push(" GROUP BY authors.id ORDER BY LOWER(authors.name), authors.id");

    let authors = author_builder
        .build_query_as::<AuthorWithBooks>()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(authors)
}

async fn find_author_id_by_name(
    pool: &PgPool,
    name: &str,
    except: Option<i64>,
) -> Result<Option<i64>, Error> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT
            id
        FROM
            authors
        WHERE
            LOWER(name) = LOWER($1)
            AND ($2::BIGINT IS NULL OR id <> $2)
        LIMIT 1;
    "#,
    )
    .bind(name)
    .bind(except)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(id)
}

fn author_conflict(conflicting_id: Option<i64>, message: &str) -> Error {
    Error::Conflict {
        message: message.to_string(),
        conflicting_id,
    }
}

/// `name` must already be normalised.
#[tracing::instrument(name = "insert author", skip_all, fields(name))]
pub async fn insert_author(pool: &PgPool, name: &str) -> Result<Author, Error> {
    if let Some(id) = find_author_id_by_name(pool, name, None).await? {
        return Err(author_conflict(
            Some(id),
            "Author with this name already exists",
        ));
    }

    sqlx::query_as::<_, Author>(
        r#"
        INSERT INTO authors
            (name)
        VALUES
            ($1)
        RETURNING id, name, image_url;
    "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            author_conflict(None, "Author with this name already exists")
        } else {
            Error::Database(DatabaseError::DatabaseError(e))
        }
    })
}

#[tracing::instrument(name = "update author", skip_all, fields(author_id, name))]
pub async fn update_author(pool: &PgPool, author_id: i64, name: &str) -> Result<Author, Error> {
    if !author_exists(pool, author_id).await? {
        return Err(Error::Database(DatabaseError::NotFound("Author")));
    }

    if let Some(id) = find_author_id_by_name(pool, name, Some(author_id)).await? {
        return Err(author_conflict(
            Some(id),
            "Another author with this name already exists",
        ));
    }

    sqlx::query_as::<_, Author>(
        r#"
        UPDATE authors
        SET
            name = $1
        WHERE
            id = $2
        RETURNING id, name, image_url;
    "#,
    )
    .bind(name)
    .bind(author_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            author_conflict(None, "Another author with this name already exists")
        } else {
            Error::Database(DatabaseError::DatabaseError(e))
        }
    })?
    .ok_or(Error::Database(DatabaseError::NotFound("Author")))
}

#[tracing::instrument(name = "update author image", skip_all, fields(author_id))]
pub async fn update_author_image(
    pool: &PgPool,
    author_id: i64,
    image_url: &str,
) -> Result<Author, Error> {
    sqlx::query_as::<_, Author>(
        r#"
        UPDATE authors
        SET
            image_url = $1
        WHERE
            id = $2
        RETURNING id, name, image_url;
    "#,
    )
    .bind(image_url)
    .bind(author_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Author")))
}

#[tracing::instrument(name = "delete author", skip_all, fields(author_id))]
pub async fn delete_author(pool: &PgPool, author_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM authors WHERE id = $1")
        .bind(author_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Author")));
    }

    Ok(())
}

#[tracing::instrument(name = "author exists", skip_all, fields(author_id))]
pub async fn author_exists(pool: &PgPool, author_id: i64) -> Result<bool, Error> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM authors WHERE id = $1)")
            .bind(author_id)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::DatabaseError)?;

    Ok(exists)
}

/// Returns `false` when the link already existed.
#[tracing::instrument(name = "link author book", skip_all, fields(author_id, book_id))]
pub async fn link_book(pool: &PgPool, author_id: i64, book_id: i64) -> Result<bool, Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO book_authors
            (author_id, book_id)
        VALUES
            ($1, $2)
        ON CONFLICT (book_id, author_id) DO NOTHING;
    "#,
    )
    .bind(author_id)
    .bind(book_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected() > 0)
}

/// Returns `false` when there was no link to remove.
#[tracing::instrument(name = "unlink author book", skip_all, fields(author_id, book_id))]
pub async fn unlink_book(pool: &PgPool, author_id: i64, book_id: i64) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM book_authors WHERE author_id = $1 AND book_id = $2")
        .bind(author_id)
        .bind(book_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected() > 0)
}
