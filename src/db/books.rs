use futures::TryStreamExt;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Error,
    model::{Book, BookChanges, BookDetail, BookSummary, NewBook},
    query::{BookPredicate, BookSort, FilterCriteria, PageRequest},
    util::{normalize_name, normalize_names},
};

use super::{PostgresTransaction, error::DatabaseError};

const BOOK_SUMMARY_SELECT: &str = r#"
        SELECT
            b.id, b.title, b.publication_year, b.cover_id,
            COALESCE(ARRAY_AGG(DISTINCT a.name) FILTER (WHERE a.name IS NOT NULL), ARRAY[]::text[]) AS authors,
            COALESCE(ARRAY_AGG(DISTINCT c.name) FILTER (WHERE c.name IS NOT NULL), ARRAY[]::text[]) AS categories
        FROM
            books b
        LEFT JOIN book_authors ba ON b.id = ba.book_id
        LEFT JOIN authors a ON ba.author_id = a.id
        LEFT JOIN book_categories bc ON b.id = bc.book_id
        LEFT JOIN categories c ON bc.category_id = c.id
"#;

const BOOK_DETAIL_SELECT: &str = r#"
        SELECT
            b.id, b.title, b.publication_year, b.open_library_id, b.cover_id,
            COALESCE(ARRAY_AGG(DISTINCT a.name) FILTER (WHERE a.name IS NOT NULL), ARRAY[]::text[]) AS authors,
            COALESCE(ARRAY_AGG(DISTINCT c.name) FILTER (WHERE c.name IS NOT NULL), ARRAY[]::text[]) AS categories,
            COALESCE(ARRAY_AGG(DISTINCT l.name) FILTER (WHERE l.name IS NOT NULL), ARRAY[]::text[]) AS languages
        FROM
            books b
        LEFT JOIN book_authors ba ON b.id = ba.book_id
        LEFT JOIN authors a ON ba.author_id = a.id
        LEFT JOIN book_categories bc ON b.id = bc.book_id
        LEFT JOIN categories c ON bc.category_id = c.id
        LEFT JOIN book_languages bl ON b.id = bl.book_id
        LEFT JOIN languages l ON bl.language_id = l.id
"#;

#[tracing::instrument(name = "count books", skip_all, fields(filters = ?filters))]
pub async fn count_books(pool: &PgPool, filters: &FilterCriteria) -> Result<i64, Error> {
    let predicate = BookPredicate::from(filters);

    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(DISTINCT b.id) FROM books b");
    predicate.push_where(&mut count_builder);

    let total: i64 = count_builder
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(total)
}

#[tracing::instrument(
    name = "fetch books",
    skip_all,
    fields(filters = ?filters, limit = ?page.limit, offset = page.offset, sort = ?sort)
)]
pub async fn fetch_books(
    pool: &PgPool,
    filters: &FilterCriteria,
    page: PageRequest,
    sort: BookSort,
) -> Result<Vec<BookSummary>, Error> {
    if page.offset < 0 {
        return Err(Error::InvalidArgument(format!(
            "offset must not be negative, got {}",
            page.offset
        )));
    }
    if let Some(limit) = page.limit.filter(|limit| *limit <= 0) {
        return Err(Error::InvalidArgument(format!(
            "limit must be positive, got {}",
            limit
        )));
    }

    let predicate = BookPredicate::from(filters);

    let mut book_builder: QueryBuilder<Postgres> = QueryBuilder::new(BOOK_SUMMARY_SELECT);
    predicate.push_where(&mut book_builder);
    book_builder
        .push(" GROUP BY b.id ORDER BY ")
        .push(sort.order_by());

    if let Some(limit) = page.limit {
        book_builder.push(" LIMIT ").push_bind(limit);
    }
    if page.offset > 0 {
        book_builder.push(" OFFSET ").push_bind(page.offset);
    }

    let books = book_builder
        .build_query_as::<BookSummary>()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(books)
}

#[tracing::instrument(name = "get book by id", skip_all, fields(book_id))]
pub async fn get_book_by_id(pool: &PgPool, book_id: i64) -> Result<BookDetail, Error> {
    let mut book_builder: QueryBuilder<Postgres> = QueryBuilder::new(BOOK_DETAIL_SELECT);
    book_builder
        .push(" WHERE b.id = ")
        .push_bind(book_id)
        .push(" GROUP BY b.id");

    book_builder
        .build_query_as::<BookDetail>()
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?
        .ok_or(Error::Database(DatabaseError::NotFound("Book")))
}

/// Every book with its associations, ordered by id.
#[tracing::instrument(name = "get book details", skip_all)]
pub async fn get_book_details(pool: &PgPool) -> Result<Vec<BookDetail>, Error> {
    let mut book_builder: QueryBuilder<Postgres> = QueryBuilder::new(BOOK_DETAIL_SELECT);
    book_builder.push(" GROUP BY b.id ORDER BY b.id");

    let mut book_stream = book_builder.build_query_as::<BookDetail>().fetch(pool);

    let mut books = Vec::new();
    while let Some(book) = book_stream
        .try_next()
        .await
        .map_err(DatabaseError::DatabaseError)?
    {
        books.push(book);
    }

    Ok(books)
}

#[tracing::instrument(name = "get book by title", skip_all, fields(title))]
pub async fn get_book_by_title(pool: &PgPool, title: &str) -> Result<Book, Error> {
    let title = normalize_name(title)
        .ok_or_else(|| Error::InvalidArgument("Invalid book title".to_string()))?;

    sqlx::query_as::<_, Book>(
        r#"
        SELECT
            id, title, publication_year, open_library_id, cover_id
        FROM
            books
        WHERE
            LOWER(title) = $1
        ORDER BY id
        LIMIT 1;
    "#,
    )
    .bind(title)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("Book")))
}

#[tracing::instrument(name = "get books by author name", skip_all, fields(author_name))]
pub async fn get_books_by_author_name(pool: &PgPool, author_name: &str) -> Result<Vec<Book>, Error> {
    sqlx::query_as::<_, Book>(
        r#"
        SELECT DISTINCT
            b.id, b.title, b.publication_year, b.open_library_id, b.cover_id
        FROM
            books b
        INNER JOIN book_authors ba ON b.id = ba.book_id
        INNER JOIN authors a ON ba.author_id = a.id
        WHERE
            LOWER(a.name) = LOWER($1)
        ORDER BY b.publication_year DESC NULLS LAST, b.title, b.id;
    "#,
    )
    .bind(author_name.trim())
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)
    .map_err(Error::Database)
}

#[tracing::instrument(name = "book exists", skip_all, fields(book_id))]
pub async fn book_exists(pool: &PgPool, book_id: i64) -> Result<bool, Error> {
    let exists: bool =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::DatabaseError)?;

    Ok(exists)
}

#[tracing::instrument(name = "insert book", skip_all, fields(title = %book.title))]
pub async fn insert_book(tx: &mut PostgresTransaction, book: &NewBook) -> Result<i64, Error> {
    let title = normalize_name(&book.title)
        .ok_or_else(|| Error::InvalidArgument("Title is required".to_string()))?;

    let existing: Option<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM books WHERE LOWER(title) = $1 LIMIT 1")
            .bind(&title)
            .fetch_optional(&mut **tx)
            .await
            .map_err(DatabaseError::DatabaseError)?;

    if let Some(conflicting_id) = existing {
        return Err(Error::Conflict {
            message: "Book with this title already exists".to_string(),
            conflicting_id: Some(conflicting_id),
        });
    }

    let book_id: i64 = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO books
            (title, publication_year, open_library_id, cover_id)
        VALUES
            ($1, $2, $3, $4)
        RETURNING id;
    "#,
    )
    .bind(&title)
    .bind(book.publication_year)
    .bind(book.open_library_id.as_deref().map(str::trim))
    .bind(book.cover_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    replace_associations(tx, book_id, Association::Author, &book.authors).await?;
    replace_associations(tx, book_id, Association::Category, &book.categories).await?;
    replace_associations(tx, book_id, Association::Language, &book.languages).await?;

    Ok(book_id)
}

#[tracing::instrument(name = "update book", skip_all, fields(book_id))]
pub async fn update_book(
    tx: &mut PostgresTransaction,
    book_id: i64,
    changes: &BookChanges,
) -> Result<(), Error> {
    let exists: bool =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(DatabaseError::DatabaseError)?;

    if !exists {
        return Err(Error::Database(DatabaseError::NotFound("Book")));
    }

    let title = changes.title.as_deref().and_then(normalize_name);
    let has_field_changes = title.is_some()
        || changes.publication_year.is_some()
        || changes.open_library_id.is_some()
        || changes.cover_id.is_some();

    if has_field_changes {
        let mut update_builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE books SET ");
        let mut update_separator = update_builder.separated(", ");
        if let Some(title) = title {
            update_separator.push("title = ").push_bind_unseparated(title);
        }
        if let Some(year) = changes.publication_year {
            update_separator
                .push("publication_year = ")
                .push_bind_unseparated(year);
        }
        if let Some(open_library_id) = &changes.open_library_id {
            update_separator
                .push("open_library_id = ")
                .push_bind_unseparated(open_library_id.trim().to_string());
        }
        if let Some(cover_id) = changes.cover_id {
            update_separator.push("cover_id = ").push_bind_unseparated(cover_id);
        }
        update_builder.push(" WHERE id = ").push_bind(book_id);

        update_builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(DatabaseError::DatabaseError)?;
    }

    if let Some(authors) = &changes.authors {
        replace_associations(tx, book_id, Association::Author, authors).await?;
    }
    if let Some(categories) = &changes.categories {
        replace_associations(tx, book_id, Association::Category, categories).await?;
    }
    if let Some(languages) = &changes.languages {
        replace_associations(tx, book_id, Association::Language, languages).await?;
    }

    Ok(())
}

#[tracing::instrument(name = "delete book", skip_all, fields(book_id))]
pub async fn delete_book(pool: &PgPool, book_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(book_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Book")));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Association {
    Author,
    Category,
    Language,
}

impl Association {
    fn find_sql(&self) -> &'static str {
        match self {
            Association::Author => "SELECT id FROM authors WHERE LOWER(name) = $1",
            Association::Category => "SELECT id FROM categories WHERE name = $1",
            Association::Language => "SELECT id FROM languages WHERE name = $1",
        }
    }

    fn insert_sql(&self) -> &'static str {
        match self {
            Association::Author => "INSERT INTO authors (name) VALUES ($1) RETURNING id",
            Association::Category => "INSERT INTO categories (name) VALUES ($1) RETURNING id",
            Association::Language => "INSERT INTO languages (name) VALUES ($1) RETURNING id",
        }
    }

    fn clear_sql(&self) -> &'static str {
        match self {
            Association::Author => "DELETE FROM book_authors WHERE book_id = $1",
            Association::Category => "DELETE FROM book_categories WHERE book_id = $1",
            Association::Language => "DELETE FROM book_languages WHERE book_id = $1",
        }
    }

    fn link_sql(&self) -> &'static str {
        match self {
            Association::Author => "INSERT INTO book_authors (book_id, author_id) ",
            Association::Category => "INSERT INTO book_categories (book_id, category_id) ",
            Association::Language => "INSERT INTO book_languages (book_id, language_id) ",
        }
    }
}

async fn find_or_create(
    tx: &mut PostgresTransaction,
    association: Association,
    name: &str,
) -> Result<i64, Error> {
    let existing: Option<i64> = sqlx::query_scalar::<_, i64>(association.find_sql())
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id: i64 = sqlx::query_scalar::<_, i64>(association.insert_sql())
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(id)
}

#[tracing::instrument(name = "replace book associations", skip_all, fields(book_id, association = ?association))]
async fn replace_associations(
    tx: &mut PostgresTransaction,
    book_id: i64,
    association: Association,
    names: &[String],
) -> Result<(), Error> {
    sqlx::query(association.clear_sql())
        .bind(book_id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let names = normalize_names(names);
    if names.is_empty() {
        return Ok(());
    }

    let mut ids = Vec::with_capacity(names.len());
    for name in &names {
        ids.push(find_or_create(tx, association, name).await?);
    }

    let mut link_builder: QueryBuilder<Postgres> = QueryBuilder::new(association.link_sql());
    link_builder.push_values(&ids, |mut b, id| {
        b.push_bind(book_id).push_bind(*id);
    });
    link_builder.push(" ON CONFLICT DO NOTHING;");

    link_builder
        .build()
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}
