use chrono::{DateTime, Utc};

/// Listing projection of a book with its distinct author and category names.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub publication_year: Option<i32>,
    pub cover_id: Option<i64>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub id: i64,
    pub title: String,
    pub publication_year: Option<i32>,
    pub open_library_id: Option<String>,
    pub cover_id: Option<i64>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub publication_year: Option<i32>,
    pub open_library_id: Option<String>,
    pub cover_id: Option<i64>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorListItem {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub book_count: i64,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorWithBooks {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub book_count: i64,
    pub book_titles: Vec<String>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

/// A category or language with the number of books linked to it.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NamedCount {
    pub id: i64,
    pub name: String,
    pub book_count: i64,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserWithCollections {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub collection_count: i64,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub total_books: i64,
    pub total_authors: i64,
    pub total_categories: i64,
    pub total_languages: i64,
    pub total_users: i64,
    pub total_collections: i64,
    pub books_with_covers: i64,
    pub missing_covers: i64,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, validator::Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(range(min = -3000, max = 3000))]
    pub publication_year: Option<i32>,
    #[validate(length(max = 64))]
    pub open_library_id: Option<String>,
    pub cover_id: Option<i64>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Partial book update. A present name list replaces that association set.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, validator::Validate)]
pub struct BookChanges {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    #[validate(range(min = -3000, max = 3000))]
    pub publication_year: Option<i32>,
    #[validate(length(max = 64))]
    pub open_library_id: Option<String>,
    pub cover_id: Option<i64>,
    pub authors: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
}

/// Body shared by the author, category and language create/rename endpoints.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, validator::Validate)]
pub struct NameInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, validator::Validate)]
pub struct ImageInput {
    #[validate(url, length(max = 2048))]
    pub image_url: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy)]
pub struct BookRef {
    pub book_id: i64,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, validator::Validate)]
pub struct NewUser {
    #[validate(length(min = 3, max = 80))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 32))]
    pub role: Option<String>,
}

/// Partial user update; absent fields keep their stored value.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, validator::Validate)]
pub struct UserChanges {
    #[validate(length(min = 3, max = 80))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, validator::Validate)]
pub struct NewCollection {
    pub user_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, validator::Validate)]
pub struct CollectionChanges {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}
