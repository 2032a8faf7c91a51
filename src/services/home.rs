use std::collections::BTreeMap;

use crate::{
    db::{authors::list_authors_with_books, books::get_book_details, categories::list_categories},
    error::Error,
    model::{AuthorWithBooks, BookDetail, Category, Statistics},
    state::AppState,
};

const FEATURED_COUNT: usize = 6;
const POPULAR_END: usize = 14;
const LATEST_COUNT: usize = 8;
const SPECIAL_COUNT: usize = 5;

#[derive(serde::Serialize, Debug)]
pub struct HomePage {
    pub featured: Vec<BookDetail>,
    pub popular: Vec<BookDetail>,
    pub latest: Vec<BookDetail>,
    pub special: Vec<BookDetail>,
    pub books_by_category: BTreeMap<String, Vec<BookDetail>>,
    pub authors: Vec<AuthorWithBooks>,
    pub stats: Statistics,
}

fn featured(books: &[BookDetail]) -> Vec<BookDetail> {
    books.iter().take(FEATURED_COUNT).cloned().collect()
}

/// Books after the featured ones, or everything when there are no more than that.
fn popular(books: &[BookDetail]) -> Vec<BookDetail> {
    if books.len() <= FEATURED_COUNT {
        return books.to_vec();
    }

    books[FEATURED_COUNT..books.len().min(POPULAR_END)].to_vec()
}

fn tail(books: &[BookDetail], count: usize) -> Vec<BookDetail> {
    books[books.len().saturating_sub(count)..].to_vec()
}

/// `all` holds every book; a category literally named `all` does not replace it.
fn by_category(books: &[BookDetail], categories: &[Category]) -> BTreeMap<String, Vec<BookDetail>> {
    let mut shelves = BTreeMap::new();
    shelves.insert("all".to_string(), books.to_vec());

    for category in categories {
        shelves.entry(category.name.clone()).or_insert_with(|| {
            books
                .iter()
                .filter(|book| book.categories.contains(&category.name))
                .cloned()
                .collect()
        });
    }

    shelves
}

#[tracing::instrument(name = "home page", skip_all)]
pub async fn home_page(app_state: &AppState) -> Result<HomePage, Error> {
    let books = get_book_details(&app_state.pool).await?;
    let categories = list_categories(&app_state.pool).await?;
    let authors = list_authors_with_books(&app_state.pool).await?;
    let stats = app_state.statistics.get_or_load(&app_state.pool).await?;

    Ok(HomePage {
        featured: featured(&books),
        popular: popular(&books),
        latest: tail(&books, LATEST_COUNT),
        special: tail(&books, SPECIAL_COUNT),
        books_by_category: by_category(&books, &categories),
        authors,
        stats,
    })
}
