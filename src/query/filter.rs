//! Book filtering.
//!
//! A [`FilterCriteria`] is turned into an ordered list of [`Criterion`]s and
//! folded into a [`BookPredicate`]: a conjunction of SQL clauses over the
//! `books b` row together with the values bound to its placeholders, in the
//! order the clauses reference them.
//!
//! Every clause is either a condition on `b` itself or a correlated
//! `EXISTS`, so applying the predicate never multiplies book rows and the
//! same predicate serves both counting and fetching.

use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FilterCriteria {
    pub search: Option<String>,
    pub category: Option<String>,
    pub language_id: Option<i64>,
    pub author_id: Option<i64>,
    pub include_collection_id: Option<i64>,
    pub exclude_collection_id: Option<i64>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FilterCriteria {
    /// Trims text fields and drops the ones left empty.
    pub fn normalize(self) -> Self {
        FilterCriteria {
            search: trimmed(self.search),
            category: trimmed(self.category),
            ..self
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = trimmed(Some(search.into()));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = trimmed(Some(category.into()));
        self
    }

    pub fn with_language(mut self, language_id: i64) -> Self {
        self.language_id = Some(language_id);
        self
    }

    pub fn with_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_collection(mut self, collection_id: i64) -> Self {
        self.include_collection_id = Some(collection_id);
        self
    }

    pub fn not_in_collection(mut self, collection_id: i64) -> Self {
        self.exclude_collection_id = Some(collection_id);
        self
    }

    /// Present constraints, in binding order.
    pub fn criteria(&self) -> Vec<Criterion> {
        let mut criteria = Vec::new();

        if let Some(search) = trimmed(self.search.clone()) {
            criteria.push(Criterion::Search(search));
        }
        if let Some(category) = trimmed(self.category.clone()) {
            criteria.push(Criterion::Category(category));
        }
        if let Some(language_id) = self.language_id {
            criteria.push(Criterion::Language(language_id));
        }
        if let Some(author_id) = self.author_id {
            criteria.push(Criterion::Author(author_id));
        }
        if let Some(collection_id) = self.include_collection_id {
            criteria.push(Criterion::InCollection(collection_id));
        }
        if let Some(collection_id) = self.exclude_collection_id {
            criteria.push(Criterion::NotInCollection(collection_id));
        }

        criteria
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive substring of the title, an author name or a category name.
    Search(String),
    /// Exact, case-sensitive category name.
    Category(String),
    Language(i64),
    Author(i64),
    InCollection(i64),
    NotInCollection(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Sql(&'static str),
    Bind(FilterValue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause(Vec<Fragment>);

/// Escapes LIKE wildcards so the text is matched literally.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Criterion {
    pub fn clause(&self) -> Clause {
        use Fragment::{Bind, Sql};

        let fragments = match self {
            Criterion::Search(text) => {
                let pattern = like_pattern(text);
                vec![
                    Sql("(b.title ILIKE "),
                    Bind(FilterValue::Text(pattern.clone())),
                    Sql(" OR EXISTS (SELECT 1 FROM book_authors fba \
                         JOIN authors fa ON fa.id = fba.author_id \
                         WHERE fba.book_id = b.id AND fa.name ILIKE "),
                    Bind(FilterValue::Text(pattern.clone())),
                    Sql(") OR EXISTS (SELECT 1 FROM book_categories fbc \
                         JOIN categories fc ON fc.id = fbc.category_id \
                         WHERE fbc.book_id = b.id AND fc.name ILIKE "),
                    Bind(FilterValue::Text(pattern)),
                    Sql("))"),
                ]
            }
            Criterion::Category(name) => vec![
                Sql("EXISTS (SELECT 1 FROM book_categories fbc \
                     JOIN categories fc ON fc.id = fbc.category_id \
                     WHERE fbc.book_id = b.id AND fc.name = "),
                Bind(FilterValue::Text(name.clone())),
                Sql(")"),
            ],
            Criterion::Language(id) => vec![
                Sql("EXISTS (SELECT 1 FROM book_languages fbl \
                     WHERE fbl.book_id = b.id AND fbl.language_id = "),
                Bind(FilterValue::Int(*id)),
                Sql(")"),
            ],
            Criterion::Author(id) => vec![
                Sql("EXISTS (SELECT 1 FROM book_authors fba \
                     WHERE fba.book_id = b.id AND fba.author_id = "),
                Bind(FilterValue::Int(*id)),
                Sql(")"),
            ],
            Criterion::InCollection(id) => vec![
                Sql("EXISTS (SELECT 1 FROM collection_books fcb \
                     WHERE fcb.book_id = b.id AND fcb.collection_id = "),
                Bind(FilterValue::Int(*id)),
                Sql(")"),
            ],
            Criterion::NotInCollection(id) => vec![
                Sql("NOT EXISTS (SELECT 1 FROM collection_books fcb \
                     WHERE fcb.book_id = b.id AND fcb.collection_id = "),
                Bind(FilterValue::Int(*id)),
                Sql(")"),
            ],
        };

        Clause(fragments)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPredicate {
    clauses: Vec<Clause>,
}

impl From<&FilterCriteria> for BookPredicate {
    fn from(criteria: &FilterCriteria) -> Self {
        criteria
            .criteria()
            .iter()
            .fold(BookPredicate::default(), |predicate, criterion| {
                predicate.and(criterion.clause())
            })
    }
}

impl BookPredicate {
    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// True when the predicate matches every book.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn params(&self) -> Vec<&FilterValue> {
        self.clauses
            .iter()
            .flat_map(|clause| clause.0.iter())
            .filter_map(|fragment| match fragment {
                Fragment::Bind(value) => Some(value),
                Fragment::Sql(_) => None,
            })
            .collect()
    }

    /// Renders ` WHERE ...` with `$n` placeholders numbered from `first_placeholder`.
    /// An empty predicate renders as an empty string.
    pub fn to_sql(&self, first_placeholder: usize) -> (String, Vec<FilterValue>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        for (index, clause) in self.clauses.iter().enumerate() {
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            for fragment in &clause.0 {
                match fragment {
                    Fragment::Sql(text) => sql.push_str(text),
                    Fragment::Bind(value) => {
                        sql.push_str(&format!("${}", first_placeholder + params.len()));
                        params.push(value.clone());
                    }
                }
            }
        }

        (sql, params)
    }

    /// Appends ` WHERE ...` to the builder, binding each value in order.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (index, clause) in self.clauses.iter().enumerate() {
            builder.push(if index == 0 { " WHERE " } else { " AND " });
            for fragment in &clause.0 {
                match fragment {
                    Fragment::Sql(text) => {
                        builder.push(*text);
                    }
                    Fragment::Bind(FilterValue::Text(value)) => {
                        builder.push_bind(value.clone());
                    }
                    Fragment::Bind(FilterValue::Int(value)) => {
                        builder.push_bind(*value);
                    }
                }
            }
        }
    }
}
