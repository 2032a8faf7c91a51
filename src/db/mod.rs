use sqlx::{Postgres, Transaction};

pub mod authors;
pub mod books;
pub mod categories;
pub mod collections;
pub mod error;
pub mod languages;
pub mod statistics;
pub mod users;

pub type PostgresTransaction = Transaction<'static, Postgres>;
