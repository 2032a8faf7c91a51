use serde_aux::field_attributes::deserialize_option_number_from_string;
use validator::Validate;

use crate::{error::Error, util::normalize_name};

pub mod admin;
pub mod authors;
pub mod books;
pub mod categories;
pub mod collections;
pub mod home;
pub mod languages;
pub mod search;
pub mod statistics;
pub mod users;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct UrlPath {
    pub id: i64,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct MemberPath {
    pub id: i64,
    pub book_id: i64,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Default, Validate)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn per_page(&self, default: i64) -> i64 {
        self.per_page.unwrap_or(default)
    }
}

#[derive(serde::Serialize, Debug)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message {
            message: message.into(),
        }
    }
}

pub(crate) fn required_name(name: &str) -> Result<String, Error> {
    normalize_name(name).ok_or_else(|| Error::InvalidArgument("Name is required".to_string()))
}
