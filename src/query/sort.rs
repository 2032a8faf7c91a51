#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    #[default]
    Title,
    Id,
}

impl BookSort {
    /// ORDER BY list; `b.id` breaks ties so pages stay stable.
    pub fn order_by(&self) -> &'static str {
        match self {
            BookSort::Title => "b.title, b.id",
            BookSort::Id => "b.id",
        }
    }
}

impl From<&str> for BookSort {
    /// Unknown keys fall back to title order.
    fn from(value: &str) -> Self {
        match value.trim() {
            "id" | "year" | "year_asc" | "title_desc" => BookSort::Id,
            _ => BookSort::Title,
        }
    }
}
