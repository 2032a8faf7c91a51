pub mod filter;
pub mod pagination;
pub mod sort;

pub use filter::{BookPredicate, Criterion, FilterCriteria, FilterValue};
pub use pagination::{PageRequest, PaginationState};
pub use sort::BookSort;
