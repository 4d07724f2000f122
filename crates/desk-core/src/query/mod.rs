//! Thread query model - filter specification and ordering strategies

mod filter;
mod ordering;

pub use filter::{parse_day_end, parse_day_start, AssigneeFilter, ThreadFilter};
pub use ordering::{SortDirection, SortKey, ThreadOrdering};
