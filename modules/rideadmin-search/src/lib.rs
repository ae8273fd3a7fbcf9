//! Client-side search and filtering over document-store snapshots.

pub mod fields;
pub mod filter;
pub mod priority;

pub use filter::{filter, filter_by, DiscreteFilters, FieldSelector, SearchMode, Searchable};
pub use priority::{sort_by_priority, sort_verifications};
