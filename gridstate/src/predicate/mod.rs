//! Row predicates and comparators.
//!
//! Pure functions: does a value match a filter query, and how do two rows
//! order by a column.

mod filter;
mod sort;

pub use filter::*;
pub use sort::*;
