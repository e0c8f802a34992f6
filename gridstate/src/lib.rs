//! Grid state engine
//!
//! Turns a dataset, column definitions and interaction state (filters,
//! sorting, pagination, column visibility and order, row selection) into the
//! exact rows and columns to render, and keeps that state in step with a
//! host that controls part of it.

pub mod column;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod export;
pub mod layout;
pub mod pipeline;
pub mod predicate;
pub mod record;
pub mod row;
pub mod selection;
pub mod sync;
pub mod value;

/// Common imports.
pub mod prelude {
    pub use crate::column::Column;
    pub use crate::column::FilterFn;
    pub use crate::column::SortFn;
    pub use crate::config::GridConfig;
    pub use crate::config::GridFile;
    pub use crate::debounce::AsyncDebouncer;
    pub use crate::debounce::Debouncer;
    pub use crate::engine::GridEngine;
    pub use crate::engine::GridSnapshot;
    pub use crate::error::ConfigError;
    pub use crate::error::FieldError;
    pub use crate::export::ExportHeader;
    pub use crate::export::ExportPayload;
    pub use crate::layout::ColumnVisibility;
    pub use crate::pipeline::Pagination;
    pub use crate::pipeline::SortDescriptor;
    pub use crate::pipeline::SortDirection;
    pub use crate::record::Record;
    pub use crate::row::Row;
    pub use crate::row::RowId;
    pub use crate::sync::HostProps;
    pub use crate::value::CellValue;
}
