//! Column definitions.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::record::Record;
use crate::row::Row;
use crate::value::CellValue;

/// Id of the synthetic row-selection column.
pub const SELECT_COLUMN_ID: &str = "select";

/// Derives a display value from a record.
pub type ComputedFn = Arc<dyn Fn(&Record) -> CellValue + Send + Sync>;

/// Custom comparator: `(row_a, row_b, column_id) -> Ordering`.
pub type CompareFn = Arc<dyn Fn(&Row, &Row, &str) -> Ordering + Send + Sync>;

// =============================================================================
// Accessor
// =============================================================================

/// How a column reads its value from a record.
#[derive(Clone)]
pub enum Accessor {
    /// Read a field by name.
    Key(String),
    /// Compute the value with a pure function.
    Computed(ComputedFn),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// =============================================================================
// Strategies
// =============================================================================

/// Sorting strategy for a column.
#[derive(Clone, Default)]
pub enum SortFn {
    /// Numbers compare numerically, everything else by ordinal string order.
    #[default]
    Default,
    /// Compare the untransformed record field rather than the accessor output.
    ///
    /// Use when the accessor formats a value for display (dates, currency)
    /// but ordering must follow the original value.
    RawValue,
    /// Parse both raw values as numbers; unparseable values count as 0.
    NumericCoerced,
    /// Caller-supplied comparator.
    Custom(CompareFn),
}

impl fmt::Debug for SortFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortFn::Default => f.write_str("Default"),
            SortFn::RawValue => f.write_str("RawValue"),
            SortFn::NumericCoerced => f.write_str("NumericCoerced"),
            SortFn::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Serializable subset of [`SortFn`] (everything except `Custom`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedSortFn {
    #[default]
    Default,
    RawValue,
    NumericCoerced,
}

impl From<NamedSortFn> for SortFn {
    fn from(named: NamedSortFn) -> Self {
        match named {
            NamedSortFn::Default => SortFn::Default,
            NamedSortFn::RawValue => SortFn::RawValue,
            NamedSortFn::NumericCoerced => SortFn::NumericCoerced,
        }
    }
}

/// Filtering strategy for a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFn {
    /// Case-insensitive substring match.
    #[default]
    IncludesString,
    /// Fuzzy rank; rows whose score passes the threshold are kept.
    Fuzzy,
}

// =============================================================================
// Column
// =============================================================================

/// Static description of one data column.
///
/// # Example
///
/// ```
/// use gridstate::column::{Column, FilterFn, SortFn};
/// use gridstate::value::CellValue;
///
/// let columns = vec![
///     Column::key("name").header("Name").filterable(true).filter_fn(FilterFn::Fuzzy),
///     Column::key("age").sort_fn(SortFn::NumericCoerced),
///     Column::computed("initial", |r| {
///         CellValue::from(r.value("name").to_string().chars().next().map(String::from))
///     })
///     .sortable(false),
/// ];
/// assert_eq!(columns[0].id, "name");
/// ```
#[derive(Clone, Debug)]
pub struct Column {
    /// Unique, stable identifier.
    pub id: String,
    /// Header label.
    pub header: String,
    /// Value accessor.
    pub accessor: Accessor,
    /// Whether the column can be sorted.
    pub sortable: bool,
    /// Whether a per-column filter may be set.
    pub filterable: bool,
    /// Whether the global filter searches this column.
    pub global_filter: bool,
    /// Comparator used when sorting by this column.
    pub sort_fn: SortFn,
    /// Predicate used by this column's filter.
    pub filter_fn: FilterFn,
    /// Footer label, if the column has a footer.
    pub footer: Option<String>,
    /// Set only on the column built by [`Column::selection`].
    synthetic: bool,
}

impl Column {
    /// Creates a column reading the given field. The field name is the id.
    pub fn key(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::with_accessor(field.clone(), Accessor::Key(field))
    }

    /// Creates a column computing its value from the whole record.
    pub fn computed<F>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Record) -> CellValue + Send + Sync + 'static,
    {
        Self::with_accessor(id.into(), Accessor::Computed(Arc::new(f)))
    }

    fn with_accessor(id: String, accessor: Accessor) -> Self {
        Self {
            header: id.clone(),
            id,
            accessor,
            sortable: true,
            filterable: false,
            global_filter: true,
            sort_fn: SortFn::Default,
            filter_fn: FilterFn::IncludesString,
            footer: None,
            synthetic: false,
        }
    }

    /// The synthetic selection column.
    pub fn selection() -> Self {
        Self {
            sortable: false,
            filterable: false,
            global_filter: false,
            header: String::new(),
            synthetic: true,
            ..Self::computed(SELECT_COLUMN_ID, |_| CellValue::Null)
        }
    }

    /// Override the id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the header label.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the footer label.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn global_filter(mut self, enabled: bool) -> Self {
        self.global_filter = enabled;
        self
    }

    pub fn sort_fn(mut self, sort_fn: SortFn) -> Self {
        self.sort_fn = sort_fn;
        self
    }

    pub fn filter_fn(mut self, filter_fn: FilterFn) -> Self {
        self.filter_fn = filter_fn;
        self
    }

    /// Returns `true` for the synthetic selection column.
    ///
    /// A host column that happens to use the id `select` is a data column.
    pub fn is_selection(&self) -> bool {
        self.synthetic
    }

    /// The accessor's value for a record.
    pub fn value(&self, record: &Record) -> CellValue {
        match &self.accessor {
            Accessor::Key(key) => record.value(key),
            Accessor::Computed(f) => f(record),
        }
    }

    /// Field holding this column's untransformed value.
    ///
    /// The accessor key for key columns, the column id otherwise.
    pub fn raw_field(&self) -> &str {
        match &self.accessor {
            Accessor::Key(key) => key,
            Accessor::Computed(_) => &self.id,
        }
    }

    /// The untransformed record value for this column.
    pub fn raw_value(&self, record: &Record) -> CellValue {
        record.value(self.raw_field())
    }
}

/// Drops columns whose id repeats an earlier column's id.
pub fn dedupe_columns(columns: Vec<Column>) -> Vec<Column> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|column| {
            let fresh = seen.insert(column.id.clone());
            if !fresh {
                warn!("Dropping duplicate column id '{}'", column.id);
            }
            fresh
        })
        .collect()
}

// =============================================================================
// ColumnSpec
// =============================================================================

/// Serializable definition of a field-backed column.
///
/// ```json
/// { "key": "age", "header": "Age", "sort_fn": "numeric_coerced" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Record field to read.
    pub key: String,
    /// Column id; defaults to `key`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default = "default_true")]
    pub global_filter: bool,
    #[serde(default)]
    pub sort_fn: NamedSortFn,
    #[serde(default)]
    pub filter_fn: FilterFn,
}

fn default_true() -> bool {
    true
}

impl From<ColumnSpec> for Column {
    fn from(spec: ColumnSpec) -> Self {
        let mut column = Column::key(spec.key);
        if let Some(id) = spec.id {
            column = column.id(id);
        }
        column.header = spec.header.unwrap_or_else(|| column.id.clone());
        column.footer = spec.footer;
        column
            .sortable(spec.sortable)
            .filterable(spec.filterable)
            .global_filter(spec.global_filter)
            .sort_fn(spec.sort_fn.into())
            .filter_fn(spec.filter_fn)
    }
}

/// Converts a JSON array of [`ColumnSpec`]s into columns.
///
/// A non-array value yields no columns; malformed entries are skipped.
pub fn columns_from_json(value: serde_json::Value) -> Vec<Column> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            warn!(
                "Columns are not an array ({}); treating as empty",
                crate::record::json_kind(&other)
            );
            return Vec::new();
        }
    };

    let columns = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<ColumnSpec>(item) {
            Ok(spec) => Some(Column::from(spec)),
            Err(e) => {
                warn!("Skipping column {}: {}", index, e);
                None
            }
        })
        .collect();

    dedupe_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_column_defaults() {
        let column = Column::key("age");
        assert_eq!(column.id, "age");
        assert_eq!(column.header, "age");
        assert!(column.sortable);
        assert!(!column.filterable);
        assert!(column.global_filter);
        assert!(column.footer.is_none());
    }

    #[test]
    fn test_computed_raw_field_is_id() {
        let column = Column::computed("dob", |r| CellValue::from(format!("on {}", r.value("dob"))));
        let record = Record::new().set("dob", "1990-01-02");
        assert_eq!(column.value(&record), CellValue::from("on 1990-01-02"));
        assert_eq!(column.raw_value(&record), CellValue::from("1990-01-02"));
    }

    #[test]
    fn test_only_built_selection_column_is_synthetic() {
        assert!(Column::selection().is_selection());
        assert!(!Column::key(SELECT_COLUMN_ID).is_selection());
        assert!(!Column::key("plan").id(SELECT_COLUMN_ID).is_selection());
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let columns = dedupe_columns(vec![
            Column::key("a").header("first"),
            Column::key("b"),
            Column::key("a").header("second"),
        ]);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].header, "first");
    }

    #[test]
    fn test_columns_from_json() {
        let columns = columns_from_json(serde_json::json!([
            {"key": "age", "sort_fn": "numeric_coerced", "filterable": true},
            {"nokey": true},
            {"key": "name", "id": "full_name", "header": "Name"}
        ]));
        assert_eq!(columns.len(), 2);
        assert!(matches!(columns[0].sort_fn, SortFn::NumericCoerced));
        assert!(columns[0].filterable);
        assert_eq!(columns[1].id, "full_name");
        assert_eq!(columns[1].raw_field(), "name");
        assert!(columns_from_json(serde_json::json!("nope")).is_empty());
    }
}
