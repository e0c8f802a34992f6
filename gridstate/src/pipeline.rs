//! Row model pipeline: filter, then sort, then paginate.
//!
//! [`compute`] is a pure function of its input. It never mutates rows and
//! always returns fresh index sequences. Out-of-range pagination is not
//! corrected here; it yields an empty page.

use std::collections::BTreeMap;

use log::trace;
use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::column::FilterFn;
use crate::predicate::MatchScratch;
use crate::predicate::Predicate;
use crate::predicate::SortKey;
use crate::row::Row;

/// Per-column filter values keyed by column id.
pub type ColumnFilters = BTreeMap<String, String>;

// =============================================================================
// Sorting state
// =============================================================================

/// Sort direction of one descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
    /// Present but inactive; skipped by the pipeline.
    None,
}

/// One sort key. Earlier descriptors take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }

    pub fn asc(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Ascending)
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Descending)
    }
}

// =============================================================================
// Pagination state
// =============================================================================

/// Current page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: usize,
    /// Always at least 1.
    pub page_size: usize,
}

impl Pagination {
    /// Creates a pagination state; a zero page size becomes 1.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    /// `ceil(total / page_size)`, never less than 1.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Index of the first row on the current page.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Options that shape filtering without being part of per-column state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Predicate used by the global filter.
    pub global_filter_fn: FilterFn,
    /// Minimum fuzzy score for a row to pass a fuzzy predicate.
    pub fuzzy_min_score: u32,
}

/// Everything the pipeline reads.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    pub rows: &'a [Row],
    pub columns: &'a [Column],
    pub global_filter: &'a str,
    pub column_filters: &'a ColumnFilters,
    pub sorting: &'a [SortDescriptor],
    pub pagination: Pagination,
    pub options: FilterOptions,
}

/// The derived view of the dataset for one state.
///
/// Sequences hold indices into the row slice the model was computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowModel {
    /// Rows passing every filter, in dataset order.
    pub filtered: Vec<usize>,
    /// Filtered rows in sort order.
    pub sorted: Vec<usize>,
    /// The current page of `sorted`.
    pub page: Vec<usize>,
    pub page_count: usize,
}

impl RowModel {
    pub fn filtered_rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        self.filtered.iter().map(|&i| &rows[i]).collect()
    }

    pub fn sorted_rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        self.sorted.iter().map(|&i| &rows[i]).collect()
    }

    pub fn page_rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        self.page.iter().map(|&i| &rows[i]).collect()
    }
}

/// Runs filter, sort and paginate over the input.
pub fn compute(input: &PipelineInput<'_>) -> RowModel {
    let filtered = filter_rows(input);
    let sorted = sort_rows(input.rows, input.columns, input.sorting, &filtered);
    let page_count = input.pagination.page_count(sorted.len());
    let page = paginate(&sorted, input.pagination);

    trace!(
        "Row model: {} rows, {} filtered, page {}/{} ({} rows)",
        input.rows.len(),
        filtered.len(),
        input.pagination.page_index.saturating_add(1),
        page_count,
        page.len()
    );

    RowModel {
        filtered,
        sorted,
        page,
        page_count,
    }
}

/// Keeps rows that pass every column filter and, when set, the global filter.
pub fn filter_rows(input: &PipelineInput<'_>) -> Vec<usize> {
    let column_predicates: Vec<(&Column, Predicate)> = input
        .column_filters
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .filter_map(|(id, value)| {
            let Some(column) = input.columns.iter().find(|c| &c.id == id) else {
                trace!("Ignoring filter on unknown column '{}'", id);
                return None;
            };
            let predicate =
                Predicate::compile(value, column.filter_fn, input.options.fuzzy_min_score);
            Some((column, predicate))
        })
        .collect();

    let global = Predicate::compile(
        input.global_filter,
        input.options.global_filter_fn,
        input.options.fuzzy_min_score,
    );
    let global_columns: Vec<&Column> = input
        .columns
        .iter()
        .filter(|c| c.global_filter && !c.is_selection())
        .collect();

    if column_predicates.is_empty() && global.is_pass() {
        return (0..input.rows.len()).collect();
    }

    let mut scratch = MatchScratch::new();
    input
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let columns_pass = column_predicates.iter().all(|(column, predicate)| {
                predicate.matches(&column.value(&row.record), &mut scratch)
            });
            columns_pass
                && (global.is_pass()
                    || global_columns
                        .iter()
                        .any(|column| global.matches(&column.value(&row.record), &mut scratch)))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Stable multi-key sort of `indices`.
///
/// Descriptors naming unknown or unsortable columns, or with direction
/// `None`, are skipped.
pub fn sort_rows(
    rows: &[Row],
    columns: &[Column],
    sorting: &[SortDescriptor],
    indices: &[usize],
) -> Vec<usize> {
    let keys: Vec<SortKey<'_>> = sorting
        .iter()
        .filter_map(|descriptor| {
            let descending = match descriptor.direction {
                SortDirection::Ascending => false,
                SortDirection::Descending => true,
                SortDirection::None => return None,
            };
            let column = columns
                .iter()
                .find(|c| c.id == descriptor.column_id && c.sortable)?;
            Some(SortKey::resolve(column, descending, rows, indices))
        })
        .collect();

    let mut sorted = indices.to_vec();
    if keys.is_empty() {
        return sorted;
    }

    sorted.sort_by(|&a, &b| {
        keys.iter()
            .map(|key| key.compare(rows, a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

/// Slices the current page; out-of-range pages are empty.
pub fn paginate(sorted: &[usize], pagination: Pagination) -> Vec<usize> {
    let start = pagination.offset().min(sorted.len());
    let end = start.saturating_add(pagination.page_size).min(sorted.len());
    sorted[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::SortFn;
    use crate::record::Record;
    use crate::row::ingest;

    fn people() -> Vec<Row> {
        ingest(
            vec![
                Record::new().set("name", "David").set("age", 40),
                Record::new().set("name", "Denice").set("age", 31),
                Record::new().set("name", "Danielle Vance").set("age", 40),
                Record::new().set("name", "Bob").set("age", 25),
            ],
            None,
        )
    }

    fn input<'a>(
        rows: &'a [Row],
        columns: &'a [Column],
        filters: &'a ColumnFilters,
        sorting: &'a [SortDescriptor],
    ) -> PipelineInput<'a> {
        PipelineInput {
            rows,
            columns,
            global_filter: "",
            column_filters: filters,
            sorting,
            pagination: Pagination::new(0, 10),
            options: FilterOptions::default(),
        }
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let rows = people();
        let columns = vec![Column::key("name"), Column::key("age")];
        let filters = ColumnFilters::new();
        let model = compute(&input(&rows, &columns, &filters, &[]));
        assert_eq!(model.filtered, vec![0, 1, 2, 3]);
        assert_eq!(model.sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_global_filter_exact_vs_fuzzy() {
        let rows = people();
        let columns = vec![Column::key("name"), Column::key("age")];
        let filters = ColumnFilters::new();
        let mut input = input(&rows, &columns, &filters, &[]);
        input.global_filter = "dav";

        assert_eq!(filter_rows(&input), vec![0]);

        input.options.global_filter_fn = FilterFn::Fuzzy;
        assert_eq!(filter_rows(&input), vec![0, 2]);
    }

    #[test]
    fn test_global_filter_skips_excluded_columns() {
        let rows = people();
        let columns = vec![Column::key("name").global_filter(false), Column::key("age")];
        let filters = ColumnFilters::new();
        let mut input = input(&rows, &columns, &filters, &[]);
        input.global_filter = "dav";
        assert!(filter_rows(&input).is_empty());
        input.global_filter = "25";
        assert_eq!(filter_rows(&input), vec![3]);
    }

    #[test]
    fn test_column_filters_are_conjunctive() {
        let rows = people();
        let columns = vec![Column::key("name"), Column::key("age")];
        let mut filters = ColumnFilters::new();
        filters.insert("name".into(), "d".into());
        filters.insert("age".into(), "40".into());
        let model = compute(&input(&rows, &columns, &filters, &[]));
        assert_eq!(model.filtered, vec![0, 2]);
    }

    #[test]
    fn test_multi_key_sort_is_stable() {
        let rows = people();
        let columns = vec![Column::key("name"), Column::key("age")];
        let filters = ColumnFilters::new();
        let sorting = vec![SortDescriptor::desc("age")];
        let model = compute(&input(&rows, &columns, &filters, &sorting));
        // David and Danielle tie on age and keep input order.
        assert_eq!(model.sorted, vec![0, 2, 1, 3]);

        let sorting = vec![SortDescriptor::desc("age"), SortDescriptor::asc("name")];
        let model = compute(&input(&rows, &columns, &filters, &sorting));
        assert_eq!(model.sorted, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_skips_unsortable_and_inactive_descriptors() {
        let rows = people();
        let columns = vec![Column::key("name").sortable(false), Column::key("age")];
        let filters = ColumnFilters::new();
        let sorting = vec![
            SortDescriptor::asc("name"),
            SortDescriptor::new("age", SortDirection::None),
            SortDescriptor::asc("missing"),
        ];
        let model = compute(&input(&rows, &columns, &filters, &sorting));
        assert_eq!(model.sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_numeric_coerced_scenario() {
        let rows = ingest(
            vec![
                Record::new().set("age", "5"),
                Record::new().set("age", "abc"),
                Record::new().set("age", "20"),
            ],
            None,
        );
        let columns = vec![Column::key("age").sort_fn(SortFn::NumericCoerced)];
        let filters = ColumnFilters::new();
        let sorting = vec![SortDescriptor::asc("age")];
        let model = compute(&input(&rows, &columns, &filters, &sorting));
        assert_eq!(model.sorted, vec![1, 0, 2]);
    }

    #[test]
    fn test_page_count_and_slices() {
        assert_eq!(Pagination::new(0, 10).page_count(0), 1);
        assert_eq!(Pagination::new(0, 10).page_count(10), 1);
        assert_eq!(Pagination::new(0, 10).page_count(11), 2);
        assert_eq!(Pagination::new(0, 0).page_size, 1);

        let sorted: Vec<usize> = (0..25).collect();
        assert_eq!(paginate(&sorted, Pagination::new(2, 10)), (20..25).collect::<Vec<_>>());
        assert!(paginate(&sorted, Pagination::new(3, 10)).is_empty());
        assert!(paginate(&sorted, Pagination::new(usize::MAX, 10)).is_empty());
    }
}
