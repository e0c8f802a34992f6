//! The grid state engine.
//!
//! [`GridEngine`] owns the [`GridState`] and the derived [`RowModel`]. Every
//! mutator replaces the relevant piece of state, recomputes the row model,
//! clamps the page index into range and only then notifies the host. Readers
//! therefore always see a model that matches the latest state.
//!
//! # Example
//!
//! ```
//! use gridstate::prelude::*;
//!
//! let columns = vec![Column::key("name"), Column::key("age")];
//! let records = vec![
//!     Record::new().set("name", "David").set("age", 40),
//!     Record::new().set("name", "Denice").set("age", 31),
//! ];
//! let mut engine = GridEngine::new(columns, records, GridConfig::default());
//!
//! engine.set_global_filter("dav");
//! assert_eq!(engine.page_rows().len(), 1);
//!
//! engine.set_global_filter("");
//! engine.toggle_sort("age", false);
//! assert_eq!(engine.page_rows()[0].record.value("name"), CellValue::from("Denice"));
//! ```

mod snapshot;

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::time::Instant;

use log::debug;
use log::warn;

use crate::column::dedupe_columns;
use crate::column::Column;
use crate::column::SELECT_COLUMN_ID;
use crate::config::GridConfig;
use crate::debounce::Debouncer;
use crate::export::select_export_rows;
use crate::export::ExportPayload;
use crate::layout::ColumnLayout;
use crate::layout::ColumnVisibility;
use crate::pipeline;
use crate::pipeline::ColumnFilters;
use crate::pipeline::FilterOptions;
use crate::pipeline::Pagination;
use crate::pipeline::PipelineInput;
use crate::pipeline::RowModel;
use crate::pipeline::SortDescriptor;
use crate::pipeline::SortDirection;
use crate::record::Record;
use crate::row::ingest;
use crate::row::Row;
use crate::row::RowId;
use crate::selection::RowSelection;
use crate::sync::ChangeNotifier;
use crate::sync::HostProps;
use crate::sync::PropSync;

pub use snapshot::*;

type SelectionCallback = Box<dyn FnMut(&[Record])>;
type VisibilityCallback = Box<dyn FnMut(&ColumnVisibility)>;

/// Everything needed to reproduce a row model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    pub global_filter: String,
    pub column_filters: ColumnFilters,
    pub sorting: Vec<SortDescriptor>,
    pub layout: ColumnLayout,
    pub selection: RowSelection,
    pub pagination: Pagination,
    pub pagination_enabled: bool,
}

impl Default for GridState {
    fn default() -> Self {
        Self {
            global_filter: String::new(),
            column_filters: ColumnFilters::new(),
            sorting: Vec::new(),
            layout: ColumnLayout::default(),
            selection: RowSelection::new(),
            pagination: Pagination::default(),
            pagination_enabled: true,
        }
    }
}

/// Stateful grid over one dataset.
pub struct GridEngine {
    config: GridConfig,
    /// Host columns, deduplicated.
    base_columns: Vec<Column>,
    /// `base_columns` with the selection column prepended when selectable.
    columns: Vec<Column>,
    rows: Vec<Row>,
    state: GridState,
    model: RowModel,
    selectable: bool,
    /// Page size restored when pagination is re-enabled.
    default_page_size: usize,

    global_input: Debouncer<String>,
    column_inputs: BTreeMap<String, Debouncer<String>>,

    prop_sync: PropSync,
    visibility_notifier: ChangeNotifier<ColumnVisibility>,
    selection_notifier: ChangeNotifier<Vec<RowId>>,
    on_selection_change: Option<SelectionCallback>,
    on_visibility_change: Option<VisibilityCallback>,
}

impl GridEngine {
    /// Creates an engine and computes the initial row model.
    ///
    /// No change callback fires for the initial state.
    pub fn new(columns: Vec<Column>, records: Vec<Record>, config: GridConfig) -> Self {
        let rows = ingest(records, config.row_id_field.as_deref());
        let base_columns = dedupe_columns(columns);
        let selectable = config.selectable;
        let columns = with_selection_column(&base_columns, selectable);
        let default_page_size = config.initial_page_size.max(1);

        let page_size = if config.pagination_enabled {
            default_page_size
        } else {
            rows.len().max(1)
        };
        let state = GridState {
            layout: ColumnLayout::new(
                config.initial_column_visibility.clone(),
                config.initial_column_order.clone(),
            ),
            pagination: Pagination::new(config.initial_page_index, page_size),
            pagination_enabled: config.pagination_enabled,
            ..GridState::default()
        };

        debug!(
            "Creating grid: {} columns, {} rows, page size {}",
            columns.len(),
            rows.len(),
            page_size
        );

        let mut engine = Self {
            global_input: Debouncer::new(config.debounce()),
            column_inputs: BTreeMap::new(),
            prop_sync: PropSync::new(config.host_props()),
            visibility_notifier: ChangeNotifier::new(state.layout.visibility.clone()),
            selection_notifier: ChangeNotifier::new(Vec::new()),
            on_selection_change: None,
            on_visibility_change: None,
            config,
            base_columns,
            columns,
            rows,
            state,
            model: RowModel::default(),
            selectable,
            default_page_size,
        };
        engine.recompute();
        engine
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn model(&self) -> &RowModel {
        &self.model
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// All columns, including the selection column when enabled.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    /// Visible columns in display order.
    pub fn active_columns(&self) -> Vec<&Column> {
        self.state.layout.resolve(&self.columns)
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.model.filtered_rows(&self.rows)
    }

    pub fn sorted_rows(&self) -> Vec<&Row> {
        self.model.sorted_rows(&self.rows)
    }

    pub fn page_rows(&self) -> Vec<&Row> {
        self.model.page_rows(&self.rows)
    }

    pub fn global_filter(&self) -> &str {
        &self.state.global_filter
    }

    pub fn column_filter(&self, id: &str) -> Option<&str> {
        self.state.column_filters.get(id).map(String::as_str)
    }

    pub fn sorting(&self) -> &[SortDescriptor] {
        &self.state.sorting
    }

    pub fn sort_direction(&self, id: &str) -> Option<SortDirection> {
        self.state
            .sorting
            .iter()
            .find(|d| d.column_id == id)
            .map(|d| d.direction)
    }

    pub fn pagination(&self) -> Pagination {
        self.state.pagination
    }

    pub fn column_visibility(&self) -> &ColumnVisibility {
        &self.state.layout.visibility
    }

    pub fn column_order(&self) -> &[String] {
        &self.state.layout.order
    }

    // =========================================================================
    // Data and columns
    // =========================================================================

    /// Replaces the dataset.
    ///
    /// Selected ids that no longer exist are dropped. The page index resets.
    pub fn set_data(&mut self, records: Vec<Record>) {
        self.rows = ingest(records, self.config.row_id_field.as_deref());
        let known: HashSet<&RowId> = self.rows.iter().map(|r| &r.id).collect();
        if self.state.selection.retain_known(&known) {
            debug!("Dropped selected rows missing from new data");
        }
        if !self.state.pagination_enabled {
            self.state.pagination.page_size = self.rows.len().max(1);
        }
        self.state.pagination.page_index = 0;
        debug!("Data replaced: {} rows", self.rows.len());
        self.commit();
    }

    /// Replaces the column definitions.
    ///
    /// Filters and sort keys naming removed columns are dropped.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.base_columns = dedupe_columns(columns);
        self.columns = with_selection_column(&self.base_columns, self.selectable);

        let columns = &self.columns;
        self.state
            .column_filters
            .retain(|id, _| columns.iter().any(|c| &c.id == id));
        self.state
            .sorting
            .retain(|d| columns.iter().any(|c| c.id == d.column_id));
        self.column_inputs
            .retain(|id, _| columns.iter().any(|c| &c.id == id));
        debug!("Columns replaced: {}", self.columns.len());
        self.commit();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Sets the global filter. Returns true if it changed.
    pub fn set_global_filter(&mut self, value: &str) -> bool {
        if self.state.global_filter == value {
            return false;
        }
        debug!("Global filter: '{}'", value);
        self.state.global_filter = value.to_string();
        self.state.pagination.page_index = 0;
        self.commit();
        true
    }

    /// Sets one column's filter; an empty value clears it.
    ///
    /// Unknown and non-filterable columns are ignored. Returns true if the
    /// filter changed.
    pub fn set_column_filter(&mut self, id: &str, value: &str) -> bool {
        if !self.columns.iter().any(|c| c.id == id && c.filterable) {
            debug!("Ignoring filter on non-filterable column '{}'", id);
            return false;
        }
        let changed = if value.is_empty() {
            self.state.column_filters.remove(id).is_some()
        } else {
            self.state
                .column_filters
                .insert(id.to_string(), value.to_string())
                .is_none_or(|old| old != value)
        };
        if changed {
            debug!("Column filter '{}': '{}'", id, value);
            self.state.pagination.page_index = 0;
            self.commit();
        }
        changed
    }

    pub fn clear_column_filters(&mut self) -> bool {
        if self.state.column_filters.is_empty() {
            return false;
        }
        self.state.column_filters.clear();
        self.state.pagination.page_index = 0;
        self.commit();
        true
    }

    /// Buffers global filter input; it applies once input pauses.
    pub fn input_global_filter(&mut self, text: &str, now: Instant) {
        self.global_input.commit(text.to_string(), now);
    }

    /// Buffers column filter input; it applies once input pauses.
    pub fn input_column_filter(&mut self, id: &str, text: &str, now: Instant) {
        let delay = self.config.debounce();
        self.column_inputs
            .entry(id.to_string())
            .or_insert_with(|| Debouncer::new(delay))
            .commit(text.to_string(), now);
    }

    /// Applies every buffered input whose quiet period has elapsed.
    /// Returns true if any filter changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if let Some(value) = self.global_input.poll(now) {
            changed |= self.set_global_filter(&value);
        }
        let due: Vec<(String, String)> = self
            .column_inputs
            .iter_mut()
            .filter_map(|(id, debouncer)| debouncer.poll(now).map(|v| (id.clone(), v)))
            .collect();
        for (id, value) in due {
            changed |= self.set_column_filter(&id, &value);
        }
        changed
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.column_inputs
            .values()
            .filter_map(Debouncer::deadline)
            .chain(self.global_input.deadline())
            .min()
    }

    /// Cancels all buffered input. Also runs on drop.
    pub fn teardown(&mut self) {
        if self.global_input.cancel().is_some() {
            debug!("Cancelled pending global filter input");
        }
        for debouncer in self.column_inputs.values_mut() {
            debouncer.cancel();
        }
        self.column_inputs.clear();
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Replaces the sort sequence. Returns true if it changed.
    pub fn set_sorting(&mut self, sorting: Vec<SortDescriptor>) -> bool {
        if self.state.sorting == sorting {
            return false;
        }
        debug!("Sorting: {:?}", sorting);
        self.state.sorting = sorting;
        self.state.pagination.page_index = 0;
        self.commit();
        true
    }

    /// Cycles a column through ascending, descending and unsorted.
    ///
    /// With `multi`, the column is added to or updated within the existing
    /// sequence; otherwise it replaces the sequence. Returns false for
    /// unknown or unsortable columns.
    pub fn toggle_sort(&mut self, id: &str, multi: bool) -> bool {
        if !self.columns.iter().any(|c| c.id == id && c.sortable) {
            debug!("Ignoring sort on unsortable column '{}'", id);
            return false;
        }
        let next = match self.sort_direction(id) {
            None | Some(SortDirection::None) => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };

        let mut sorting = if multi {
            self.state.sorting.clone()
        } else {
            Vec::new()
        };
        match (next, sorting.iter().position(|d| d.column_id == id)) {
            (Some(direction), Some(pos)) => sorting[pos].direction = direction,
            (Some(direction), None) => sorting.push(SortDescriptor::new(id, direction)),
            (None, Some(pos)) => {
                sorting.remove(pos);
            }
            (None, None) => {}
        }
        self.set_sorting(sorting)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn page_count(&self) -> usize {
        self.model.page_count
    }

    /// Moves to a page, clamped into `[0, page_count - 1]`.
    pub fn set_page_index(&mut self, index: usize) -> bool {
        let clamped = index.min(self.model.page_count.saturating_sub(1));
        if clamped != index {
            debug!("Page index {} clamped to {}", index, clamped);
        }
        if clamped == self.state.pagination.page_index {
            return false;
        }
        self.state.pagination.page_index = clamped;
        self.commit();
        true
    }

    /// Moves to a 1-based page typed by a user. Empty input means the first
    /// page; text that is not a whole number is ignored.
    pub fn go_to_page_input(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return self.set_page_index(0);
        }
        match text.parse::<i64>() {
            Ok(page) => {
                let index = usize::try_from(page.saturating_sub(1)).unwrap_or(0);
                self.set_page_index(index)
            }
            Err(_) => {
                debug!("Ignoring page input '{}'", text);
                false
            }
        }
    }

    pub fn can_previous_page(&self) -> bool {
        self.state.pagination.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.state.pagination.page_index + 1 < self.model.page_count
    }

    pub fn next_page(&mut self) -> bool {
        self.can_next_page() && self.set_page_index(self.state.pagination.page_index + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.can_previous_page() && self.set_page_index(self.state.pagination.page_index - 1)
    }

    pub fn first_page(&mut self) -> bool {
        self.set_page_index(0)
    }

    pub fn last_page(&mut self) -> bool {
        self.set_page_index(self.model.page_count.saturating_sub(1))
    }

    /// Changes the page size, keeping the current top row on screen.
    ///
    /// While pagination is disabled the size is stored for when it is
    /// enabled again. Zero is rejected.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if size == 0 {
            warn!("Ignoring page size 0");
            return false;
        }
        if !self.state.pagination_enabled {
            let changed = self.default_page_size != size;
            self.default_page_size = size;
            return changed;
        }
        self.apply_page_size(size)
    }

    fn apply_page_size(&mut self, size: usize) -> bool {
        let current = self.state.pagination;
        if current.page_size == size {
            return false;
        }
        let top = current.offset();
        self.state.pagination = Pagination::new(top / size, size);
        debug!("Page size {} -> {}", current.page_size, size);
        self.commit();
        true
    }

    /// Configured page sizes plus the current one, sorted and deduplicated.
    pub fn page_size_options(&self) -> Vec<usize> {
        let mut options = self.config.page_size_options.clone();
        if self.state.pagination_enabled {
            options.push(self.state.pagination.page_size);
        }
        options.sort_unstable();
        options.dedup();
        options
    }

    // =========================================================================
    // Column visibility and order
    // =========================================================================

    /// Flips one column's visibility. Returns false for unknown columns.
    pub fn toggle_column(&mut self, id: &str) -> bool {
        if !self.columns.iter().any(|c| c.id == id) {
            return false;
        }
        self.state.layout.toggle_one(id);
        self.commit();
        true
    }

    /// Shows every column, or hides every column when all are visible.
    /// Returns the new visibility.
    pub fn toggle_all_columns(&mut self) -> bool {
        let visible = self.state.layout.toggle_all(&self.columns);
        self.commit();
        visible
    }

    pub fn set_column_visibility(&mut self, visibility: ColumnVisibility) -> bool {
        if self.state.layout.visibility == visibility {
            return false;
        }
        self.state.layout.visibility = visibility;
        self.commit();
        true
    }

    pub fn set_column_order(&mut self, order: Vec<String>) -> bool {
        if self.state.layout.order == order {
            return false;
        }
        debug!("Column order: {:?}", order);
        self.state.layout.order = order;
        self.commit();
        true
    }

    pub fn is_all_columns_visible(&self) -> bool {
        self.state.layout.is_all_visible(&self.columns)
    }

    /// Some but not all columns visible.
    pub fn is_some_columns_visible(&self) -> bool {
        self.state.layout.is_some_visible(&self.columns)
    }

    pub fn is_any_column_visible(&self) -> bool {
        !self.active_columns().is_empty()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Ids of the filtered rows in sort order.
    pub fn visible_row_ids(&self) -> Vec<RowId> {
        self.model
            .sorted
            .iter()
            .map(|&i| self.rows[i].id.clone())
            .collect()
    }

    /// Finds the row whose id prints as `text` (`#3` for index ids).
    pub fn find_row_id(&self, text: &str) -> Option<RowId> {
        self.rows
            .iter()
            .find(|r| r.id.to_string() == text)
            .map(|r| r.id.clone())
    }

    /// Toggles one row. Returns false for unknown ids.
    pub fn toggle_row(&mut self, id: &RowId) -> bool {
        if !self.rows.iter().any(|r| &r.id == id) {
            return false;
        }
        self.state.selection.toggle(id.clone());
        self.commit();
        true
    }

    /// Selects all filtered rows, or deselects them if all are selected.
    pub fn toggle_all_visible(&mut self) -> bool {
        let visible = self.visible_row_ids();
        let changed = self.state.selection.toggle_all_visible(&visible);
        if changed {
            self.commit();
        }
        changed
    }

    /// Selects the given rows, ignoring unknown ids.
    pub fn select_rows(&mut self, ids: &[RowId]) -> bool {
        let known: Vec<&RowId> = ids
            .iter()
            .filter(|id| self.rows.iter().any(|r| &r.id == *id))
            .collect();
        let changed = self.state.selection.select_all(known);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.state.selection.clear();
        if changed {
            self.commit();
        }
        changed
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.state.selection.is_selected(id)
    }

    /// Every filtered row is selected.
    pub fn all_selected(&self) -> bool {
        self.state.selection.all_selected(&self.visible_row_ids())
    }

    /// Some, but not all, filtered rows are selected.
    pub fn some_selected(&self) -> bool {
        self.state.selection.some_selected(&self.visible_row_ids())
    }

    /// Selected rows in dataset order, including rows hidden by filters.
    pub fn selected_rows(&self) -> Vec<&Row> {
        self.rows
            .iter()
            .filter(|r| self.state.selection.is_selected(&r.id))
            .collect()
    }

    // =========================================================================
    // Host integration
    // =========================================================================

    /// Applies host-controlled values that changed since the last call.
    ///
    /// Values are compared structurally, so passing an equal but freshly
    /// built value is a no-op. Returns true if anything was applied.
    pub fn sync_props(&mut self, props: &HostProps) -> bool {
        let changes = self.prop_sync.diff(props);
        if changes.is_empty() {
            return false;
        }

        if let Some(visibility) = changes.column_visibility {
            self.state.layout.visibility = visibility;
        }
        if let Some(order) = changes.column_order {
            self.state.layout.order = order;
        }
        if let Some(size) = changes.page_size {
            if size == 0 {
                warn!("Ignoring host page size 0");
            } else {
                self.default_page_size = size;
                if self.state.pagination_enabled {
                    let top = self.state.pagination.offset();
                    self.state.pagination = Pagination::new(top / size, size);
                }
            }
        }
        if let Some(enabled) = changes.pagination_enabled {
            self.state.pagination_enabled = enabled;
            let size = if enabled {
                self.default_page_size
            } else {
                self.rows.len().max(1)
            };
            debug!("Pagination enabled: {} (page size {})", enabled, size);
            self.state.pagination = Pagination::new(0, size);
        }

        self.commit();
        true
    }

    /// Registers the selection callback and enables the selection column.
    ///
    /// The callback receives the selected records in dataset order each time
    /// the selection changes. It does not fire on registration.
    pub fn on_selection_change<F>(&mut self, callback: F)
    where
        F: FnMut(&[Record]) + 'static,
    {
        self.on_selection_change = Some(Box::new(callback));
        self.selection_notifier.reset(&self.state.selection.selected());
        if !self.selectable {
            self.selectable = true;
            self.columns = with_selection_column(&self.base_columns, true);
            self.commit();
        }
    }

    /// Registers the column visibility callback.
    ///
    /// It fires after every visibility change, whether caused by the user or
    /// by [`sync_props`](Self::sync_props), but never for the initial state.
    pub fn on_column_visibility_change<F>(&mut self, callback: F)
    where
        F: FnMut(&ColumnVisibility) + 'static,
    {
        self.on_visibility_change = Some(Box::new(callback));
    }

    /// Rows to export with the configured file name and headers.
    pub fn export_payload(&self) -> ExportPayload {
        let records = select_export_rows(&self.rows, &self.state.selection)
            .into_iter()
            .map(|r| r.record.clone())
            .collect();
        ExportPayload::new(
            &self.config.export_file_name,
            self.config.export_headers.clone(),
            records,
        )
    }

    /// A render-ready view of the current state.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::from_engine(self)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Recomputes the row model, then notifies the host.
    fn commit(&mut self) {
        self.recompute();
        self.notify();
    }

    fn recompute(&mut self) {
        let mut model = {
            let input = PipelineInput {
                rows: &self.rows,
                columns: &self.columns,
                global_filter: &self.state.global_filter,
                column_filters: &self.state.column_filters,
                sorting: &self.state.sorting,
                pagination: self.state.pagination,
                options: FilterOptions {
                    global_filter_fn: self.config.global_filter_fn,
                    fuzzy_min_score: self.config.fuzzy_min_score,
                },
            };
            pipeline::compute(&input)
        };

        let last = model.page_count.saturating_sub(1);
        if self.state.pagination.page_index > last {
            debug!(
                "Page index {} out of range; clamped to {}",
                self.state.pagination.page_index, last
            );
            self.state.pagination.page_index = last;
            model.page = pipeline::paginate(&model.sorted, self.state.pagination);
        }
        self.model = model;
    }

    fn notify(&mut self) {
        if let Some(visibility) = self.visibility_notifier.settle(&self.state.layout.visibility) {
            if let Some(callback) = self.on_visibility_change.as_mut() {
                debug!("Notifying column visibility change");
                callback(&visibility);
            }
        }

        if self
            .selection_notifier
            .settle(&self.state.selection.selected())
            .is_some()
        {
            let records: Vec<Record> = self
                .selected_rows()
                .into_iter()
                .map(|r| r.record.clone())
                .collect();
            if let Some(callback) = self.on_selection_change.as_mut() {
                debug!("Notifying selection change: {} rows", records.len());
                callback(&records);
            }
        }
    }
}

impl Drop for GridEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn with_selection_column(base: &[Column], selectable: bool) -> Vec<Column> {
    let mut columns = Vec::with_capacity(base.len() + 1);
    if selectable {
        columns.push(Column::selection());
    }
    columns.extend(
        base.iter()
            .filter(|c| {
                let reserved = selectable && c.id == SELECT_COLUMN_ID;
                if reserved {
                    warn!("Column id 'select' is reserved for row selection; dropping");
                }
                !reserved
            })
            .cloned(),
    );
    columns
}
