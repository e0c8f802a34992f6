//! Render-ready view of an engine.

use serde::Serialize;

use crate::pipeline::SortDirection;

use super::GridEngine;

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub id: String,
    pub label: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
    /// Position in a multi-column sort, starting at 0.
    pub sort_index: Option<usize>,
    pub filterable: bool,
    pub filter: Option<String>,
    pub is_selection: bool,
}

/// One body row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: String,
    pub selected: bool,
    /// Display strings in active column order.
    pub cells: Vec<String>,
}

/// Everything a renderer needs for one frame.
///
/// When no column is visible the table and every control are suppressed:
/// `render_table` is false and all collections are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GridSnapshot {
    pub render_table: bool,

    pub show_global_filter: bool,
    pub show_column_filters: bool,
    pub show_column_toggles: bool,
    pub show_export: bool,
    pub show_pagination: bool,
    pub show_footer: bool,
    pub no_controls_shown: bool,

    pub global_filter: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub footers: Vec<String>,

    pub all_selected: bool,
    pub some_selected: bool,
    pub selected_count: usize,

    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub can_previous_page: bool,
    pub can_next_page: bool,
    pub total_rows: usize,
    pub filtered_rows: usize,
}

impl GridSnapshot {
    pub(super) fn from_engine(engine: &GridEngine) -> Self {
        let active = engine.active_columns();
        if active.is_empty() {
            return Self {
                no_controls_shown: true,
                ..Self::default()
            };
        }

        let config = engine.config();
        let state = engine.state();

        let headers = active
            .iter()
            .map(|column| HeaderView {
                id: column.id.clone(),
                label: column.header.clone(),
                sortable: column.sortable,
                sort: engine.sort_direction(&column.id),
                sort_index: state.sorting.iter().position(|d| d.column_id == column.id),
                filterable: column.filterable,
                filter: engine.column_filter(&column.id).map(String::from),
                is_selection: column.is_selection(),
            })
            .collect();

        let rows = engine
            .page_rows()
            .into_iter()
            .map(|row| {
                let selected = engine.is_selected(&row.id);
                let cells = active
                    .iter()
                    .map(|column| {
                        if column.is_selection() {
                            checkbox(selected).to_string()
                        } else {
                            column.value(&row.record).to_string()
                        }
                    })
                    .collect();
                RowView {
                    id: row.id.to_string(),
                    selected,
                    cells,
                }
            })
            .collect();

        // Footer presence follows the first host column.
        let has_footer = engine
            .columns()
            .iter()
            .find(|c| !c.is_selection())
            .is_some_and(|c| c.footer.is_some());
        let show_footer = config.show_footer && has_footer;
        let footers = if show_footer {
            active
                .iter()
                .map(|c| c.footer.clone().unwrap_or_default())
                .collect()
        } else {
            Vec::new()
        };

        let show_global_filter = config.global_filter_enabled;
        let show_pagination = state.pagination_enabled;
        let show_export = config.export_enabled;
        let show_column_toggles = config.column_toggles_enabled;
        let pagination = engine.pagination();

        Self {
            render_table: true,
            show_global_filter,
            show_column_filters: config.column_filters_enabled,
            show_column_toggles,
            show_export,
            show_pagination,
            show_footer,
            no_controls_shown: !show_global_filter
                && !show_pagination
                && !show_export
                && !show_column_toggles,
            global_filter: engine.global_filter().to_string(),
            headers,
            rows,
            footers,
            all_selected: engine.all_selected(),
            some_selected: engine.some_selected(),
            selected_count: state.selection.len(),
            page_index: pagination.page_index,
            page_count: engine.page_count(),
            page_size: pagination.page_size,
            page_size_options: engine.page_size_options(),
            can_previous_page: engine.can_previous_page(),
            can_next_page: engine.can_next_page(),
            total_rows: engine.rows().len(),
            filtered_rows: engine.model().filtered.len(),
        }
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}
