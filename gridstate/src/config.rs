//! Grid configuration

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::column::columns_from_json;
use crate::column::Column;
use crate::column::FilterFn;
use crate::error::ConfigError;
use crate::export::ExportHeader;
use crate::export::DEFAULT_EXPORT_FILE_NAME;
use crate::layout::ColumnVisibility;
use crate::record::records_from_json;
use crate::record::Record;
use crate::sync::HostProps;

/// Initial state and feature toggles for a [`GridEngine`](crate::engine::GridEngine).
///
/// Every field has a default, so a JSON document only needs the settings it
/// changes.
///
/// # Example
///
/// ```
/// use gridstate::config::GridConfig;
///
/// let config = GridConfig::default()
///     .with_page_size(25)
///     .with_selectable(true)
///     .with_row_id_field("id");
/// assert_eq!(config.initial_page_size, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Seed column order. Empty means definition order.
    pub initial_column_order: Vec<String>,

    /// Seed column visibility. Absent ids are visible.
    pub initial_column_visibility: ColumnVisibility,

    pub initial_page_index: usize,

    /// Default: 10
    pub initial_page_size: usize,

    /// Default: 10, 20, 30, 40, 50
    pub page_size_options: Vec<usize>,

    /// When false, the page size tracks the row count.
    pub pagination_enabled: bool,

    pub global_filter_enabled: bool,

    pub column_filters_enabled: bool,

    /// Shows the column visibility toggles.
    pub column_toggles_enabled: bool,

    pub export_enabled: bool,

    pub show_footer: bool,

    /// Prepends the selection column and enables selection callbacks.
    pub selectable: bool,

    /// Record field used as row identity. Rows fall back to their index.
    pub row_id_field: Option<String>,

    /// Quiet period for filter inputs, in milliseconds.
    ///
    /// Default: 500
    pub debounce_ms: u64,

    pub global_filter_fn: FilterFn,

    /// Minimum fuzzy score for a row to pass a fuzzy filter.
    pub fuzzy_min_score: u32,

    pub export_file_name: String,

    /// Limits and relabels exported fields.
    pub export_headers: Option<Vec<ExportHeader>>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            initial_column_order: Vec::new(),
            initial_column_visibility: ColumnVisibility::new(),
            initial_page_index: 0,
            initial_page_size: 10,
            page_size_options: vec![10, 20, 30, 40, 50],
            pagination_enabled: true,
            global_filter_enabled: true,
            column_filters_enabled: true,
            column_toggles_enabled: true,
            export_enabled: true,
            show_footer: true,
            selectable: false,
            row_id_field: None,
            debounce_ms: 500,
            global_filter_fn: FilterFn::IncludesString,
            fuzzy_min_score: 0,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            export_headers: None,
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_page_size == 0 {
            return Err(ConfigError::InvalidPageSize(0));
        }
        if self.page_size_options.contains(&0) {
            return Err(ConfigError::InvalidPageSize(0));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The host-controllable values this config seeds.
    pub fn host_props(&self) -> HostProps {
        HostProps {
            column_visibility: Some(self.initial_column_visibility.clone()),
            column_order: Some(self.initial_column_order.clone()),
            pagination_enabled: Some(self.pagination_enabled),
            page_size: Some(self.initial_page_size),
        }
    }

    pub fn with_column_order(mut self, order: Vec<String>) -> Self {
        self.initial_column_order = order;
        self
    }

    pub fn with_column_visibility(mut self, visibility: ColumnVisibility) -> Self {
        self.initial_column_visibility = visibility;
        self
    }

    pub fn with_page_index(mut self, page_index: usize) -> Self {
        self.initial_page_index = page_index;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.initial_page_size = page_size;
        self
    }

    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.pagination_enabled = enabled;
        self
    }

    pub fn with_global_filter(mut self, enabled: bool) -> Self {
        self.global_filter_enabled = enabled;
        self
    }

    pub fn with_column_filters(mut self, enabled: bool) -> Self {
        self.column_filters_enabled = enabled;
        self
    }

    pub fn with_column_toggles(mut self, enabled: bool) -> Self {
        self.column_toggles_enabled = enabled;
        self
    }

    pub fn with_export(mut self, enabled: bool) -> Self {
        self.export_enabled = enabled;
        self
    }

    pub fn with_footer(mut self, show: bool) -> Self {
        self.show_footer = show;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_row_id_field(mut self, field: impl Into<String>) -> Self {
        self.row_id_field = Some(field.into());
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_global_filter_fn(mut self, filter_fn: FilterFn) -> Self {
        self.global_filter_fn = filter_fn;
        self
    }

    pub fn with_fuzzy_min_score(mut self, score: u32) -> Self {
        self.fuzzy_min_score = score;
        self
    }

    pub fn with_export_file_name(mut self, name: impl Into<String>) -> Self {
        self.export_file_name = name.into();
        self
    }

    pub fn with_export_headers(mut self, headers: Vec<ExportHeader>) -> Self {
        self.export_headers = Some(headers);
        self
    }
}

// =============================================================================
// GridFile
// =============================================================================

/// A grid definition in one JSON document.
///
/// ```json
/// {
///   "config": { "initial_page_size": 20, "selectable": true },
///   "columns": [{ "key": "name" }, { "key": "age", "sort_fn": "numeric_coerced" }],
///   "data": [{ "name": "David", "age": "40" }]
/// }
/// ```
///
/// `columns` and `data` are kept as raw JSON: a value of the wrong shape
/// degrades to an empty sequence instead of failing the load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GridFile {
    pub config: GridConfig,
    pub columns: serde_json::Value,
    pub data: serde_json::Value,
}

impl GridFile {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let file: Self = serde_json::from_str(s)?;
        file.config.validate()?;
        Ok(file)
    }

    /// Reads and parses a grid definition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading grid definition from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn columns(&self) -> Vec<Column> {
        columns_from_json(self.columns.clone())
    }

    pub fn records(&self) -> Vec<Record> {
        records_from_json(self.data.clone())
    }
}
