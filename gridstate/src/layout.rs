//! Column visibility and order.

use std::collections::BTreeMap;
use std::collections::HashSet;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;

/// Per-column visibility. A missing entry means visible.
pub type ColumnVisibility = BTreeMap<String, bool>;

/// Resolves the ordered list of visible columns.
///
/// Ids in `order` come first (unknown ids are skipped), then every column not
/// yet emitted in definition order. Columns explicitly hidden in
/// `visibility` are dropped last.
pub fn resolve_active_columns<'a>(
    base: &'a [Column],
    visibility: &ColumnVisibility,
    order: &[String],
) -> Vec<&'a Column> {
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut resolved = Vec::with_capacity(base.len());

    for id in order {
        let Some(column) = base.iter().find(|c| &c.id == id) else {
            continue;
        };
        if emitted.insert(column.id.as_str()) {
            resolved.push(column);
        }
    }
    for column in base {
        if emitted.insert(column.id.as_str()) {
            resolved.push(column);
        }
    }

    resolved.retain(|column| is_visible(visibility, &column.id));
    resolved
}

/// Absence or `true` means visible.
pub fn is_visible(visibility: &ColumnVisibility, id: &str) -> bool {
    visibility.get(id).copied().unwrap_or(true)
}

/// Visibility and order state for a column list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub visibility: ColumnVisibility,
    /// Empty means natural definition order.
    pub order: Vec<String>,
}

impl ColumnLayout {
    pub fn new(visibility: ColumnVisibility, order: Vec<String>) -> Self {
        Self { visibility, order }
    }

    /// Visible columns in display order.
    pub fn resolve<'a>(&self, base: &'a [Column]) -> Vec<&'a Column> {
        resolve_active_columns(base, &self.visibility, &self.order)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        is_visible(&self.visibility, id)
    }

    /// Flips one column. Returns the new visibility.
    pub fn toggle_one(&mut self, id: &str) -> bool {
        let visible = !self.is_visible(id);
        self.visibility.insert(id.to_string(), visible);
        debug!("Column '{}' visible: {}", id, visible);
        visible
    }

    /// Shows every column unless all are already visible, in which case hides
    /// every column. Returns the new state.
    pub fn toggle_all(&mut self, base: &[Column]) -> bool {
        let visible = !self.is_all_visible(base);
        for column in base {
            self.visibility.insert(column.id.clone(), visible);
        }
        debug!("All columns visible: {}", visible);
        visible
    }

    /// Sets one column's visibility. Returns `true` if it changed.
    pub fn set_visibility(&mut self, id: &str, visible: bool) -> bool {
        if self.is_visible(id) == visible {
            return false;
        }
        self.visibility.insert(id.to_string(), visible);
        true
    }

    pub fn is_all_visible(&self, base: &[Column]) -> bool {
        base.iter().all(|c| self.is_visible(&c.id))
    }

    /// Some but not all columns visible.
    pub fn is_some_visible(&self, base: &[Column]) -> bool {
        let visible = base.iter().filter(|c| self.is_visible(&c.id)).count();
        visible > 0 && visible < base.len()
    }

    pub fn is_any_column_visible(&self, base: &[Column]) -> bool {
        base.iter().any(|c| self.is_visible(&c.id))
    }
}
