//! Row selection keyed by row identity.

use std::collections::HashSet;

use crate::row::RowId;

/// Tracks selected rows by their [`RowId`].
///
/// Membership survives filtering, sorting and paging. Aggregate flags are
/// always computed against a caller-supplied visible set, so rows selected
/// outside the current view never count toward them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSelection {
    selected: HashSet<RowId>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle one row. Returns the new state.
    pub fn toggle(&mut self, id: RowId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Set one row's state. Returns true if selection changed.
    pub fn set(&mut self, id: RowId, selected: bool) -> bool {
        if selected {
            self.selected.insert(id)
        } else {
            self.selected.remove(&id)
        }
    }

    /// Select every id yielded. Returns true if selection changed.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RowId>) -> bool {
        ids.into_iter()
            .fold(false, |changed, id| self.selected.insert(id.clone()) || changed)
    }

    /// Deselect every id yielded. Returns true if selection changed.
    pub fn deselect_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RowId>) -> bool {
        ids.into_iter()
            .fold(false, |changed, id| self.selected.remove(id) || changed)
    }

    /// Selects exactly the visible rows unless all of them are already
    /// selected, in which case they are deselected. Rows outside `visible`
    /// keep their state. Returns true if selection changed.
    pub fn toggle_all_visible(&mut self, visible: &[RowId]) -> bool {
        if self.all_selected(visible) {
            self.deselect_all(visible)
        } else {
            self.select_all(visible)
        }
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Every visible row is selected. False when nothing is visible.
    pub fn all_selected(&self, visible: &[RowId]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id))
    }

    /// Some, but not all, visible rows are selected.
    pub fn some_selected(&self, visible: &[RowId]) -> bool {
        let count = visible.iter().filter(|id| self.selected.contains(id)).count();
        count > 0 && count < visible.len()
    }

    /// Selected ids, sorted.
    pub fn selected(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Drops ids not present in `known`. Returns true if selection changed.
    pub fn retain_known(&mut self, known: &HashSet<&RowId>) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| known.contains(id));
        self.selected.len() != before
    }

    /// Clear all selections. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
