//! One-way reconciliation of host-owned values into engine state.
//!
//! Two channels, kept apart:
//!
//! - [`PropSync`] detects structural changes in values the host passes in
//!   and reports them so the engine can overwrite its own state.
//! - [`ChangeNotifier`] detects changes in engine state and reports them
//!   outward. It is seeded with the initial value, so it never fires for the
//!   initial state.
//!
//! A host that echoes a notified value back produces a prop change whose
//! value equals the engine's current state. Applying it changes nothing, so
//! the notifier stays quiet and no loop forms.

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::layout::ColumnVisibility;

/// Values a host may control. `None` leaves the engine's state alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProps {
    pub column_visibility: Option<ColumnVisibility>,
    pub column_order: Option<Vec<String>>,
    pub pagination_enabled: Option<bool>,
    /// Page size restored when pagination is enabled.
    pub page_size: Option<usize>,
}

impl HostProps {
    pub fn with_column_visibility(mut self, visibility: ColumnVisibility) -> Self {
        self.column_visibility = Some(visibility);
        self
    }

    pub fn with_column_order(mut self, order: Vec<String>) -> Self {
        self.column_order = Some(order);
        self
    }

    pub fn with_pagination_enabled(mut self, enabled: bool) -> Self {
        self.pagination_enabled = Some(enabled);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Host values that differ from the previous sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropChanges {
    pub column_visibility: Option<ColumnVisibility>,
    pub column_order: Option<Vec<String>>,
    pub pagination_enabled: Option<bool>,
    pub page_size: Option<usize>,
}

impl PropChanges {
    pub fn is_empty(&self) -> bool {
        self.column_visibility.is_none()
            && self.column_order.is_none()
            && self.pagination_enabled.is_none()
            && self.page_size.is_none()
    }
}

/// Remembers the last host values and reports structural changes.
#[derive(Debug, Clone, Default)]
pub struct PropSync {
    last: HostProps,
}

impl PropSync {
    /// Seeds the tracker with the values the engine was initialised from.
    pub fn new(initial: HostProps) -> Self {
        Self { last: initial }
    }

    /// Compares `props` to the previous call and records them.
    ///
    /// A field is reported only when the host supplies it and it differs
    /// by value from what the host supplied last time.
    pub fn diff(&mut self, props: &HostProps) -> PropChanges {
        let changes = PropChanges {
            column_visibility: changed(&self.last.column_visibility, &props.column_visibility),
            column_order: changed(&self.last.column_order, &props.column_order),
            pagination_enabled: changed(&self.last.pagination_enabled, &props.pagination_enabled),
            page_size: changed(&self.last.page_size, &props.page_size),
        };
        self.last = props.clone();
        if !changes.is_empty() {
            debug!("Host props changed: {:?}", changes);
        }
        changes
    }

    pub fn last(&self) -> &HostProps {
        &self.last
    }
}

fn changed<T: Clone + PartialEq>(last: &Option<T>, next: &Option<T>) -> Option<T> {
    match next {
        Some(value) if last.as_ref() != Some(value) => Some(value.clone()),
        _ => None,
    }
}

/// Reports a value each time it differs from the last reported one.
#[derive(Debug, Clone)]
pub struct ChangeNotifier<T> {
    last: T,
}

impl<T: Clone + PartialEq> ChangeNotifier<T> {
    /// Seeds with the initial value, which is never reported.
    pub fn new(initial: T) -> Self {
        Self { last: initial }
    }

    /// Returns the current value if it differs from the last settled one.
    pub fn settle(&mut self, current: &T) -> Option<T> {
        if &self.last == current {
            return None;
        }
        self.last = current.clone();
        Some(current.clone())
    }

    /// Replaces the baseline without reporting.
    pub fn reset(&mut self, current: &T) {
        self.last = current.clone();
    }
}
