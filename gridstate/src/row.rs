//! Row identity and ingestion.
//!
//! Every record gets a stable [`RowId`] when it enters the engine. Selection
//! and diffing are keyed by that id, never by position, so a row keeps its
//! selection state while the row sequence is rebuilt on every recompute.

use std::collections::HashSet;
use std::fmt;

use log::warn;

use crate::record::Record;

/// Stable identity of a row.
///
/// Index ids print as `#N`. Keys starting with `#` print with an extra
/// leading `#`, so the printed form of every id in a dataset is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    /// Position in the original dataset.
    Index(usize),
    /// Value of the configured key field.
    Key(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Index(i) => write!(f, "#{}", i),
            RowId::Key(k) if k.starts_with('#') => write!(f, "#{}", k),
            RowId::Key(k) => f.write_str(k),
        }
    }
}

impl From<usize> for RowId {
    fn from(i: usize) -> Self {
        RowId::Index(i)
    }
}

impl From<&str> for RowId {
    fn from(k: &str) -> Self {
        RowId::Key(k.to_string())
    }
}

/// An ingested row: the host's record plus its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Stable identity used for selection.
    pub id: RowId,
    /// Position in the original dataset.
    pub index: usize,
    /// The host's record. Never mutated.
    pub record: Record,
}

/// Assigns row ids to a dataset.
///
/// With an `id_field`, each row is keyed by that field's string or number
/// value. Rows with a null, missing or non-scalar key, and rows whose key
/// repeats an earlier one, fall back to their original index.
pub fn ingest(records: Vec<Record>, id_field: Option<&str>) -> Vec<Row> {
    let mut seen: HashSet<String> = HashSet::new();

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let Some(field) = id_field else {
                return Row {
                    id: RowId::Index(index),
                    index,
                    record,
                };
            };
            let id = match record.key(field) {
                Ok(Some(key)) => {
                    if seen.insert(key.clone()) {
                        RowId::Key(key)
                    } else {
                        warn!("Duplicate row key '{}' at row {}; using index", key, index);
                        RowId::Index(index)
                    }
                }
                Ok(None) => RowId::Index(index),
                Err(e) => {
                    warn!("Row {} has no usable key: {}; using index", index, e);
                    RowId::Index(index)
                }
            };
            Row { id, index, record }
        })
        .collect()
}
