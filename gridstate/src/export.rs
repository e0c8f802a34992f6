//! Export row selection and the payload handed to a CSV encoder.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::record::Record;
use crate::row::Row;
use crate::selection::RowSelection;

/// File name used when none is configured.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "exported-data.csv";

/// Relabels one exported field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHeader {
    /// Column label in the exported file.
    pub label: String,
    /// Record field to read.
    pub key: String,
}

impl ExportHeader {
    pub fn new(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
        }
    }
}

/// Rows to export: the selected rows if any, otherwise every row.
///
/// Filters, sorting and paging are ignored. Selected rows come back in
/// dataset order.
pub fn select_export_rows<'a>(all_rows: &'a [Row], selection: &RowSelection) -> Vec<&'a Row> {
    if selection.is_empty() {
        return all_rows.iter().collect();
    }
    all_rows
        .iter()
        .filter(|row| selection.is_selected(&row.id))
        .collect()
}

/// Everything an external encoder needs to write the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPayload {
    pub file_name: String,
    /// When set, limits and relabels the exported fields.
    pub headers: Option<Vec<ExportHeader>>,
    pub rows: Vec<Record>,
}

/// Header labels and display-string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportPayload {
    /// Builds a payload; `.csv` is appended to the file name when missing.
    pub fn new(file_name: &str, headers: Option<Vec<ExportHeader>>, rows: Vec<Record>) -> Self {
        Self {
            file_name: csv_file_name(file_name),
            headers,
            rows,
        }
    }

    /// Projects the rows onto the header list.
    ///
    /// Without headers every field seen in any row is exported, labelled by
    /// its own name, in name order.
    pub fn table(&self) -> ExportTable {
        let headers: Vec<ExportHeader> = match &self.headers {
            Some(headers) => headers.clone(),
            None => self
                .rows
                .iter()
                .flat_map(|r| r.fields().map(|(k, _)| k.to_string()))
                .collect::<BTreeSet<String>>()
                .into_iter()
                .map(|k| ExportHeader::new(k.clone(), k))
                .collect(),
        };

        let rows = self
            .rows
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.value(&h.key).to_string())
                    .collect()
            })
            .collect();

        ExportTable {
            headers: headers.into_iter().map(|h| h.label).collect(),
            rows,
        }
    }
}

fn csv_file_name(name: &str) -> String {
    let name = if name.trim().is_empty() {
        DEFAULT_EXPORT_FILE_NAME
    } else {
        name
    };
    if name.to_ascii_lowercase().ends_with(".csv") {
        name.to_string()
    } else {
        format!("{}.csv", name)
    }
}
