//! Dynamic row record

use std::collections::BTreeMap;

use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::error::FieldError;
use crate::value::CellValue;

/// An opaque data record: one row of the host's dataset.
///
/// Records hold field values as a `BTreeMap<String, CellValue>`, so field
/// iteration (and therefore export column order) is deterministic. The
/// engine never mutates a record after ingestion.
///
/// # Example
///
/// ```
/// use gridstate::record::Record;
///
/// let record = Record::new()
///     .set("name", "David")
///     .set("age", 42);
///
/// assert_eq!(record.value("name").as_str(), Some("David"));
/// assert_eq!(record.key("age").unwrap(), Some("42".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, CellValue>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value (builder style).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the raw value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Returns the value of a field, treating a missing field as `Null`.
    pub fn value(&self, field: &str) -> CellValue {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    /// Returns `true` if the record has the field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over `(field, value)` pairs in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads a field as a row key.
    ///
    /// Strings and numbers become keys in their display form. `Null` yields
    /// `Ok(None)`. Booleans and nested JSON are rejected.
    pub fn key(&self, field: &str) -> Result<Option<String>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(CellValue::Null) => Ok(None),
            Some(value @ (CellValue::String(_) | CellValue::Number(_))) => {
                Ok(Some(value.to_string()))
            }
            Some(other) => Err(FieldError::wrong_kind(
                field,
                "string or number",
                other.type_name(),
            )),
        }
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Converts a JSON document into records.
///
/// A value that is not an array yields no records. Array elements that are
/// not objects are skipped. Neither case is an error: a malformed dataset
/// simply renders nothing.
pub fn records_from_json(value: serde_json::Value) -> Vec<Record> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            warn!("Dataset is not an array ({}); treating as empty", json_kind(&other));
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            serde_json::Value::Object(map) => Some(map.into_iter().collect::<Record>()),
            other => {
                warn!("Skipping row {}: expected an object, got {}", index, json_kind(&other));
                None
            }
        })
        .collect()
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_accepts_scalars_only() {
        let record = Record::new()
            .set("sku", "A-1")
            .set("id", 31)
            .set("active", false)
            .set("parent", CellValue::Null)
            .set("tags", CellValue::Json(serde_json::json!(["x"])));

        assert_eq!(record.key("sku").unwrap(), Some("A-1".to_string()));
        assert_eq!(record.key("id").unwrap(), Some("31".to_string()));
        assert_eq!(record.key("parent").unwrap(), None);
        assert_eq!(record.key("email").unwrap_err(), FieldError::missing("email"));
        assert_eq!(
            record.key("active").unwrap_err(),
            FieldError::wrong_kind("active", "string or number", "bool")
        );
        assert!(matches!(
            record.key("tags"),
            Err(FieldError::WrongKind { actual: "json", .. })
        ));
    }

    #[test]
    fn test_records_from_json_non_array_is_empty() {
        assert!(records_from_json(serde_json::json!({"a": 1})).is_empty());
        assert!(records_from_json(serde_json::json!("rows")).is_empty());
        assert!(records_from_json(serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_records_from_json_skips_non_objects() {
        let records = records_from_json(serde_json::json!([
            {"name": "David", "age": 40},
            5,
            {"name": "Denice"}
        ]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value("age"), CellValue::Number(40.0));
        assert_eq!(records[1].value("age"), CellValue::Null);
    }

    #[test]
    fn test_serde_is_flat_object() {
        let record = Record::new().set("a", 1).set("b", "x");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"a":1.0,"b":"x"}"#);
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
