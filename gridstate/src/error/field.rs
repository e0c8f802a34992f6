//! Errors reading a typed value out of a record field.

/// A record field could not be read as the requested kind of value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("record has no field '{field}'")]
    Missing { field: String },

    /// The field holds a value of another kind, e.g. an object where a row
    /// key was expected.
    #[error("field '{field}' holds a {actual}, expected {expected}")]
    WrongKind {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub fn wrong_kind(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::WrongKind {
            field: field.into(),
            expected,
            actual,
        }
    }
}
