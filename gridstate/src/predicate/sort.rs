//! Row comparators.
//!
//! Every comparator returns a consistent [`Ordering`] (ties are `Equal`), so a
//! stable sort keeps equal-key rows in input order.

use std::cmp::Ordering;

use crate::column::Column;
use crate::column::CompareFn;
use crate::column::SortFn;
use crate::row::Row;
use crate::value::CellValue;

/// Default value ordering: numeric when both sides are numbers, otherwise
/// ordinal comparison of the string forms.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => compare_numbers(x, y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Total order over floats.
pub fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Compares the accessor values of two rows.
pub fn compare_default(a: &Row, b: &Row, column: &Column) -> Ordering {
    compare_values(&column.value(&a.record), &column.value(&b.record))
}

/// Compares the untransformed record values of two rows.
pub fn compare_raw(a: &Row, b: &Row, column: &Column) -> Ordering {
    compare_values(&column.raw_value(&a.record), &column.raw_value(&b.record))
}

/// Compares the raw values of two rows as numbers; unparseable values are 0.
pub fn compare_numeric_coerced(a: &Row, b: &Row, column: &Column) -> Ordering {
    compare_numbers(
        column.raw_value(&a.record).to_number_lossy(),
        column.raw_value(&b.record).to_number_lossy(),
    )
}

/// Compares two rows with the column's configured strategy.
pub fn compare_rows(a: &Row, b: &Row, column: &Column) -> Ordering {
    match &column.sort_fn {
        SortFn::Default => compare_default(a, b, column),
        SortFn::RawValue => compare_raw(a, b, column),
        SortFn::NumericCoerced => compare_numeric_coerced(a, b, column),
        SortFn::Custom(f) => f(a, b, &column.id),
    }
}

// =============================================================================
// SortKey
// =============================================================================

/// A sort strategy resolved for one pipeline run.
///
/// Sort values are extracted once per row up front instead of once per
/// comparison. Values are stored by original row index.
pub struct SortKey<'a> {
    column_id: &'a str,
    descending: bool,
    values: KeyValues,
}

enum KeyValues {
    Values(Vec<CellValue>),
    Numbers(Vec<f64>),
    Custom(CompareFn),
}

impl<'a> SortKey<'a> {
    /// Resolves `column`'s strategy over the rows named by `indices`.
    pub fn resolve(column: &'a Column, descending: bool, rows: &[Row], indices: &[usize]) -> Self {
        let values = match &column.sort_fn {
            SortFn::Default => KeyValues::Values(extract(rows, indices, CellValue::Null, |r| {
                column.value(&r.record)
            })),
            SortFn::RawValue => KeyValues::Values(extract(rows, indices, CellValue::Null, |r| {
                column.raw_value(&r.record)
            })),
            SortFn::NumericCoerced => KeyValues::Numbers(extract(rows, indices, 0.0, |r| {
                column.raw_value(&r.record).to_number_lossy()
            })),
            SortFn::Custom(f) => KeyValues::Custom(f.clone()),
        };
        Self {
            column_id: &column.id,
            descending,
            values,
        }
    }

    /// Compares the rows at original indices `a` and `b`, direction applied.
    pub fn compare(&self, rows: &[Row], a: usize, b: usize) -> Ordering {
        let ord = match &self.values {
            KeyValues::Values(values) => compare_values(&values[a], &values[b]),
            KeyValues::Numbers(values) => compare_numbers(values[a], values[b]),
            KeyValues::Custom(f) => f(&rows[a], &rows[b], self.column_id),
        };
        if self.descending { ord.reverse() } else { ord }
    }
}

fn extract<T: Clone>(
    rows: &[Row],
    indices: &[usize],
    empty: T,
    f: impl Fn(&Row) -> T,
) -> Vec<T> {
    let mut values = vec![empty; rows.len()];
    for &i in indices {
        values[i] = f(&rows[i]);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::row::ingest;

    fn rows(values: Vec<CellValue>) -> Vec<Row> {
        ingest(
            values
                .into_iter()
                .map(|v| Record::new().set("v", v))
                .collect(),
            None,
        )
    }

    #[test]
    fn test_compare_values_numeric_vs_string() {
        assert_eq!(
            compare_values(&CellValue::from(9), &CellValue::from(10)),
            Ordering::Less
        );
        // Ordinal string order when either side is not a number.
        assert_eq!(
            compare_values(&CellValue::from("9"), &CellValue::from("10")),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&CellValue::from("a"), &CellValue::from("a")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_numeric_coerced_treats_garbage_as_zero() {
        let rows = rows(vec!["5".into(), "abc".into(), "20".into()]);
        let column = Column::key("v").sort_fn(SortFn::NumericCoerced);
        assert_eq!(compare_rows(&rows[1], &rows[0], &column), Ordering::Less);
        assert_eq!(compare_rows(&rows[0], &rows[2], &column), Ordering::Less);
    }

    #[test]
    fn test_raw_value_ignores_display_formatting() {
        let records = vec![
            Record::new().set("dob", "1999-12-31"),
            Record::new().set("dob", "2000-01-01"),
        ];
        let rows = ingest(records, None);
        // Display form puts the day first, which would invert the order.
        let column = Column::computed("dob", |r| {
            let raw = r.value("dob").to_string();
            CellValue::from(format!("{}/{}", &raw[8..10], &raw[0..4]))
        });
        assert_eq!(compare_rows(&rows[0], &rows[1], &column), Ordering::Greater);
        let column = column.sort_fn(SortFn::RawValue);
        assert_eq!(compare_rows(&rows[0], &rows[1], &column), Ordering::Less);
    }

    #[test]
    fn test_sort_key_direction() {
        let rows = rows(vec![1.into(), 2.into()]);
        let column = Column::key("v");
        let asc = SortKey::resolve(&column, false, &rows, &[0, 1]);
        let desc = SortKey::resolve(&column, true, &rows, &[0, 1]);
        assert_eq!(asc.compare(&rows, 0, 1), Ordering::Less);
        assert_eq!(desc.compare(&rows, 0, 1), Ordering::Greater);
    }
}
