//! Tabular data model: named numeric columns over a shared row index.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Result, VizError};

const MICROS_PER_MILLI: i64 = 1000;

/// Row index shared by every column of a [`Table`].
#[derive(Clone, Debug)]
pub enum Index {
    /// Date/time index; converted to UTC epoch milliseconds on the x-axis.
    Date(Vec<DateTime<Utc>>),
    /// Already numeric/ordinal keys, passed through unchanged.
    Numeric(Vec<f64>),
}

impl Index {
    pub fn len(&self) -> usize {
        match self {
            Self::Date(values) => values.len(),
            Self::Numeric(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named series of values, aligned with the table index.
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    values: Vec<f64>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Ordered columns over a shared row index; column and row order are
/// preserved through every transformation.
#[derive(Clone, Debug)]
pub struct Table {
    index: Index,
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table, rejecting columns whose length differs from the index.
    pub fn new(index: Index, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let rows = index.len();
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                if values.len() == rows {
                    Ok(Column { name, values })
                } else {
                    Err(VizError::ShapeMismatch {
                        values: values.len(),
                        column: name,
                        rows,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { index, columns })
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Reports whether the row index is a date/time index. Callers use this
    /// to pick axis formatting independently of the conversion itself.
    pub fn has_date_index(&self) -> bool {
        matches!(self.index, Index::Date(_))
    }

    /// Returns a fresh sequence of x-coordinates for the row index.
    ///
    /// A date index becomes integer UTC epoch milliseconds (microseconds
    /// truncated toward zero); a numeric index is passed through unchanged.
    /// The source index is never mutated. Non-finite numeric keys serialize
    /// as JSON `null`.
    pub fn x_values(&self) -> Vec<Value> {
        match &self.index {
            Index::Date(values) => values
                .iter()
                .map(|dt| Value::from(dt.timestamp_micros() / MICROS_PER_MILLI))
                .collect(),
            Index::Numeric(values) => values.iter().map(|v| Value::from(*v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn numeric_index_is_identity() {
        let table = Table::new(
            Index::Numeric(vec![0.0, 1.5, 2.0]),
            vec![("a".into(), vec![1.0, 2.0, 3.0])],
        )
        .unwrap();
        assert!(!table.has_date_index());
        assert_eq!(
            table.x_values(),
            vec![Value::from(0.0), Value::from(1.5), Value::from(2.0)]
        );
    }

    #[test]
    fn date_index_becomes_epoch_millis() {
        let table = Table::new(
            Index::Date(vec![date(1970, 1, 1), date(2021, 1, 1)]),
            vec![("a".into(), vec![1.0, 2.0])],
        )
        .unwrap();
        assert!(table.has_date_index());
        assert_eq!(
            table.x_values(),
            vec![Value::from(0_i64), Value::from(1_609_459_200_000_i64)]
        );
    }

    #[test]
    fn sub_millisecond_timestamps_truncate_toward_zero() {
        let dt = Utc.timestamp_opt(12, 345_678_000).unwrap(); // 12.345678 s
        let table = Table::new(Index::Date(vec![dt]), vec![]).unwrap();
        assert_eq!(table.x_values(), vec![Value::from(12_345_i64)]);
    }

    #[test]
    fn mismatched_column_is_rejected() {
        let err = Table::new(
            Index::Numeric(vec![0.0, 1.0]),
            vec![("short".into(), vec![1.0])],
        )
        .unwrap_err();
        match err {
            VizError::ShapeMismatch {
                column,
                values,
                rows,
            } => {
                assert_eq!(column, "short");
                assert_eq!(values, 1);
                assert_eq!(rows, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_numeric_keys_serialize_as_null() {
        let table = Table::new(Index::Numeric(vec![f64::NAN]), vec![]).unwrap();
        assert_eq!(table.x_values(), vec![Value::Null]);
    }
}
