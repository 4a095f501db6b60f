//! CSV to table ingestion for the CLI.
//!
//! The first CSV column is the row index, the remaining columns are named
//! series. Index cells are parsed with a sticky format hint so a file is
//! either a date index or a numeric index throughout.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use itertools::Itertools;

use crate::error::{Result, VizError};
use crate::table::{Index, Table};

const TIME_FORMAT_NAIVE: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT_PLAIN: &str = "%Y-%m-%d";

/// Index cell format detected on the first row and required from the rest.
#[derive(Clone, Copy, Debug)]
enum IndexFormatHint {
    Rfc3339,
    Naive,
    Date,
    Numeric,
}

impl IndexFormatHint {
    fn detect(raw: &str) -> Option<Self> {
        if DateTime::parse_from_rfc3339(raw).is_ok() {
            Some(Self::Rfc3339)
        } else if NaiveDateTime::parse_from_str(raw, TIME_FORMAT_NAIVE).is_ok() {
            Some(Self::Naive)
        } else if NaiveDate::parse_from_str(raw, DATE_FORMAT_PLAIN).is_ok() {
            Some(Self::Date)
        } else if raw.parse::<f64>().is_ok() {
            Some(Self::Numeric)
        } else {
            None
        }
    }

    fn parse_date(self, raw: &str) -> Option<DateTime<Utc>> {
        match self {
            Self::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Naive => NaiveDateTime::parse_from_str(raw, TIME_FORMAT_NAIVE)
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive)),
            Self::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT_PLAIN)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive)),
            Self::Numeric => None,
        }
    }
}

/// Loads a table from a headered CSV file.
pub fn load_table(csv_path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(csv_path)
        .map_err(|err| VizError::Config(format!("failed to open CSV {}: {err}", csv_path.display())))?;

    let headers = reader
        .headers()
        .map_err(|err| VizError::Config(format!("failed to read CSV header: {err}")))?
        .clone();
    if headers.len() < 2 {
        return Err(VizError::Config(
            "CSV needs an index column and at least one series column".to_string(),
        ));
    }
    let column_names = headers.iter().skip(1).map(str::to_string).collect_vec();

    let mut hint: Option<IndexFormatHint> = None;
    let mut dates = Vec::new();
    let mut numbers = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); column_names.len()];

    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|err| VizError::Config(format!("failed to read CSV row {}: {err}", line + 2)))?;
        if record.len() != headers.len() {
            return Err(VizError::Config(format!(
                "CSV row {} has {} fields, expected {}",
                line + 2,
                record.len(),
                headers.len()
            )));
        }

        let raw_index = record.get(0).unwrap_or_default().trim();
        let hint = *hint.get_or_insert_with(|| {
            IndexFormatHint::detect(raw_index).unwrap_or(IndexFormatHint::Numeric)
        });
        match hint {
            IndexFormatHint::Numeric => {
                let value = raw_index.parse::<f64>().map_err(|_| {
                    VizError::Config(format!(
                        "CSV row {}: unrecognized index value '{raw_index}'",
                        line + 2
                    ))
                })?;
                numbers.push(value);
            }
            _ => {
                let value = hint.parse_date(raw_index).ok_or_else(|| {
                    VizError::Config(format!(
                        "CSV row {}: index value '{raw_index}' does not match the detected date format",
                        line + 2
                    ))
                })?;
                dates.push(value);
            }
        }

        for (slot, cell) in columns.iter_mut().zip(record.iter().skip(1)) {
            slot.push(parse_value(cell));
        }
    }

    let index = if dates.is_empty() {
        Index::Numeric(numbers)
    } else {
        Index::Date(dates)
    };
    Table::new(index, column_names.into_iter().zip(columns).collect())
}

/// Empty and `nan` cells pass through as NaN; the transformer does not
/// sanitize point values.
fn parse_value(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        f64::NAN
    } else {
        trimmed.parse().unwrap_or(f64::NAN)
    }
}
