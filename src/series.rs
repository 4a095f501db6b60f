//! Converts a table into chart-library-specific series structures.
//!
//! All three forms preserve column order and row order exactly as in the
//! source table; an empty table yields an empty series list. Point values
//! are not validated here; non-finite numbers become JSON `null` when the
//! payload is serialized.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde_json::{Value, json};

use crate::table::Table;

/// Fallback Highcharts series type for columns absent from the mapping.
const DEFAULT_SERIES_TYPE: &str = "line";

/// NVD3 line form: `[{area, key, values: [{x, y}, ...]}, ...]`.
///
/// `area` is true iff the column name is in `fill_area`.
pub fn line_series(table: &Table, fill_area: &BTreeSet<String>) -> Value {
    let xs = table.x_values();
    let series = table
        .columns()
        .iter()
        .map(|column| {
            let values = xs
                .iter()
                .zip(column.values())
                .map(|(x, y)| json!({ "x": x, "y": *y }))
                .collect_vec();
            json!({
                "area": fill_area.contains(column.name()),
                "key": column.name(),
                "values": values,
            })
        })
        .collect_vec();
    Value::Array(series)
}

/// NVD3 stacked-area form: `[{key, values: [[x, y], ...]}, ...]`.
pub fn stacked_series(table: &Table) -> Value {
    let xs = table.x_values();
    let series = table
        .columns()
        .iter()
        .map(|column| {
            json!({
                "key": column.name(),
                "values": point_pairs(&xs, column.values()),
            })
        })
        .collect_vec();
    Value::Array(series)
}

/// Highcharts form: `[{type, name, data: [[x, y], ...]}, ...]`.
///
/// The series type is looked up per column in `series_types`; columns absent
/// from the mapping default to `"line"`.
pub fn highcharts_series(table: &Table, series_types: &BTreeMap<String, String>) -> Value {
    let xs = table.x_values();
    let series = table
        .columns()
        .iter()
        .map(|column| {
            let kind = series_types
                .get(column.name())
                .map_or(DEFAULT_SERIES_TYPE, String::as_str);
            json!({
                "type": kind,
                "name": column.name(),
                "data": point_pairs(&xs, column.values()),
            })
        })
        .collect_vec();
    Value::Array(series)
}

fn point_pairs(xs: &[Value], ys: &[f64]) -> Vec<Value> {
    xs.iter()
        .zip(ys)
        .map(|(x, y)| json!([x, *y]))
        .collect_vec()
}
