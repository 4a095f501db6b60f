//! Chart descriptors: per-chart-type configuration objects that know their
//! template and how to shape a table into a serialized JSON payload.
//!
//! Descriptors are pure and stateless after construction; they never touch
//! the filesystem.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::series;
use crate::table::Table;

const HIGHCHARTS_AREA_TYPE: &str = "area";

/// One variant per supported chart type.
#[derive(Clone, Debug)]
pub enum Chart {
    /// NVD3 line chart with focus/zoom; listed columns are filled as areas.
    Nvd3Line { fill_area: BTreeSet<String> },
    /// NVD3 stacked area chart, no configuration.
    Nvd3StackedArea,
    /// Highcharts line chart with optional area columns and extra
    /// chart-level properties merged into the payload.
    HighchartsLine {
        fill_area: BTreeSet<String>,
        chart_props: Map<String, Value>,
    },
    /// Unconfigured Highcharts line chart, distinct template.
    HighchartsBasicLine,
}

impl Chart {
    /// Builds the NVD3 line descriptor from an optional fill-area set.
    pub fn nvd3_line(fill_area: Option<BTreeSet<String>>) -> Self {
        Self::Nvd3Line {
            fill_area: fill_area.unwrap_or_default(),
        }
    }

    /// Builds the Highcharts line descriptor from an optional fill-area set
    /// and optional extra chart properties (title, legend, axis options...).
    pub fn highcharts_line(
        fill_area: Option<BTreeSet<String>>,
        chart_props: Option<Map<String, Value>>,
    ) -> Self {
        Self::HighchartsLine {
            fill_area: fill_area.unwrap_or_default(),
            chart_props: chart_props.unwrap_or_default(),
        }
    }

    /// Pretty name of this chart type.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Nvd3Line { .. } => "NVD3 Line Chart",
            Self::Nvd3StackedArea => "NVD3 Stacked Area Chart",
            Self::HighchartsLine { .. } => "Highcharts Line Chart",
            Self::HighchartsBasicLine => "Highcharts Basic Line Chart",
        }
    }

    /// Template id rendered by this chart type, without the `.html` suffix.
    pub const fn template(&self) -> &'static str {
        match self {
            Self::Nvd3Line { .. } => "nvd3_line_zoom",
            Self::Nvd3StackedArea => "nvd3_stacked_area",
            Self::HighchartsLine { .. } => "hc_line_chart",
            Self::HighchartsBasicLine => "hc_line_basic",
        }
    }

    /// Serializes the chart-specific series payload for the given table.
    pub fn payload(&self, table: &Table) -> Result<String> {
        let value = match self {
            Self::Nvd3Line { fill_area } => series::line_series(table, fill_area),
            Self::Nvd3StackedArea => series::stacked_series(table),
            Self::HighchartsLine {
                fill_area,
                chart_props,
            } => {
                let series_types: BTreeMap<String, String> = fill_area
                    .iter()
                    .map(|name| (name.clone(), HIGHCHARTS_AREA_TYPE.to_string()))
                    .collect();
                let mut object = Map::new();
                object.insert(
                    "series".to_string(),
                    series::highcharts_series(table, &series_types),
                );
                // Caller-supplied properties are merged last and win on
                // key collisions, including over the computed series key.
                for (key, value) in chart_props {
                    object.insert(key.clone(), value.clone());
                }
                Value::Object(object)
            }
            Self::HighchartsBasicLine => {
                json!({ "series": series::highcharts_series(table, &BTreeMap::new()) })
            }
        };
        Ok(serde_json::to_string(&value)?)
    }
}
