//! Renders tabular data into HTML/JavaScript chart visualizations (NVD3
//! line/area charts, Highcharts line charts) by substituting per-series JSON
//! payloads and options into HTML templates from a configured directory.

pub mod chart;
pub mod constants;
pub mod data;
pub mod engine;
pub mod error;
pub mod manager;
pub mod series;
pub mod table;

pub use chart::Chart;
pub use engine::VizEngine;
pub use error::{Result, VizError};
pub use manager::{RenderOptions, RenderResult, VizManager, default_transform};
pub use table::{Index, Table};
