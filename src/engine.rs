//! Convenience facade: one call per chart type, wiring a chart descriptor to
//! the template renderer and output manager.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::chart::Chart;
use crate::error::Result;
use crate::manager::{RenderOptions, RenderResult, VizManager};
use crate::table::Table;

/// Wraps a [`VizManager`] with one convenience method per chart type.
pub struct VizEngine {
    manager: VizManager,
}

impl VizEngine {
    pub const fn new(manager: VizManager) -> Self {
        Self { manager }
    }

    pub const fn manager(&self) -> &VizManager {
        &self.manager
    }

    pub const fn manager_mut(&mut self) -> &mut VizManager {
        &mut self.manager
    }

    /// Renders an NVD3 line chart with focus/zoom.
    ///
    /// Columns named in `fill_area_cols` have the area under them filled;
    /// all other columns are plotted as plain lines.
    pub fn nvd3_line_chart(
        &self,
        table: &Table,
        fill_area_cols: Option<BTreeSet<String>>,
        opts: &RenderOptions,
    ) -> Result<RenderResult> {
        self.render_chart(&Chart::nvd3_line(fill_area_cols), table, opts)
    }

    /// Renders an NVD3 stacked area chart.
    pub fn nvd3_stacked_area_chart(
        &self,
        table: &Table,
        opts: &RenderOptions,
    ) -> Result<RenderResult> {
        self.render_chart(&Chart::Nvd3StackedArea, table, opts)
    }

    /// Renders a Highcharts line chart; `chart_props` are Highcharts-specific
    /// top-level options (title, legend, axis options...) merged into the
    /// payload.
    pub fn hc_line_chart(
        &self,
        table: &Table,
        fill_area_cols: Option<BTreeSet<String>>,
        chart_props: Option<Map<String, Value>>,
        opts: &RenderOptions,
    ) -> Result<RenderResult> {
        self.render_chart(
            &Chart::highcharts_line(fill_area_cols, chart_props),
            table,
            opts,
        )
    }

    /// Renders the unconfigured Highcharts line chart variant.
    pub fn hc_basic_line_chart(&self, table: &Table, opts: &RenderOptions) -> Result<RenderResult> {
        self.render_chart(&Chart::HighchartsBasicLine, table, opts)
    }

    fn render_chart(
        &self,
        chart: &Chart,
        table: &Table,
        opts: &RenderOptions,
    ) -> Result<RenderResult> {
        let payload = chart.payload(table)?;
        self.manager
            .render_payload(chart.template(), payload, opts, table.has_date_index())
    }
}
