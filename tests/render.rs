//! End-to-end render tests: real template files on disk, saved HTML output.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use chrono::TimeZone;
use serde_json::Value;

use vizml::engine::VizEngine;
use vizml::manager::{RenderOptions, VizManager};
use vizml::table::{Index, Table};

const LINE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body>
<div id="chart" style="width:{{ width }}px;height:{{ height }}px"></div>
<script>
var xIsDate = {{ x_is_date }};
var dateFormat = "{{ date_format }}";
var seriesData = {{ data }};
</script>
</body>
</html>
"#;

fn setup(name: &str, templates: &[&str]) -> VizEngine {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target/test_out/integration")
        .join(name);
    let template_dir = root.join("templates");
    fs::create_dir_all(&template_dir).unwrap();
    for template in templates {
        fs::write(template_dir.join(format!("{template}.html")), LINE_TEMPLATE).unwrap();
    }
    VizEngine::new(VizManager::new(template_dir, root.join("renders")).unwrap())
}

fn embedded_series(html: &str) -> Value {
    let start = html.find("var seriesData = ").unwrap() + "var seriesData = ".len();
    let end = html[start..].find(";\n").unwrap() + start;
    serde_json::from_str(&html[start..end]).unwrap()
}

#[test]
fn line_chart_renders_to_a_saved_file() {
    let engine = setup("line_file", &["nvd3_line_zoom"]);
    let table = Table::new(
        Index::Numeric(vec![0.0, 1.0, 2.0]),
        vec![("A".into(), vec![1.0, 2.0, 3.0])],
    )
    .unwrap();
    let opts = RenderOptions {
        filename: Some("line_demo".to_string()),
        ..RenderOptions::default()
    };
    let result = engine.nvd3_line_chart(&table, None, &opts).unwrap();

    let path = result.path().unwrap();
    assert_eq!(path, engine.manager().render_path().join("line_demo.html"));
    let html = fs::read_to_string(path).unwrap();
    assert!(html.contains("var xIsDate = false;"));
    assert!(html.contains("width:300px"));

    let series = embedded_series(&html);
    assert_eq!(
        series,
        serde_json::json!([{
            "area": false,
            "key": "A",
            "values": [
                { "x": 0.0, "y": 1.0 },
                { "x": 1.0, "y": 2.0 },
                { "x": 2.0, "y": 3.0 },
            ],
        }])
    );
}

#[test]
fn date_indexed_stacked_area_uses_epoch_millis() {
    let engine = setup("stacked_dates", &["nvd3_stacked_area"]);
    let days = vec![
        chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    ];
    let table = Table::new(
        Index::Date(days),
        vec![
            ("north".into(), vec![10.0, 11.0]),
            ("south".into(), vec![20.0, 21.0]),
        ],
    )
    .unwrap();
    let result = engine
        .nvd3_stacked_area_chart(&table, &RenderOptions::default())
        .unwrap();

    let html = result.html();
    assert!(html.contains("var xIsDate = true;"));
    let series = embedded_series(html);
    assert_eq!(series[0]["key"], "north");
    assert_eq!(series[1]["key"], "south");
    assert_eq!(
        series[0]["values"][0],
        serde_json::json!([1_704_067_200_000_i64, 10.0])
    );
}

#[test]
fn highcharts_chart_round_trips_column_names() {
    let engine = setup("hc_roundtrip", &["hc_line_chart"]);
    let table = Table::new(
        Index::Numeric(vec![0.0, 1.0]),
        vec![
            ("first".into(), vec![1.0, 2.0]),
            ("second".into(), vec![3.0, 4.0]),
            ("third".into(), vec![5.0, 6.0]),
        ],
    )
    .unwrap();
    let fill = BTreeSet::from(["second".to_string()]);
    let result = engine
        .hc_line_chart(&table, Some(fill), None, &RenderOptions::default())
        .unwrap();

    let payload = embedded_series(result.html());
    let names: Vec<_> = payload["series"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert_eq!(payload["series"][1]["type"], "area");
}

#[test]
fn url_converter_embeds_an_iframe_and_keeps_the_path() {
    let mut engine = setup("iframe", &["hc_line_basic"]);
    engine.manager_mut().set_url_converter(Box::new(|path| {
        path.file_name()
            .map(|name| format!("http://127.0.0.1:8000/{}", name.to_string_lossy()))
    }));
    let table = Table::new(Index::Numeric(vec![0.0]), vec![("A".into(), vec![1.0])]).unwrap();
    let opts = RenderOptions {
        filename: Some("served".to_string()),
        width: 800,
        height: 600,
        ..RenderOptions::default()
    };
    let result = engine.hc_basic_line_chart(&table, &opts).unwrap();

    let path = result.path().unwrap();
    assert_eq!(path.file_name().unwrap(), "served.html");
    assert!(result.html().contains("src=\"http://127.0.0.1:8000/served.html\""));
    // The saved file still holds the full render, not the iframe wrapper.
    assert!(fs::read_to_string(path).unwrap().contains("var seriesData ="));
}
