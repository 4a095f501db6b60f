use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use vizml::constants::{DEFAULT_DATE_FORMAT, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use vizml::data::load_table;
use vizml::engine::VizEngine;
use vizml::manager::{RenderOptions, RenderResult, VizManager};

const APP_ABOUT: &str = "vizml - render tabular data into NVD3/Highcharts HTML visualizations";
const DEFAULT_CONFIG: &str = "config/vizml.toml";

#[derive(Parser, Debug)]
#[command(name = "vizml", about = APP_ABOUT)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// CSV input: first column is the row index, remaining columns are series.
    #[arg(short = 'c', long = "csv", value_name = "PATH")]
    csv: PathBuf,
    /// TOML config with template_path/render_path.
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG)]
    config: PathBuf,
    /// Directory containing HTML templates (overrides the config file).
    #[arg(long = "template-path", value_name = "DIR")]
    template_path: Option<PathBuf>,
    /// Directory for saved renders (overrides the config file).
    #[arg(long = "render-path", value_name = "DIR")]
    render_path: Option<PathBuf>,
    /// Format for dates on the x-axis.
    #[arg(long = "date-format", value_name = "FMT", default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,
    #[arg(long = "height", value_name = "PX", default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    #[arg(long = "width", value_name = "PX", default_value_t = DEFAULT_WIDTH)]
    width: u32,
    /// Name of the HTML file to save (if omitted, HTML goes to stdout).
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    output: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an NVD3 line chart with focus/zoom.
    Line {
        #[command(flatten)]
        render: RenderArgs,
        /// Column to fill as an area (repeatable).
        #[arg(long = "fill-area", value_name = "COL")]
        fill_area: Vec<String>,
    },
    /// Render an NVD3 stacked area chart.
    StackedArea {
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Render a Highcharts line chart.
    Highcharts {
        #[command(flatten)]
        render: RenderArgs,
        /// Column to fill as an area (repeatable).
        #[arg(long = "fill-area", value_name = "COL")]
        fill_area: Vec<String>,
        /// JSON file with extra Highcharts chart properties (title, legend...).
        #[arg(long = "props", value_name = "PATH")]
        props: Option<PathBuf>,
    },
    /// Render the unconfigured Highcharts line chart variant.
    HighchartsBasic {
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Generate shell completion files.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
        /// Where to save the file (stdout if omitted).
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    template_path: Option<PathBuf>,
    render_path: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<ConfigFile, String> {
    if !path.exists() {
        if path == Path::new(DEFAULT_CONFIG) {
            return Ok(ConfigFile {
                template_path: None,
                render_path: None,
            });
        }
        return Err(format!("Config {} does not exist", path.display()));
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config {}: {err}", path.display()))?;
    toml::from_str(&raw).map_err(|err| format!("Failed to parse config {}: {err}", path.display()))
}

/// CLI flags win over the config file; the template directory is required
/// from one of the two.
fn build_engine(args: &RenderArgs) -> Result<VizEngine, String> {
    let config = load_config(&args.config)?;
    let template_path = args
        .template_path
        .clone()
        .or(config.template_path)
        .ok_or_else(|| {
            "No template directory: pass --template-path or set template_path in the config"
                .to_string()
        })?;
    let manager = match args.render_path.clone().or(config.render_path) {
        Some(render_path) => VizManager::new(template_path, render_path),
        None => VizManager::with_defaults(template_path),
    }
    .map_err(|err| err.to_string())?;
    Ok(VizEngine::new(manager))
}

fn render_options(args: &RenderArgs) -> RenderOptions {
    RenderOptions {
        date_format: args.date_format.clone(),
        height: args.height,
        width: args.width,
        filename: args.output.clone(),
        extra: BTreeMap::new(),
    }
}

fn fill_area_set(columns: Vec<String>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = columns.into_iter().collect();
    (!set.is_empty()).then_some(set)
}

fn load_chart_props(path: Option<&Path>) -> Result<Option<Map<String, Value>>, String> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read chart props {}: {err}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse chart props {}: {err}", path.display()))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(format!(
            "Chart props {} must be a JSON object",
            path.display()
        )),
    }
}

fn emit_result(result: &RenderResult) {
    match result {
        RenderResult::Content(html) => println!("{html}"),
        RenderResult::File { path, .. } => {
            success(&format!("Saved HTML to {}", path.display()));
        }
    }
}

fn run_chart(
    args: &RenderArgs,
    build: impl FnOnce(&VizEngine, &vizml::Table, &RenderOptions) -> vizml::Result<RenderResult>,
) -> Result<(), String> {
    let engine = build_engine(args)?;
    let table = load_table(&args.csv).map_err(|err| err.to_string())?;
    tracing::info!(
        input_csv = %args.csv.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        date_index = table.has_date_index(),
        template_path = %engine.manager().template_path().display(),
        render_path = %engine.manager().render_path().display(),
        "Rendering chart"
    );
    let result = build(&engine, &table, &render_options(args)).map_err(|err| err.to_string())?;
    emit_result(&result);
    Ok(())
}

fn generate_completions(shell: Shell, output: Option<PathBuf>) -> Result<(), String> {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|err| format!("Failed to create {}: {err}", parent.display()))?;
        }
        let mut file = fs::File::create(&path)
            .map_err(|err| format!("Failed to create {}: {err}", path.display()))?;
        generate(shell, &mut cmd, bin_name, &mut file);
    } else {
        let mut stdout = std::io::stdout();
        generate(shell, &mut cmd, bin_name, &mut stdout);
    }
    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vizml=info"));
    let ansi = std::io::stderr().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn headline(message: &str) {
    tracing::info!(status = "start", "{message}");
}

fn success(message: &str) {
    tracing::info!(status = "ok", "{message}");
}

fn error(message: &str) {
    tracing::error!(status = "err", "{message}");
}

fn main() {
    let args = Args::parse();
    let outcome = match args.command {
        Command::Completions { shell, output } => {
            if let Err(err) = generate_completions(shell, output) {
                eprintln!("{err}");
                std::process::exit(1);
            }
            return;
        }
        Command::Line { render, fill_area } => {
            init_logging();
            headline(APP_ABOUT);
            let fill = fill_area_set(fill_area);
            run_chart(&render, |engine, table, opts| {
                engine.nvd3_line_chart(table, fill, opts)
            })
        }
        Command::StackedArea { render } => {
            init_logging();
            headline(APP_ABOUT);
            run_chart(&render, |engine, table, opts| {
                engine.nvd3_stacked_area_chart(table, opts)
            })
        }
        Command::Highcharts {
            render,
            fill_area,
            props,
        } => {
            init_logging();
            headline(APP_ABOUT);
            let fill = fill_area_set(fill_area);
            match load_chart_props(props.as_deref()) {
                Ok(props) => run_chart(&render, |engine, table, opts| {
                    engine.hc_line_chart(table, fill, props, opts)
                }),
                Err(err) => Err(err),
            }
        }
        Command::HighchartsBasic { render } => {
            init_logging();
            headline(APP_ABOUT);
            run_chart(&render, |engine, table, opts| {
                engine.hc_basic_line_chart(table, opts)
            })
        }
    };
    if let Err(err) = outcome {
        error(&err);
        std::process::exit(1);
    }
}
