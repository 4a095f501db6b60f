//! Template rendering and output management.
//!
//! `VizManager` saturates HTML templates from a configured directory with a
//! serialized data payload plus auxiliary options, then either returns the
//! result as a string or persists it under the configured render directory.
//! The templates themselves are an opaque external target; the only contract
//! is `{{ key }}` placeholder substitution.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use maud::html;
use tracing::debug;

use crate::constants::{DEFAULT_DATE_FORMAT, DEFAULT_HEIGHT, DEFAULT_WIDTH, HTML_EXTENSION};
use crate::error::{Result, VizError};
use crate::table::{Column, Table};

/// Converts a saved file path into a servable URL, e.g. for a local web
/// server. Returning `None` (or an empty string) keeps the plain file result.
pub type UrlConverter = Box<dyn Fn(&Path) -> Option<String>>;

/// Converts a table into the string form embedded into a template.
pub type DataTransform = fn(&Table) -> Result<String>;

/// Universal per-render options shared by every chart type.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Format for dates on the x-axis, if x values are dates.
    pub date_format: String,
    pub height: u32,
    pub width: u32,
    /// Name of the HTML file to save the render in; `None` keeps the result
    /// in memory only.
    pub filename: Option<String>,
    /// Extra substitution keys merged into the template context.
    pub extra: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            filename: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Outcome of a render: raw HTML, or a saved file plus the HTML that should
/// be displayed for it (the file content, or an iframe referencing its URL).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderResult {
    Content(String),
    File { path: PathBuf, html: String },
}

impl RenderResult {
    pub fn html(&self) -> &str {
        match self {
            Self::Content(html) | Self::File { html, .. } => html,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Content(_) => None,
            Self::File { path, .. } => Some(path),
        }
    }
}

/// Default data transform: the table as CSV with column names in the first
/// row and no index column.
pub fn default_transform(table: &Table) -> Result<String> {
    if table.num_columns() == 0 {
        return Ok(String::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns().iter().map(Column::name))
        .map_err(|err| VizError::Config(format!("failed to build CSV payload: {err}")))?;
    for row in 0..table.num_rows() {
        writer
            .write_record(
                table
                    .columns()
                    .iter()
                    .map(|column| column.values()[row].to_string()),
            )
            .map_err(|err| VizError::Config(format!("failed to build CSV payload: {err}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| VizError::Config(format!("failed to build CSV payload: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| VizError::Config(format!("CSV payload is not UTF-8: {err}")))
}

/// HTML visualization renderer and manager.
///
/// Holds the template and render directories plus the optional URL converter
/// as explicit instance state; there is no ambient configuration.
pub struct VizManager {
    template_path: PathBuf,
    render_path: PathBuf,
    url_converter: Option<UrlConverter>,
}

impl std::fmt::Debug for VizManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VizManager")
            .field("template_path", &self.template_path)
            .field("render_path", &self.render_path)
            .field("url_converter", &self.url_converter.as_ref().map(|_| ".."))
            .finish()
    }
}

impl VizManager {
    /// Creates a manager for the given template and render directories,
    /// creating either if missing.
    pub fn new(template_path: impl Into<PathBuf>, render_path: impl Into<PathBuf>) -> Result<Self> {
        let template_path = template_path.into();
        let render_path = render_path.into();
        validate_dir(&template_path)?;
        validate_dir(&render_path)?;
        Ok(Self {
            template_path,
            render_path,
            url_converter: None,
        })
    }

    /// Creates a manager rendering into the platform temp directory.
    pub fn with_defaults(template_path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(template_path, env::temp_dir())
    }

    /// Reconfigures directories; any given path is validated before use.
    pub fn configure(
        &mut self,
        template_path: Option<PathBuf>,
        render_path: Option<PathBuf>,
    ) -> Result<&mut Self> {
        if let Some(path) = template_path {
            validate_dir(&path)?;
            self.template_path = path;
        }
        if let Some(path) = render_path {
            validate_dir(&path)?;
            self.render_path = path;
        }
        Ok(self)
    }

    pub fn set_url_converter(&mut self, converter: UrlConverter) -> &mut Self {
        self.url_converter = Some(converter);
        self
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn render_path(&self) -> &Path {
        &self.render_path
    }

    /// Saturates the named template with the given substitution context and
    /// returns the resulting HTML string.
    pub fn saturate(&self, template: &str, context: &BTreeMap<String, String>) -> Result<String> {
        let template = ensure_extension(template);
        let path = self.template_path.join(&template);
        if !path.is_file() {
            return Err(VizError::TemplateNotFound {
                template,
                directory: self.template_path.clone(),
            });
        }
        let mut html = fs::read_to_string(&path).map_err(|err| VizError::io(&path, err))?;
        for (key, value) in context {
            html = html
                .replace(&format!("{{{{ {key} }}}}"), value)
                .replace(&format!("{{{{{key}}}}}"), value);
        }
        Ok(html)
    }

    /// Saves HTML content to a file and returns the resolved path.
    ///
    /// A bare name is resolved against the render directory; a name with a
    /// path separator is used verbatim. The `.html` extension is appended if
    /// missing and the file is overwritten if it exists.
    pub fn save(&self, html: &str, filename: &str) -> Result<PathBuf> {
        let resolved = if filename.contains('/') || filename.contains(MAIN_SEPARATOR) {
            PathBuf::from(filename)
        } else {
            self.render_path.join(filename)
        };
        let resolved = PathBuf::from(ensure_extension(&resolved.to_string_lossy()));
        if let Some(parent) = resolved.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| VizError::io(parent, err))?;
        }
        fs::write(&resolved, html).map_err(|err| VizError::io(&resolved, err))?;
        debug!(path = %resolved.display(), "saved render");
        Ok(resolved)
    }

    /// Renders a template around an already-serialized data payload.
    ///
    /// The payload lands under the fixed `data` key; `date_format`, `height`,
    /// `width` and the `x_is_date` flag are merged alongside, then any extra
    /// options. With a filename the result is saved, and a configured URL
    /// converter may swap the displayed HTML for an iframe reference while
    /// the saved path stays on the result.
    pub fn render_payload(
        &self,
        template: &str,
        payload: String,
        opts: &RenderOptions,
        x_is_date: bool,
    ) -> Result<RenderResult> {
        let mut context = BTreeMap::new();
        context.insert("data".to_string(), payload);
        context.insert("date_format".to_string(), opts.date_format.clone());
        context.insert("height".to_string(), opts.height.to_string());
        context.insert("width".to_string(), opts.width.to_string());
        context.insert("x_is_date".to_string(), x_is_date.to_string());
        for (key, value) in &opts.extra {
            context.insert(key.clone(), value.clone());
        }

        debug!(template, x_is_date, "saturating template");
        let html = self.saturate(template, &context)?;

        let Some(filename) = opts.filename.as_deref() else {
            return Ok(RenderResult::Content(html));
        };
        let path = self.save(&html, filename)?;

        if let Some(converter) = &self.url_converter
            && let Some(url) = converter(&path)
            && !url.is_empty()
        {
            let frame = html! {
                iframe src=(url) width=(opts.width) height=(opts.height) frameborder="0" {}
            }
            .into_string();
            return Ok(RenderResult::File { path, html: frame });
        }
        Ok(RenderResult::File { path, html })
    }

    /// Renders a template from a table through an explicit data transform,
    /// e.g. [`default_transform`] for the CSV form.
    pub fn render_table(
        &self,
        template: &str,
        table: &Table,
        transform: DataTransform,
        opts: &RenderOptions,
    ) -> Result<RenderResult> {
        let payload = transform(table)?;
        self.render_payload(template, payload, opts, table.has_date_index())
    }
}

/// The path must either be a directory or creatable as one.
fn validate_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(VizError::Config(format!(
            "path {} exists but is not a directory",
            path.display()
        )));
    }
    fs::create_dir_all(path)
        .map_err(|err| VizError::Config(format!("failed to create {}: {err}", path.display())))
}

/// Appends the canonical `.html` extension unless already present.
fn ensure_extension(name: &str) -> String {
    if Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(HTML_EXTENSION))
    {
        name.to_string()
    } else {
        format!("{name}.{HTML_EXTENSION}")
    }
}
