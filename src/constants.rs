//! Shared formatting constants, kept in one place to avoid duplicated literals.

pub const HTML_EXTENSION: &str = "html";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 300;
