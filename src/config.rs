use serde::Deserialize;
use std::fs;
use std::path::Path;

use tracing::warn;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub limits: LimitsConfig,
    pub html: HtmlOptions,
    pub docx: DocxOptions,
    pub pdf: PdfOptions,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_input_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Options for the HTML preview renderer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HtmlOptions {
    /// Escape markup characters in user text. When false, text is embedded
    /// verbatim.
    pub escape: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self { escape: true }
    }
}

/// Options for the document-model renderer and the DOCX packager.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocxOptions {
    pub font: String,
    /// Half-points.
    pub font_size: u32,
    /// Half-points for heading styles 1, 2 and 3.
    pub heading_sizes: [u32; 3],
    pub code_font: String,
    /// Twips.
    pub quote_indent: u32,
    pub rule_char: char,
    pub rule_width: usize,
    pub rule_color: String,
    pub link_color: String,
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            font: "Calibri".to_string(),
            font_size: 24,
            heading_sizes: [32, 28, 26],
            code_font: "Courier New".to_string(),
            quote_indent: 720,
            rule_char: '―',
            rule_width: 30,
            rule_color: "CCCCCC".to_string(),
            link_color: "1A4F8B".to_string(),
        }
    }
}

impl DocxOptions {
    /// Get the run size for a heading style, 1 through 3.
    /// Levels outside that range use the level 3 size.
    pub fn heading_size(&self, level: u8) -> u32 {
        match level {
            1 => self.heading_sizes[0],
            2 => self.heading_sizes[1],
            _ => self.heading_sizes[2],
        }
    }
}

/// Page setup for the plain-text PDF export. Values are Typst lengths.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PdfOptions {
    pub paper: String,
    pub margin: String,
    pub font_size: String,
    pub leading: String,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper: "a4".to_string(),
            margin: "30pt".to_string(),
            font_size: "12pt".to_string(),
            leading: "0.75em".to_string(),
        }
    }
}

impl Config {
    /// The configuration bundled with the crate.
    pub fn compiled_default() -> Self {
        match toml::from_str(DEFAULT_CONFIG) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "bundled default config is invalid, using built-in values");
                Self::default()
            }
        }
    }

    /// Load config from a TOML file, or return defaults if not found.
    ///
    /// A file that exists but fails to parse is reported with a warning and
    /// also falls back to the defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                Self::compiled_default()
            }),
            Err(_) => Self::compiled_default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
