use std::fs::File;
use std::io::Read;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::parser::{FileParser, HeaderSchema, MarkerMode, ParseError, DEFAULT_DELIMITER};

/// The canonical five-field LEEF header.
const DEFAULT_HEADER_FIELDS: [&str; 5] =
    ["Version", "Vendor", "Product", "ProductVersion", "rule"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Expected header field names, in order.
    pub header_fields: Vec<String>,
    /// Separator between the header and body segments of a line.
    pub delimiter: String,
    /// How the `LEEF:` marker is stripped from headers.
    pub marker: MarkerMode,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_fields: DEFAULT_HEADER_FIELDS.iter().map(|s| s.to_string()).collect(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            marker: MarkerMode::default(),
        }
    }
}

impl ParserConfig {
    /// Load configuration from file or environment variables.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path =
            std::env::var("LEEF_CONFIG_FILE").unwrap_or_else(|_| "/etc/leef/parser.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!(
                "Config file not found at {}, using environment variables",
                config_path
            );
            Self::default()
        };

        // Environment variables override file config
        config.apply_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: ParserConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `LEEF_*` overrides from a key lookup. Keys the lookup does
    /// not know keep their current value; a present but invalid marker
    /// mode is an error, never a silent fallback.
    fn apply_overrides<F>(&mut self, get: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(fields) = get("LEEF_HEADER_FIELDS") {
            self.header_fields = split_field_list(&fields);
        }
        if let Some(delimiter) = get("LEEF_DELIMITER") {
            self.delimiter = delimiter;
        }
        if let Some(marker) = get("LEEF_MARKER_MODE") {
            self.marker = parse_marker_mode(&marker)?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.header_fields.is_empty() {
            return Err("header_fields must not be empty".to_string());
        }
        if self.header_fields.iter().any(|f| f.is_empty()) {
            return Err("header_fields must not contain empty names".to_string());
        }
        if self.delimiter.is_empty() {
            return Err("delimiter must not be empty".to_string());
        }
        Ok(())
    }

    /// Build a [`FileParser`] from this configuration.
    ///
    /// Fails with `DuplicateSchemaField` if the configured header
    /// fields repeat a name.
    pub fn build(&self) -> Result<FileParser, ParseError> {
        let schema = HeaderSchema::new(self.header_fields.clone())?;
        Ok(FileParser::new(schema)
            .with_delimiter(self.delimiter.clone())
            .with_marker(self.marker))
    }
}

fn split_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_marker_mode(raw: &str) -> Result<MarkerMode, String> {
    match raw.trim() {
        "char_class" => Ok(MarkerMode::CharClass),
        "prefix" => Ok(MarkerMode::Prefix),
        other => Err(format!(
            "unknown marker mode {:?}, expected \"char_class\" or \"prefix\"",
            other
        )),
    }
}
