//! Configuration management for salesdash
//!
//! This module handles loading, validation, and environment overrides of
//! salesdash configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::{ConfigError, ConfigResult};

/// Environment variable that overrides `server.host`
pub const HOST_ENV: &str = "SALESDASH_HOST";
/// Environment variable that overrides `server.port`
pub const PORT_ENV: &str = "SALESDASH_PORT";

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on in-memory sessions; the oldest is evicted first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_sessions() -> usize {
    256
}

/// Shared password gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared password; usually left empty here and supplied via `password_env`
    #[serde(default)]
    pub password: String,
    /// Name of the environment variable that overrides `password`
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: String::new(),
            password_env: default_password_env(),
        }
    }
}

fn default_password_env() -> String {
    "SALESDASH_PASSWORD".to_string()
}

/// Upload and CSV parsing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted request body for uploads, in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// chrono format strings tried in order for `transaction_date`
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            delimiter: default_delimiter(),
            date_formats: default_date_formats(),
        }
    }
}

fn default_max_bytes() -> usize {
    200 * 1024 * 1024
}

fn default_delimiter() -> char {
    '|'
}

fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Chart type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
}

impl ChartType {
    /// All chart types in the order the selector lists them
    pub const ALL: [ChartType; 2] = [ChartType::Line, ChartType::Bar];

    /// Label shown in the chart type selector
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Line => "Line Chart",
            ChartType::Bar => "Bar Chart",
        }
    }
}

impl Default for ChartType {
    fn default() -> Self {
        ChartType::Line
    }
}

impl std::str::FromStr for ChartType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" | "line chart" => Ok(ChartType::Line),
            "bar" | "bar chart" => Ok(ChartType::Bar),
            _ => Err(format!("Invalid chart type: {}", s)),
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartType::Line => write!(f, "line"),
            ChartType::Bar => write!(f, "bar"),
        }
    }
}

/// Chart and visualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Chart type used until the user picks one
    #[serde(default)]
    pub default_chart_type: ChartType,
    /// Rendered width in pixels
    #[serde(default = "default_chart_width")]
    pub width: u32,
    /// Rendered height in pixels
    #[serde(default = "default_chart_height")]
    pub height: u32,
    /// Qualitative palette (`#rrggbb`), assigned to locations by index
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_chart_type: ChartType::Line,
            width: default_chart_width(),
            height: default_chart_height(),
            palette: default_palette(),
        }
    }
}

fn default_chart_width() -> u32 {
    1200
}

fn default_chart_height() -> u32 {
    600
}

fn default_palette() -> Vec<String> {
    [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
        "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl ChartConfig {
    /// Palette as RGB triples, skipping entries that are not `#rrggbb`
    pub fn palette_rgb(&self) -> Vec<(u8, u8, u8)> {
        self.palette.iter().filter_map(|c| parse_hex_color(c)).collect()
    }
}

/// Parse a `#rrggbb` color
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Password gate
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload settings
    #[serde(default)]
    pub upload: UploadConfig,
    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file, apply environment overrides and validate
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Config::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without validating
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })
    }

    /// Apply overrides looked up by environment variable name
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(&self.auth.password_env) {
            self.auth.password = password;
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV).and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.server.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_sessions".to_string(),
                reason: "At least one session must be allowed".to_string(),
            });
        }

        if self.auth.password.is_empty() {
            return Err(ConfigError::MissingField {
                field: "auth.password".to_string(),
            });
        }

        if self.upload.max_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upload.max_bytes".to_string(),
                reason: "Upload limit must be greater than 0".to_string(),
            });
        }

        if !self.upload.delimiter.is_ascii() || self.upload.delimiter == '"' {
            return Err(ConfigError::InvalidValue {
                field: "upload.delimiter".to_string(),
                reason: "Delimiter must be a single ASCII character other than '\"'".to_string(),
            });
        }

        if self.upload.date_formats.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "upload.date_formats".to_string(),
                reason: "At least one date format is required".to_string(),
            });
        }

        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "charts.width/charts.height".to_string(),
                reason: "Chart dimensions must be greater than 0".to_string(),
            });
        }

        if self.charts.palette.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "charts.palette".to_string(),
                reason: "Palette must contain at least one color".to_string(),
            });
        }

        if let Some(bad) = self.charts.palette.iter().find(|c| parse_hex_color(c).is_none()) {
            return Err(ConfigError::InvalidValue {
                field: "charts.palette".to_string(),
                reason: format!("'{}' is not a #rrggbb color", bad),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.password = "salesdata".to_string();
        config
    }

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.upload.delimiter, '|');
        assert_eq!(config.charts.default_chart_type, ChartType::Line);
        assert_eq!(config.auth.password_env, "SALESDASH_PASSWORD");
    }

    #[test]
    fn test_default_template_requires_password() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        match config.validate() {
            Err(ConfigError::MissingField { field }) => assert_eq!(field, "auth.password"),
            other => panic!("expected missing password, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SALESDASH_PASSWORD", "from-env"),
            (PORT_ENV, "9000"),
            (HOST_ENV, "0.0.0.0"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.auth.password, "from-env");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_password_env() {
        let mut config = Config::from_yaml("auth:\n  password: file-secret\n  password_env: DASH_PW\n").unwrap();
        config.apply_env_overrides(|key| (key == "DASH_PW").then(|| "env-secret".to_string()));
        assert_eq!(config.auth.password, "env-secret");
    }

    #[test]
    fn test_unparseable_port_is_ignored() {
        let mut config = valid_config();
        config.apply_env_overrides(|key| (key == PORT_ENV).then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 8501);
    }

    #[test]
    fn test_validate_rejects_bad_palette() {
        let mut config = valid_config();
        config.charts.palette = vec!["#1f77b4".to_string(), "teal".to_string()];
        match config.validate() {
            Err(ConfigError::InvalidValue { field, reason }) => {
                assert_eq!(field, "charts.palette");
                assert!(reason.contains("teal"));
            }
            other => panic!("expected invalid palette, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::from_yaml("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::InvalidYaml { .. })));
    }

    #[test]
    fn test_chart_type_parsing() {
        assert_eq!("Line Chart".parse::<ChartType>().unwrap(), ChartType::Line);
        assert_eq!("bar".parse::<ChartType>().unwrap(), ChartType::Bar);
        assert_eq!("BAR CHART".parse::<ChartType>().unwrap(), ChartType::Bar);
        assert!("pie".parse::<ChartType>().is_err());
        assert_eq!(ChartType::Bar.label(), "Bar Chart");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1f77b4"), Some((0x1f, 0x77, 0xb4)));
        assert_eq!(parse_hex_color("1f77b4"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(valid_config().charts.palette_rgb().len(), 10);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
