//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Print layout configuration.
    #[serde(default)]
    pub print: PrintConfig,
    /// Report configuration.
    #[serde(default)]
    pub report: ReportConfig,
    /// Multi-up composition configuration.
    #[serde(default)]
    pub composition: CompositionConfig,
}

/// Print layout configuration for paginated report documents.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintConfig {
    /// Page margin on every side, in millimetres.
    #[serde(default = "default_margin_mm")]
    pub margin_mm: Decimal,
    /// Height of one table row, in millimetres.
    #[serde(default = "default_line_height_mm")]
    pub line_height_mm: Decimal,
    /// Body font size in points.
    #[serde(default = "default_font_size_pt")]
    pub font_size_pt: Decimal,
    /// Title font size in points.
    #[serde(default = "default_title_font_size_pt")]
    pub title_font_size_pt: Decimal,
    /// Document title printed on the first page.
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_margin_mm() -> Decimal {
    Decimal::from(15)
}

fn default_line_height_mm() -> Decimal {
    Decimal::from(7)
}

fn default_font_size_pt() -> Decimal {
    Decimal::from(10)
}

fn default_title_font_size_pt() -> Decimal {
    Decimal::from(16)
}

fn default_title() -> String {
    "Financial Report".to_string()
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            margin_mm: default_margin_mm(),
            line_height_mm: default_line_height_mm(),
            font_size_pt: default_font_size_pt(),
            title_font_size_pt: default_title_font_size_pt(),
            title: default_title(),
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Maximum table rows per report page.
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: u32,
    /// ISO 4217 code used when formatting amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_rows_per_page() -> u32 {
    25
}

fn default_currency() -> String {
    "IDR".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rows_per_page: default_rows_per_page(),
            currency: default_currency(),
        }
    }
}

/// Multi-up composition configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompositionConfig {
    /// Output target used when the caller does not pick one.
    #[serde(default = "default_target")]
    pub default_target: String,
    /// Layout code used when the caller does not pick one.
    #[serde(default = "default_layout")]
    pub default_layout: String,
}

fn default_target() -> String {
    "a4".to_string()
}

fn default_layout() -> String {
    "1".to_string()
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            default_target: default_target(),
            default_layout: default_layout(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TESSERA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
