//! Common CLI types shared across commands

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Rounded tables for people
    #[default]
    Table,
    /// JSON for scripts
    Json,
}

impl OutputFormat {
    /// Parse the `preferences.format` config value, ignoring unknown names
    pub fn from_preference(value: Option<&str>) -> Option<Self> {
        match value?.to_ascii_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}
