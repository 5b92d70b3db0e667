//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global flags, captured once after parsing and handed to every handler.
///
/// Precedence is CLI flag > environment variable > config file > default.
/// This struct holds the CLI/env layer; config defaults are applied in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format; `None` defers to `preferences.format`
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.salesystem/config.yaml)
    pub config: Option<String>,

    /// Backend root override
    pub base_url: Option<String>,

    /// Skip the response cache entirely
    pub no_cache: bool,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            base_url: cli.base_url.clone(),
            no_cache: cli.no_cache,
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn base_url_ref(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Effective format once the config preference is known
    pub fn format_or(&self, preference: Option<&str>) -> OutputFormat {
        self.format
            .or_else(|| OutputFormat::from_preference(preference))
            .unwrap_or_default()
    }
}
