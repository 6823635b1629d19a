//! Command-line interface parsing for the price sheet generator
//!
//! This module handles parsing of CLI arguments using clap and converts them
//! into a validated [`RunConfig`] before any file or network work starts.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::cache::CacheManager;
use crate::data::fetcher::{
    FetchOptions, OptionsError, DEFAULT_BACKOFF_SECONDS, DEFAULT_BASE_URL, DEFAULT_RETRIES,
};
use crate::render::Theme;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Retry or delay settings are out of range
    #[error("Invalid fetch options: {0}")]
    InvalidOptions(#[from] OptionsError),

    /// `--cache` was given but the platform has no cache directory
    #[error("Could not determine a cache directory; pass --cache-dir instead")]
    NoCacheDir,
}

/// Generate a printable price sheet for paint products
#[derive(Parser, Debug)]
#[command(name = "pricesheet")]
#[command(about = "Generate a printable price sheet for paint products")]
#[command(version)]
pub struct Cli {
    /// CSV or JSON file containing paint IDs
    #[arg(long, value_name = "FILE", default_value = "SKUs.json")]
    pub input_file: PathBuf,

    /// Destination for the generated price sheet (HTML when it ends in .html)
    #[arg(long, value_name = "FILE", default_value = "output/price_sheet.pdf")]
    pub output_file: PathBuf,

    /// Text to display in the document header
    #[arg(long, default_value = "Paint Price Sheet")]
    pub header_text: String,

    /// Colour of the header background
    #[arg(long, default_value = "#333333")]
    pub header_color: String,

    /// Default text colour
    #[arg(long, default_value = "#000000")]
    pub text_color: String,

    /// Page background colour
    #[arg(long, default_value = "#FFFFFF")]
    pub background_color: String,

    /// Font family to use
    #[arg(long, default_value = "Arial")]
    pub font_family: String,

    /// Seconds to wait before every HTTP request
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub request_delay: f64,

    /// Maximum attempts per product, first one included
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Seconds to wait before the first retry; doubles after every failure
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_BACKOFF_SECONDS)]
    pub backoff: f64,

    /// Directory to cache price data in. Caching is disabled by default
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Cache price data in the user cache directory
    #[arg(long, conflicts_with = "cache_dir")]
    pub cache: bool,

    /// Catalogue host serving /products/<id>
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log filter, e.g. "info" or "pricesheet=debug"; RUST_LOG takes precedence
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub theme: Theme,
    pub fetch: FetchOptions,
    /// `None` disables caching
    pub cache: Option<CacheManager>,
    pub base_url: String,
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with validated settings
    /// * `Err(ConfigError)` if a numeric option is out of range or no cache directory exists
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let fetch = FetchOptions::from_seconds(cli.retries, cli.backoff, cli.request_delay)?;

        let cache = match (&cli.cache_dir, cli.cache) {
            (Some(dir), _) => Some(CacheManager::with_dir(dir)),
            (None, true) => Some(CacheManager::in_user_cache().ok_or(ConfigError::NoCacheDir)?),
            (None, false) => None,
        };

        Ok(RunConfig {
            input_file: cli.input_file.clone(),
            output_file: cli.output_file.clone(),
            theme: Theme {
                header_text: cli.header_text.clone(),
                header_color: cli.header_color.clone(),
                text_color: cli.text_color.clone(),
                background_color: cli.background_color.clone(),
                font_family: cli.font_family.clone(),
            },
            fetch,
            cache,
            base_url: cli.base_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["pricesheet"]);
        assert_eq!(cli.input_file, PathBuf::from("SKUs.json"));
        assert_eq!(cli.output_file, PathBuf::from("output/price_sheet.pdf"));
        assert_eq!(cli.request_delay, 0.0);
        assert_eq!(cli.retries, 3);
        assert_eq!(cli.backoff, 1.0);
        assert!(cli.cache_dir.is_none());
        assert!(!cli.cache);
        assert_eq!(cli.base_url, "https://example.com");
    }

    #[test]
    fn test_run_config_defaults_match_theme_defaults() {
        let cli = Cli::parse_from(["pricesheet"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.theme, Theme::default());
        assert_eq!(config.fetch, FetchOptions::default());
        assert!(config.cache.is_none(), "caching is disabled by default");
    }

    #[test]
    fn test_run_config_theme_options() {
        let cli = Cli::parse_from([
            "pricesheet",
            "--header-text",
            "My Sheet",
            "--header-color",
            "#FF0000",
            "--text-color",
            "#00FF00",
            "--background-color",
            "#0000FF",
            "--font-family",
            "Comic Sans",
        ]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.theme.header_text, "My Sheet");
        assert_eq!(config.theme.header_color, "#FF0000");
        assert_eq!(config.theme.text_color, "#00FF00");
        assert_eq!(config.theme.background_color, "#0000FF");
        assert_eq!(config.theme.font_family, "Comic Sans");
    }

    #[test]
    fn test_run_config_fetch_options() {
        let cli = Cli::parse_from([
            "pricesheet",
            "--request-delay",
            "0.5",
            "--retries",
            "5",
            "--backoff",
            "2",
        ]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.fetch.retries, 5);
        assert_eq!(config.fetch.backoff, Duration::from_secs(2));
        assert_eq!(config.fetch.request_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_cache_dir_enables_caching() {
        let cli = Cli::parse_from(["pricesheet", "--cache-dir", "/tmp/prices"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        let cache = config.cache.expect("cache should be enabled");
        assert_eq!(cache.cache_dir(), Path::new("/tmp/prices"));
    }

    #[test]
    fn test_cache_flag_conflicts_with_cache_dir() {
        let result = Cli::try_parse_from(["pricesheet", "--cache", "--cache-dir", "/tmp/x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_retries_is_rejected() {
        let cli = Cli::parse_from(["pricesheet", "--retries", "0"]);
        let result = RunConfig::from_cli(&cli);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOptions(OptionsError::ZeroRetries))
        ));
    }

    #[test]
    fn test_negative_delay_is_rejected() {
        let cli = Cli::parse_from(["pricesheet", "--request-delay=-1"]);
        let result = RunConfig::from_cli(&cli);
        assert!(matches!(result, Err(ConfigError::InvalidOptions(_))));
    }
}
