//! Layered widget configuration.
//!
//! Priority, highest first: CLI flag, CLI environment variable
//! (`CHATBOT_URL`, ...), `CHATBOT_` prefixed settings
//! (`CHATBOT_WIDGET__ENDPOINT_URL`, ...), config file, defaults.

use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::chat::ControllerConfig;
use crate::chat::controller::{DEFAULT_ENDPOINT_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::render::TerminalChrome;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path (YAML, TOML or JSON)
    #[arg(short, long, env = "CHATBOT_CONFIG_FILE")]
    pub config: Option<String>,

    /// Chat endpoint URL
    #[arg(short, long, env = "CHATBOT_URL")]
    pub url: Option<String>,

    /// Seconds to wait for a reply before giving up
    #[arg(long, env = "CHATBOT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// File holding the session id across restarts
    #[arg(long, env = "CHATBOT_SESSION_FILE")]
    pub session_file: Option<String>,

    /// Start with the chat panel open
    #[arg(long, env = "CHATBOT_START_OPEN")]
    pub start_open: Option<bool>,

    /// Disable ANSI colors
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub widget: WidgetConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub no_color: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub endpoint_url: String,
    pub request_timeout_secs: u64,
    pub title: String,
    pub subtitle: String,
    pub footer: String,
    pub start_open: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Absent means the session only lives as long as the process.
    pub session_file: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;
        let chrome = TerminalChrome::default();

        let mut builder = Config::builder()
            .set_default("widget.endpoint_url", DEFAULT_ENDPOINT_URL)?
            .set_default(
                "widget.request_timeout_secs",
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )?
            .set_default("widget.title", chrome.title)?
            .set_default("widget.subtitle", chrome.subtitle)?
            .set_default("widget.footer", chrome.footer)?
            .set_default("widget.start_open", true)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CHATBOT_WIDGET__ENDPOINT_URL -> widget.endpoint_url
        builder = builder.add_source(
            Environment::with_prefix("CHATBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = cli.url {
            builder = builder.set_override("widget.endpoint_url", url)?;
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.set_override("widget.request_timeout_secs", secs)?;
        }
        if let Some(path) = cli.session_file {
            builder = builder.set_override("storage.session_file", path)?;
        }
        if let Some(open) = cli.start_open {
            builder = builder.set_override("widget.start_open", open)?;
        }
        if cli.no_color {
            builder = builder.set_override("no_color", true)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.widget.endpoint_url).map_err(|e| {
            ConfigError::Message(format!(
                "widget.endpoint_url {:?} is not a valid URL: {e}",
                self.widget.endpoint_url
            ))
        })?;
        if self.widget.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "widget.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the conversation controller.
    #[must_use]
    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            endpoint_url: self.widget.endpoint_url.clone(),
            request_timeout: Duration::from_secs(self.widget.request_timeout_secs),
        }
    }

    /// Text framing the terminal panel.
    #[must_use]
    pub fn chrome(&self) -> TerminalChrome {
        TerminalChrome {
            title: self.widget.title.clone(),
            subtitle: self.widget.subtitle.clone(),
            footer: self.widget.footer.clone(),
        }
    }
}
