//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HtmlshotError, HtmlshotResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the HTML inputs, relative to the working directory.
    pub input_dir: PathBuf,

    /// Root directory for rendered images.
    pub output_dir: PathBuf,

    /// Default capture settings.
    pub capture: CaptureDefaults,

    /// Browser launch settings.
    pub browser: BrowserSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Viewport width in CSS pixels.
    pub width: u32,

    /// Viewport height in CSS pixels.
    pub height: u32,
}

/// How the headless browser is launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Explicit Chrome/Chromium binary. Auto-detected when unset.
    pub executable: Option<PathBuf>,

    /// Run without a visible window.
    pub headless: bool,

    /// Keep the Chromium sandbox enabled. Containers running as root
    /// usually need this off.
    pub sandbox: bool,

    /// Extra command-line switches passed to the browser.
    pub args: Vec<String>,

    /// Timeout for a single DevTools command.
    pub request_timeout_secs: u64,

    /// How long to wait for the page to reach network idle.
    pub load_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "htmlshot=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("html"),
            output_dir: PathBuf::from("imgs"),
            capture: CaptureDefaults::default(),
            browser: BrowserSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            sandbox: true,
            args: Vec::new(),
            request_timeout_secs: 30,
            load_timeout_secs: 30,
        }
    }
}

impl BrowserSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            // chromiumoxide reports unknown CDP events at error level
            level: "info,chromiumoxide=off".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Same output format, debug level. chromiumoxide stays at warn so
    /// unknown-event noise does not drown the pipeline's own logs.
    pub fn verbose(&self) -> Self {
        Self {
            level: "debug,chromiumoxide=warn".to_string(),
            ..self.clone()
        }
    }
}

/// Configuration picked up from the standard location.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,

    /// Why the file on disk was ignored, if it was. Loading happens before
    /// logging is set up, so the caller reports this once it can.
    pub fallback_reason: Option<HtmlshotError>,
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> LoadedConfig {
        Self::load_or_default(&config_file_path())
    }

    /// Load `path` if it exists. A missing file yields defaults silently; an
    /// unreadable or invalid one yields defaults plus the reason.
    pub fn load_or_default(path: &Path) -> LoadedConfig {
        if !path.exists() {
            return LoadedConfig {
                config: Self::default(),
                fallback_reason: None,
            };
        }
        match Self::load_from(path) {
            Ok(config) => LoadedConfig {
                config,
                fallback_reason: None,
            },
            Err(e) => LoadedConfig {
                config: Self::default(),
                fallback_reason: Some(e),
            },
        }
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], any
    /// failure is reported to the caller.
    pub fn load_from(path: &Path) -> HtmlshotResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HtmlshotError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            HtmlshotError::config(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the capture pipeline cannot work with.
    pub fn validate(&self) -> HtmlshotResult<()> {
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(HtmlshotError::config(format!(
                "capture size must be positive, got {}x{}",
                self.capture.width, self.capture.height
            )));
        }
        if self.browser.load_timeout_secs == 0 {
            return Err(HtmlshotError::config("browser.load_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("htmlshot").join("config.json")
}
