//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level Dotfield configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Server-push subscription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// SSE endpoint URL (default: http://localhost:8081/api/sse).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Connect timeout in milliseconds (default: 10000). Applies to the
    /// initial request only; the established stream has no read deadline.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8081/api/sse".into()
}

fn default_connect_timeout() -> u64 {
    10_000
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

/// Drawing surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Surface width in logical units (default: 500).
    #[serde(default = "default_surface_dim")]
    pub width: u32,

    /// Surface height in logical units (default: 500).
    #[serde(default = "default_surface_dim")]
    pub height: u32,

    /// Edge length of each painted dot (default: 10).
    #[serde(default = "default_dot_size")]
    pub dot_size: u32,
}

fn default_surface_dim() -> u32 {
    500
}

fn default_dot_size() -> u32 {
    10
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_surface_dim(),
            height: default_surface_dim(),
            dot_size: default_dot_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "dotfield_client=debug").
    #[serde(default)]
    pub filters: Vec<String>,
}

fn default_log_format() -> String {
    "plain".into()
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::DotfieldError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::DotfieldError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Default config file location: `~/.dotfield/config.json`.
    pub fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// SSE endpoint URL.
    pub fn endpoint(&self) -> String {
        self.stream
            .as_ref()
            .map(|s| s.endpoint.clone())
            .unwrap_or_else(default_endpoint)
    }

    /// Connect timeout for the initial subscription request.
    pub fn connect_timeout_ms(&self) -> u64 {
        self.stream
            .as_ref()
            .map(|s| s.connect_timeout_ms)
            .unwrap_or_else(default_connect_timeout)
    }

    /// Surface dimensions as (width, height).
    pub fn surface_size(&self) -> (u32, u32) {
        self.canvas
            .as_ref()
            .map(|c| (c.width, c.height))
            .unwrap_or((default_surface_dim(), default_surface_dim()))
    }

    /// Edge length of each painted dot.
    pub fn dot_size(&self) -> u32 {
        self.canvas
            .as_ref()
            .map(|c| c.dot_size)
            .unwrap_or_else(default_dot_size)
    }

    /// Get a config value by dotted path (e.g. "stream.endpoint", "canvas.width").
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if let Some(stream) = &self.stream {
            if stream.endpoint.is_empty() {
                errors.push("Stream endpoint cannot be empty".to_string());
            } else if !stream.endpoint.starts_with("http://")
                && !stream.endpoint.starts_with("https://")
            {
                errors.push(format!(
                    "Stream endpoint is not an http(s) URL: {}",
                    stream.endpoint
                ));
            }
        }

        if let Some(canvas) = &self.canvas {
            if canvas.width == 0 || canvas.height == 0 {
                errors.push("Canvas dimensions cannot be 0".to_string());
            }
            if canvas.dot_size == 0 {
                errors.push("Dot size cannot be 0".to_string());
            }
            if canvas.dot_size > canvas.width.min(canvas.height) {
                warnings.push(format!(
                    "Dot size {} exceeds the surface; every dot will draw clipped",
                    canvas.dot_size
                ));
            }
        }

        (warnings, errors)
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Base directory for Dotfield data: `~/.dotfield/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dotfield")
}
