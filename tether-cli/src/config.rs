//! CLI configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_core::{Selector, ServerConfig};

/// Top-level configuration for the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Host server address and timeouts.
    pub server: ServerConfig,
    /// Whether and how to start the server.
    pub launcher: LauncherConfig,
    /// Target device.
    pub device: DeviceConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Server start-up settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Start the server if nothing is listening.
    pub start_server: bool,
    /// Program invoked as `<program> -P <port> start-server`.
    pub program: String,
}

/// Target device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Selector query, e.g. `host:transport-any` or `host-serial:<serial>`.
    pub selector: String,
    /// Display name override.
    pub serial: Option<String>,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (overridden by `RUST_LOG`).
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            start_server: true,
            program: "adb".into(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            selector: Selector::Any.to_string(),
            serial: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl CliConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::debug!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// The configured device selector.
    pub fn selector(&self) -> tether_core::Result<Selector> {
        self.device.selector.parse()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let cfg = CliConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("[server]"));
        assert!(text.contains("port = 5037"));
        assert!(text.contains("host:transport-any"));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = CliConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CliConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server, ServerConfig::default());
        assert_eq!(parsed.device.selector, "host:transport-any");
        assert!(parsed.launcher.start_server);
    }

    #[test]
    fn sections_are_optional() {
        let parsed: CliConfig = toml::from_str(
            r#"
            [device]
            selector = "host:transport-id:4"
            serial = "pixel"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.selector().unwrap(), Selector::TransportId(4));
        assert_eq!(parsed.device.serial.as_deref(), Some("pixel"));
        assert_eq!(parsed.server.port, 5037);
        assert_eq!(parsed.logging.level, "warn");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = CliConfig::load(Path::new("/nonexistent/tether.toml"));
        assert_eq!(cfg.server.address(), "localhost:5037");
    }
}
