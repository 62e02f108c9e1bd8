//! Viewer configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rdpview_core::codec::DEFAULT_MAX_TILE_EDGE;
use rdpview_core::link::DEFAULT_RDP_PORT;
use rdpview_core::{ConnectionRequest, Orientation};

/// Top-level configuration for the viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Gateway link settings.
    pub gateway: GatewayConfig,
    /// Remote session parameters.
    pub target: TargetConfig,
    /// Framebuffer size.
    pub display: DisplayConfig,
    /// Tile decoding.
    pub codec: CodecConfig,
    /// Framebuffer snapshot.
    pub snapshot: SnapshotConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Gateway link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway address (host:port).
    pub address: String,
    /// Connection timeout in milliseconds.
    pub timeout_ms: u64,
}

/// The RDP host the gateway should open a session to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub host: String,
    pub port: u16,
    pub domain: String,
    pub username: String,
    pub password: String,
    /// Keyboard locale announced to the remote host.
    pub locale: String,
}

/// Framebuffer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Framebuffer width, also the requested remote screen width.
    pub width: u32,
    /// Framebuffer height, also the requested remote screen height.
    pub height: u32,
}

/// Tile decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Row order of uncompressed tiles: "bottom_up" or "top_down".
    pub orientation: Orientation,
    /// Largest tile edge accepted before allocating, in pixels.
    pub max_tile_edge: u32,
}

/// Snapshot written when the session ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// PNG path; empty disables the snapshot.
    pub path: String,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9250".into(),
            timeout_ms: 5000,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_RDP_PORT,
            domain: String::new(),
            username: String::new(),
            password: String::new(),
            locale: "en".into(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::BottomUp,
            max_tile_edge: DEFAULT_MAX_TILE_EDGE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ClientConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// The connection request announced to the gateway.
    pub fn connection_request(&self) -> ConnectionRequest {
        ConnectionRequest::new(
            self.target.host.clone(),
            self.display.width,
            self.display.height,
        )
        .with_port(self.target.port)
        .with_credentials(
            self.target.domain.clone(),
            self.target.username.clone(),
            self.target.password.clone(),
        )
        .with_locale(self.target.locale.clone())
    }

    /// Snapshot destination, if enabled.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        if self.snapshot.path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.snapshot.path))
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let cfg = ClientConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("address"));
        assert!(text.contains("orientation = \"bottom_up\""));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = ClientConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.display.width, 1024);
        assert_eq!(parsed.target.port, 3389);
        assert_eq!(parsed.gateway.address, "127.0.0.1:9250");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: ClientConfig = toml::from_str(
            r#"
            [target]
            host = "10.0.0.7"
            username = "bob"

            [codec]
            orientation = "top_down"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.target.host, "10.0.0.7");
        assert_eq!(parsed.target.port, 3389);
        assert_eq!(parsed.target.locale, "en");
        assert_eq!(parsed.codec.orientation, Orientation::TopDown);
        assert_eq!(parsed.codec.max_tile_edge, DEFAULT_MAX_TILE_EDGE);
    }

    #[test]
    fn connection_request_from_config() {
        let mut cfg = ClientConfig::default();
        cfg.target.host = "rdp.example".into();
        cfg.target.username = "alice".into();
        cfg.display.width = 800;
        cfg.display.height = 600;

        let req = cfg.connection_request();
        assert_eq!(req.target_host, "rdp.example");
        assert_eq!(req.target_port, 3389);
        assert_eq!((req.screen_width, req.screen_height), (800, 600));
        assert_eq!(req.username, "alice");
        assert_eq!(req.locale, "en");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = ClientConfig::load(Path::new("/nonexistent/rdpview.toml"));
        assert_eq!(cfg.display.height, 768);
        assert!(cfg.snapshot_path().is_none());
    }
}
