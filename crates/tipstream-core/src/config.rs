use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Titles must contain this glyph to be treated as a donation alert.
pub const CURRENCY_MARKER: char = '₹';
/// WS close code sent when the identifier fails the identity check.
pub const CLOSE_UNKNOWN_IDENTIFIER: u16 = 4000;

pub const DEFAULT_ALERT_GIF: &str = "https://i.giphy.com/LdOyjZ7io5Msw.gif";
pub const DEFAULT_ALERT_AUDIO: &str =
    "https://commondatastorage.googleapis.com/codeskulptor-assets/week7-brrring.m4a";

/// Top-level config (tipstream.toml + TIPSTREAM_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TipstreamConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// System-default alert assets, used when an identity carries no overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_gif_url")]
    pub gif_url: String,
    #[serde(default = "default_audio_url")]
    pub audio_url: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            gif_url: default_gif_url(),
            audio_url: default_audio_url(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_gif_url() -> String {
    DEFAULT_ALERT_GIF.to_string()
}
fn default_audio_url() -> String {
    DEFAULT_ALERT_AUDIO.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.tipstream/tipstream.db", home)
}

impl TipstreamConfig {
    /// Load config from a TOML file with TIPSTREAM_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.tipstream/tipstream.toml
    ///
    /// A missing file is not an error — defaults apply.
    ///
    /// The env mapping splits on `_`, so only single-word keys are
    /// reachable that way (e.g. TIPSTREAM_GATEWAY_PORT → gateway.port).
    /// Keys containing underscores, like `assets.gif_url`, can only be
    /// overridden through the TOML file.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: TipstreamConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("TIPSTREAM_").split("_"))
            .extract()
            .map_err(|e| crate::error::ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.tipstream/tipstream.toml", home)
}
