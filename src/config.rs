use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::RgbColor;
use crate::mapping::{DEFAULT_HEIGHT_REF_KM, DEFAULT_MASS_REF_KG};

/// Bounds on the square canvas edge, in pixels
pub const MIN_CANVAS_SIZE: u32 = 16;
pub const MAX_CANVAS_SIZE: u32 = 4096;

/// What the binary does once configuration is resolved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, ValueEnum, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Serve the parameter form and the /calculate endpoint
    #[default]
    Serve,
    /// Render a single footprint to a PNG file and exit
    Render,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under /static, created on start-up if missing
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Styling of the rendered footprint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge length of the square canvas before cropping, in pixels
    pub size: u32,
    /// Samples per pixel along each axis for anti-aliasing
    pub supersample: u32,
    /// Blank margin kept around the drawn content after cropping
    pub crop_padding: u32,
    pub background: RgbColor,
    pub outline_color: RgbColor,
    /// Stroke widths are in pixels at the configured `size`
    pub outline_width: f64,
    pub diameter_color: RgbColor,
    pub diameter_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            size: 480,
            supersample: 3,
            crop_padding: 8,
            background: RgbColor::WHITE,
            outline_color: RgbColor::new(0x1f, 0x1f, 0x1f),
            outline_width: 2.5,
            diameter_color: RgbColor::new(0xd6, 0x27, 0x28),
            diameter_width: 3.0,
        }
    }
}

/// Reference values for the height and mass mappings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MappingConfig {
    /// Burst height (km) at which the ellipse is roundest
    pub height_ref_km: f64,
    /// Mass (kg) at which the fill is darkest
    pub mass_ref_kg: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            height_ref_km: DEFAULT_HEIGHT_REF_KM,
            mass_ref_kg: DEFAULT_MASS_REF_KG,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/impactviz/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("impactviz").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists.
    /// Returns None if the file doesn't exist, logs a warning on parse errors.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config at {}: {:#}. Using defaults.",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::generate_config_template())?;

        Ok(path)
    }

    /// Reject values the renderer or mapper cannot work with
    pub fn validate(&self) -> Result<()> {
        let r = &self.render;
        if !(MIN_CANVAS_SIZE..=MAX_CANVAS_SIZE).contains(&r.size) {
            anyhow::bail!(
                "render.size must be between {} and {} pixels (got {})",
                MIN_CANVAS_SIZE,
                MAX_CANVAS_SIZE,
                r.size
            );
        }
        if !(1..=8).contains(&r.supersample) {
            anyhow::bail!("render.supersample must be between 1 and 8 (got {})", r.supersample);
        }
        for (name, w) in [("outline_width", r.outline_width), ("diameter_width", r.diameter_width)] {
            if !w.is_finite() || w < 0.0 {
                anyhow::bail!("render.{} must be a non-negative number (got {})", name, w);
            }
        }
        let m = &self.mapping;
        for (name, v) in [("height_ref_km", m.height_ref_km), ("mass_ref_kg", m.mass_ref_kg)] {
            if !v.is_finite() || v <= 0.0 {
                anyhow::bail!("mapping.{} must be a positive number (got {})", name, v);
            }
        }
        Ok(())
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r##"# impactviz configuration
# This file is auto-generated. Edit as needed.

[server]
# Address to bind. The PORT environment variable overrides `port`.
host = "0.0.0.0"
port = 5000
# Directory served under /static (created if missing)
static_dir = "static"

[render]
# Canvas edge length in pixels before cropping (16-4096)
size = 480
# Anti-aliasing samples per pixel along each axis (1-8)
supersample = 3
# Margin kept around the footprint after cropping, in pixels
crop_padding = 8
background = "#ffffff"
outline_color = "#1f1f1f"
outline_width = 2.5
# Line drawn along the major-axis diameter
diameter_color = "#d62728"
diameter_width = 3.0

[mapping]
# Burst height (km) at and above which the ellipse is roundest
height_ref_km = 50.0
# Impactor mass (kg) at and above which the fill is darkest
mass_ref_kg = 10000.0
"##
        .to_string()
    }

    /// Merge CLI arguments and environment into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &crate::Args) {
        self.apply_port_env(std::env::var("PORT").ok());

        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref dir) = args.static_dir {
            self.server.static_dir = dir.clone();
        }
        if let Some(size) = args.size {
            self.render.size = size;
        }
    }

    /// Apply a `PORT` environment value; unparsable values are logged and ignored.
    pub fn apply_port_env(&mut self, value: Option<String>) {
        let Some(port) = value else {
            return;
        };
        match port.trim().parse() {
            Ok(p) => self.server.port = p,
            Err(_) => tracing::warn!("Ignoring invalid PORT value '{}'", port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::generate_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
        parsed.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: Config = toml::from_str(
            r##"
[server]
port = 8080

[render]
diameter_color = "#00ff00"
"##,
        )
        .unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.render.diameter_color, RgbColor::new(0, 255, 0));
        assert_eq!(parsed.render.size, 480);
        assert_eq!(parsed.mapping, MappingConfig::default());
    }

    #[test]
    fn bad_color_is_rejected() {
        let err = toml::from_str::<Config>("[render]\noutline_color = \"red\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn validate_rejects_non_positive_references() {
        let mut cfg = Config::default();
        cfg.mapping.mass_ref_kg = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.render.supersample = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_bounds_canvas_size() {
        let mut cfg = Config::default();
        cfg.render.size = MAX_CANVAS_SIZE;
        assert!(cfg.validate().is_ok());
        cfg.render.size = MAX_CANVAS_SIZE + 1;
        assert!(cfg.validate().is_err());
        cfg.render.size = 100_000;
        assert!(cfg.validate().is_err());
        cfg.render.size = MIN_CANVAS_SIZE - 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn port_env_overrides_file_value() {
        let mut cfg = Config::default();
        cfg.server.port = 8080;

        cfg.apply_port_env(None);
        assert_eq!(cfg.server.port, 8080);

        cfg.apply_port_env(Some(" 9001 ".to_string()));
        assert_eq!(cfg.server.port, 9001);

        cfg.apply_port_env(Some("not-a-port".to_string()));
        assert_eq!(cfg.server.port, 9001);
        cfg.apply_port_env(Some("70000".to_string()));
        assert_eq!(cfg.server.port, 9001);
    }

    #[test]
    fn cli_flags_win_over_port_env() {
        use clap::Parser;

        let args = crate::Args::parse_from([
            "impactviz",
            "--port",
            "7000",
            "--host",
            "127.0.0.1",
            "--static-dir",
            "assets",
            "--size",
            "256",
        ]);
        let mut cfg = Config::default();
        cfg.apply_port_env(Some("9001".to_string()));
        cfg.merge_args(&args);
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.static_dir, PathBuf::from("assets"));
        assert_eq!(cfg.render.size, 256);

        // flags left unset keep the earlier values
        let args = crate::Args::parse_from(["impactviz"]);
        let mut cfg = Config::default();
        cfg.apply_port_env(Some("9001".to_string()));
        let host = cfg.server.host.clone();
        cfg.merge_args(&args);
        assert_eq!(cfg.server.host, host);
        assert_eq!(cfg.render.size, 480);
    }
}
