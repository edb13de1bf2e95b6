use crate::engine::{AnimationTiming, SpeedFactor, SpeedRange};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnimationConfig {
    #[serde(default = "default_base_step_delay_ms")]
    pub base_step_delay_ms: u64,
    #[serde(default = "default_motion_frames")]
    pub motion_frames: u32,
    #[serde(default = "default_true")]
    pub continuous_motion: bool,
    #[serde(default = "default_speed")]
    pub default_speed: f64,
    #[serde(default = "default_speed_min")]
    pub speed_min: f64,
    #[serde(default = "default_speed_max")]
    pub speed_max: f64,
    #[serde(default = "default_speed_step")]
    pub speed_step: f64,
}

fn default_base_step_delay_ms() -> u64 { 1500 }
fn default_motion_frames() -> u32 { 10 }
fn default_true() -> bool { true }
fn default_speed() -> f64 { 1.5 }
fn default_speed_min() -> f64 { 0.5 }
fn default_speed_max() -> f64 { 3.0 }
fn default_speed_step() -> f64 { 0.5 }

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            base_step_delay_ms: default_base_step_delay_ms(),
            motion_frames: default_motion_frames(),
            continuous_motion: true,
            default_speed: default_speed(),
            speed_min: default_speed_min(),
            speed_max: default_speed_max(),
            speed_step: default_speed_step(),
        }
    }
}

impl AnimationConfig {
    pub fn timing(&self) -> AnimationTiming {
        AnimationTiming {
            base_step_delay: Duration::from_millis(self.base_step_delay_ms),
            motion_frames: self.motion_frames,
            continuous_motion: self.continuous_motion,
        }
    }

    pub fn speed_range(&self) -> SpeedRange {
        SpeedRange {
            min: self.speed_min,
            max: self.speed_max,
            step: self.speed_step,
        }
    }

    pub fn initial_speed(&self) -> Result<SpeedFactor> {
        SpeedFactor::new(self.default_speed, &self.speed_range())
            .context("animation.default_speed")
    }
}

/// Diagram style. Both read the same engine frames.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Boxes,
    Graph,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Boxes => RenderMode::Graph,
            RenderMode::Graph => RenderMode::Boxes,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Boxes => "Boxes",
            RenderMode::Graph => "Graph",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default)]
    pub render_mode: RenderMode,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_tick_rate_ms() -> u64 { 100 }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

/// Purely cosmetic: only picks which advisory the sidebar shows.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Https,
    Http,
}

impl Protocol {
    pub fn toggled(self) -> Self {
        match self {
            Protocol::Https => Protocol::Http,
            Protocol::Http => Protocol::Https,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Protocol::Https => "HTTPS (Secure)",
            Protocol::Http => "HTTP (Insecure)",
        }
    }

    pub fn is_secure(self) -> bool {
        self == Protocol::Https
    }

    pub fn advisory(self) -> (&'static str, &'static str) {
        match self {
            Protocol::Https => ("✅ HTTPS is secure", "TLS encryption active"),
            Protocol::Http => (
                "⚠️ HTTP is not secure!",
                "Your data can be intercepted in clear text.",
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Shown in the sidebar only. Never resolved.
    #[serde(default = "default_destination")]
    pub destination: String,
    #[serde(default)]
    pub protocol: Protocol,
}

fn default_destination() -> String {
    "google.com".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            protocol: Protocol::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Like [`Config::load`], but a missing file means built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let a = &self.animation;
        if a.base_step_delay_ms == 0 {
            anyhow::bail!("animation.base_step_delay_ms must be positive");
        }
        if a.motion_frames == 0 {
            anyhow::bail!("animation.motion_frames must be at least 1");
        }
        let limits = SpeedRange::default();
        let within = limits.contains(a.speed_min) && limits.contains(a.speed_max);
        if !(within && a.speed_min <= a.speed_max) {
            anyhow::bail!(
                "animation speed range {}..={} is invalid, must lie within {}..={}",
                a.speed_min,
                a.speed_max,
                limits.min,
                limits.max
            );
        }
        if a.speed_step <= 0.0 {
            anyhow::bail!("animation.speed_step must be positive");
        }
        a.initial_speed()?;
        if self.display.tick_rate_ms == 0 {
            anyhow::bail!("display.tick_rate_ms must be positive");
        }
        Ok(())
    }

    /// Apply command-line switches on top of the file. Unknown arguments are
    /// left for the caller.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        for arg in args {
            match arg.as_str() {
                "--graph" => self.display.render_mode = RenderMode::Graph,
                "--boxes" => self.display.render_mode = RenderMode::Boxes,
                "--no-motion" => self.animation.continuous_motion = false,
                "--http" => self.session.protocol = Protocol::Http,
                _ => {
                    if let Some(v) = arg.strip_prefix("--speed=") {
                        self.animation.default_speed = v
                            .parse()
                            .with_context(|| format!("Invalid --speed value: {}", v))?;
                    } else if let Some(v) = arg.strip_prefix("--destination=") {
                        self.session.destination = v.to_string();
                    }
                }
            }
        }
        self.validate()
    }
}

/// Value of `--config=<path>`, or the default location.
pub fn config_path(args: &[String]) -> &Path {
    args.iter()
        .find_map(|a| a.strip_prefix("--config="))
        .map_or(Path::new(DEFAULT_CONFIG_PATH), Path::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.animation.base_step_delay_ms, 1500);
        assert_eq!(config.animation.motion_frames, 10);
        assert_eq!(config.animation.default_speed, 1.5);
        assert_eq!(config.display.render_mode, RenderMode::Boxes);
        assert_eq!(config.session.destination, "google.com");
        assert_eq!(config.session.protocol, Protocol::Https);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.animation.speed_max, 3.0);
        assert_eq!(config.display.tick_rate_ms, 100);
        assert!(config.animation.continuous_motion);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.animation.base_step_delay_ms, 1500);
    }

    #[test]
    fn test_rejects_out_of_range_default_speed() {
        let err = Config::parse("[animation]\ndefault_speed = 5.0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("default_speed"));
    }

    #[test]
    fn test_rejects_zero_delay() {
        assert!(Config::parse("[animation]\nbase_step_delay_ms = 0\n").is_err());
    }

    #[test]
    fn test_rejects_zero_motion_frames() {
        let err = Config::parse("[animation]\nmotion_frames = 0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("motion_frames"));
    }

    #[test]
    fn test_rejects_inverted_speed_range() {
        let err = Config::parse("[animation]\nspeed_min = 2.0\nspeed_max = 1.0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("speed range"));
    }

    #[test]
    fn test_rejects_speed_min_below_floor() {
        let toml = "[animation]\nspeed_min = 0.01\ndefault_speed = 0.01\n";
        let err = Config::parse(toml).unwrap_err();
        assert!(format!("{:#}", err).contains("speed range"));
    }

    #[test]
    fn test_rejects_speed_max_above_ceiling() {
        let toml = "[animation]\nspeed_max = 50.0\ndefault_speed = 40.0\n";
        let err = Config::parse(toml).unwrap_err();
        assert!(format!("{:#}", err).contains("speed range"));
    }

    #[test]
    fn test_accepts_narrower_speed_range() {
        let toml = "[animation]\nspeed_min = 1.0\nspeed_max = 2.0\ndefault_speed = 1.5\n";
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.animation.speed_range().min, 1.0);
        assert!(Config::parse("[animation]\nspeed_min = 1.0\ndefault_speed = 0.5\n").is_err());
    }

    #[test]
    fn test_rejects_zero_speed_step() {
        let err = Config::parse("[animation]\nspeed_step = 0.0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("speed_step"));
    }

    #[test]
    fn test_rejects_zero_tick_rate() {
        let err = Config::parse("[display]\ntick_rate_ms = 0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("tick_rate_ms"));
    }

    #[test]
    fn test_render_mode_and_protocol_parse_lowercase() {
        let config = Config::parse("[display]\nrender_mode = \"graph\"\n[session]\nprotocol = \"http\"\n").unwrap();
        assert_eq!(config.display.render_mode, RenderMode::Graph);
        assert_eq!(config.session.protocol, Protocol::Http);
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config::default();
        config
            .apply_args(&args(&["--graph", "--no-motion", "--speed=2.5", "--destination=example.org"]))
            .unwrap();
        assert_eq!(config.display.render_mode, RenderMode::Graph);
        assert!(!config.animation.continuous_motion);
        assert_eq!(config.animation.default_speed, 2.5);
        assert_eq!(config.session.destination, "example.org");
    }

    #[test]
    fn test_args_reject_bad_speed() {
        let mut config = Config::default();
        assert!(config.apply_args(&args(&["--speed=fast"])).is_err());
        let mut config = Config::default();
        assert!(config.apply_args(&args(&["--speed=0.1"])).is_err());
    }

    #[test]
    fn test_config_path_flag() {
        assert_eq!(config_path(&args(&["--headless"])), Path::new("config.toml"));
        assert_eq!(config_path(&args(&["--config=alt.toml"])), Path::new("alt.toml"));
    }

    #[test]
    fn test_protocol_advisory() {
        assert!(Protocol::Http.advisory().0.contains("not secure"));
        assert!(Protocol::Https.is_secure());
        assert_eq!(Protocol::Https.toggled(), Protocol::Http);
    }
}
