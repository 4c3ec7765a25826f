//! Configuration model for the skyfield backdrop.
//!
//! Every key is optional; an empty document yields the stock tiers and
//! thresholds. Durations accept either seconds or humantime strings
//! (`"5s"`, `"150ms"`).

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// GPU simulation variants the selector can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuVariant {
    Starfield,
    Snowfield,
    Laserfield,
}

impl GpuVariant {
    pub const ALL: [GpuVariant; 3] = [
        GpuVariant::Starfield,
        GpuVariant::Snowfield,
        GpuVariant::Laserfield,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GpuVariant::Starfield => "starfield",
            GpuVariant::Snowfield => "snowfield",
            GpuVariant::Laserfield => "laserfield",
        }
    }
}

impl fmt::Display for GpuVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GpuVariant {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "starfield" | "stars" => Ok(GpuVariant::Starfield),
            "snowfield" | "snow" => Ok(GpuVariant::Snowfield),
            "laserfield" | "lasers" => Ok(GpuVariant::Laserfield),
            other => Err(format!(
                "unknown variant '{other}'; expected starfield, snowfield or laserfield"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Dark,
    Light,
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system" | "auto" => Ok(ThemePreference::System),
            "dark" => Ok(ThemePreference::Dark),
            "light" => Ok(ThemePreference::Light),
            other => Err(format!(
                "unknown theme '{other}'; expected system, dark or light"
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SkyfieldConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Fixes the variant choice when set. Fresh entropy is used otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub theme: ThemePreference,
    #[serde(default)]
    pub detect: DetectSettings,
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub particles: ParticleTiers,
    #[serde(default)]
    pub canvas: CanvasSettings,
}

impl Default for SkyfieldConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            seed: None,
            theme: ThemePreference::default(),
            detect: DetectSettings::default(),
            policy: PolicySettings::default(),
            monitor: MonitorSettings::default(),
            particles: ParticleTiers::default(),
            canvas: CanvasSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectSettings {
    /// Hosts reporting this many cores or fewer count as low-end.
    pub low_end_cores: usize,
    /// Logical viewport widths below this count as mobile.
    pub mobile_max_width: u32,
    /// Platform identifiers treated as mobile regardless of width.
    pub mobile_platforms: Vec<String>,
    /// Lowercase substrings that mark an adapter as a capable GPU.
    pub good_gpu_tokens: Vec<String>,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub probe_timeout: Duration,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub battery_wait: Duration,
    pub reduced_motion: bool,
    pub gpu_probe: bool,
}

impl Default for DetectSettings {
    fn default() -> Self {
        Self {
            low_end_cores: 4,
            mobile_max_width: 768,
            mobile_platforms: vec!["android".into(), "ios".into()],
            good_gpu_tokens: [
                "nvidia",
                "geforce",
                "rtx",
                "amd",
                "radeon",
                "apple",
                "m1",
                "m2",
                "m3",
                "adreno",
                "mali-g",
                "intel iris",
                "arc",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            probe_timeout: Duration::from_secs(3),
            battery_wait: Duration::from_millis(150),
            reduced_motion: false,
            gpu_probe: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Battery fraction below which the lite tier is forced.
    pub low_battery: f32,
    /// Pool the GPU variant is drawn from, uniformly.
    pub variants: Vec<GpuVariant>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            low_battery: 0.15,
            variants: vec![GpuVariant::Starfield, GpuVariant::Laserfield],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorSettings {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub window: Duration,
    pub gpu_min_fps: f32,
    pub canvas_min_fps: f32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(5),
            gpu_min_fps: 30.0,
            canvas_min_fps: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParticleTiers {
    pub low_end: u32,
    pub mobile: u32,
    pub desktop: u32,
    /// Viewports narrower than this are capped at the mobile count.
    pub viewport_threshold: u32,
}

impl Default for ParticleTiers {
    fn default() -> Self {
        Self {
            low_end: 200,
            mobile: 400,
            desktop: 800,
            viewport_threshold: 768,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Depth units each entity travels per frame.
    pub speed: f32,
    /// Points drawn by the lite profile are this many pixels wide.
    pub point_size: u32,
    pub observe_visibility: bool,
    pub observe_theme: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            speed: 4.0,
            point_size: 2,
            observe_visibility: false,
            observe_theme: false,
        }
    }
}

fn default_version() -> u32 {
    1
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

impl SkyfieldConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SkyfieldConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> String {
        // Every field is a plain scalar, string or list; serialization cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.policy.variants.is_empty() {
            return Err(ConfigError::Invalid(
                "policy.variants must name at least one GPU variant".into(),
            ));
        }

        let low_battery = self.policy.low_battery;
        if !(0.0..=1.0).contains(&low_battery) {
            return Err(ConfigError::Invalid(format!(
                "policy.low_battery must be within [0, 1], got {low_battery}"
            )));
        }

        if self.monitor.window.is_zero() {
            return Err(ConfigError::Invalid(
                "monitor.window must be greater than zero".into(),
            ));
        }

        for (key, fps) in [
            ("monitor.gpu_min_fps", self.monitor.gpu_min_fps),
            ("monitor.canvas_min_fps", self.monitor.canvas_min_fps),
        ] {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(ConfigError::Invalid(format!("{key} must be > 0")));
            }
        }

        let tiers = &self.particles;
        for (key, count) in [
            ("particles.low_end", tiers.low_end),
            ("particles.mobile", tiers.mobile),
            ("particles.desktop", tiers.desktop),
        ] {
            if count == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be > 0")));
            }
        }

        if !self.canvas.speed.is_finite() || self.canvas.speed <= 0.0 {
            return Err(ConfigError::Invalid("canvas.speed must be > 0".into()));
        }

        if self
            .detect
            .good_gpu_tokens
            .iter()
            .any(|token| token.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "detect.good_gpu_tokens may not contain empty entries".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1
seed = 7
theme = "dark"

[detect]
low_end_cores = 2
probe_timeout = "750ms"
battery_wait = 0.5
good_gpu_tokens = ["nvidia", "radeon"]

[policy]
low_battery = 0.2
variants = ["snowfield", "laserfield"]

[monitor]
window = "10s"
gpu_min_fps = 45

[particles]
desktop = 1200
"#;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SkyfieldConfig::from_toml_str("").expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.particles, ParticleTiers::default());
        assert_eq!(config.particles.low_end, 200);
        assert_eq!(config.particles.mobile, 400);
        assert_eq!(config.particles.desktop, 800);
        assert_eq!(config.particles.viewport_threshold, 768);
        assert_eq!(config.monitor.window, Duration::from_secs(5));
        assert_eq!(config.policy.low_battery, 0.15);
        assert_eq!(config.detect.low_end_cores, 4);
        assert!(!config.canvas.observe_visibility);
        assert!(!config.canvas.observe_theme);
    }

    #[test]
    fn parses_sample_config() {
        let config = SkyfieldConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.theme, ThemePreference::Dark);
        assert_eq!(config.detect.low_end_cores, 2);
        assert_eq!(config.detect.probe_timeout, Duration::from_millis(750));
        assert_eq!(config.detect.battery_wait, Duration::from_millis(500));
        assert_eq!(config.detect.good_gpu_tokens, vec!["nvidia", "radeon"]);
        assert_eq!(
            config.policy.variants,
            vec![GpuVariant::Snowfield, GpuVariant::Laserfield]
        );
        assert_eq!(config.monitor.window, Duration::from_secs(10));
        assert_eq!(config.monitor.gpu_min_fps, 45.0);
        assert_eq!(config.monitor.canvas_min_fps, 20.0);
        assert_eq!(config.particles.desktop, 1200);
        assert_eq!(config.particles.mobile, 400);
    }

    #[test]
    fn rejects_empty_variant_pool() {
        let err = SkyfieldConfig::from_toml_str("[policy]\nvariants = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_battery_threshold() {
        let err = SkyfieldConfig::from_toml_str("[policy]\nlow_battery = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_particle_tier() {
        let err = SkyfieldConfig::from_toml_str("[particles]\nmobile = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_variant_name() {
        let err =
            SkyfieldConfig::from_toml_str("[policy]\nvariants = [\"rainfield\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = SkyfieldConfig::from_toml_str("version = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = SkyfieldConfig::from_toml_str(SAMPLE).unwrap();
        let rendered = config.to_toml_string();
        assert!(rendered.contains("probe_timeout = \"750ms\""));
        let reparsed = SkyfieldConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed.detect.probe_timeout, Duration::from_millis(750));
        assert_eq!(reparsed.policy.variants, config.policy.variants);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config =
            SkyfieldConfig::load_or_default(Path::new("/nonexistent/skyfield.toml")).unwrap();
        assert_eq!(config.particles.desktop, 800);
    }

    #[test]
    fn variant_names_parse_case_insensitively() {
        assert_eq!("Laserfield".parse::<GpuVariant>(), Ok(GpuVariant::Laserfield));
        assert_eq!("snow".parse::<GpuVariant>(), Ok(GpuVariant::Snowfield));
        assert!("rain".parse::<GpuVariant>().is_err());
    }
}
