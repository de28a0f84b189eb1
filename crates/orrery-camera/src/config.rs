//! Camera configuration
//!
//! Every tunable constant of the camera core lives here. Values are read from
//! `config/camera.yaml`; any field the file omits keeps its compiled default.
//!
//! Path resolution order for `ConfigLoader::from_env()`:
//! 1. `ORRERY_CONFIG` environment variable (explicit file)
//! 2. `config/camera.yaml` relative to the working directory
//! 3. `config/camera.yaml` at the workspace root (compile-time manifest dir)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::anchor::BodyId;
use crate::error::ConfigError;
use crate::tween::Ease;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ORRERY_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/camera.yaml";

// =============================================================================
// SECTIONS
// =============================================================================

/// Focus transition tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Lower bound for the rig's minimum zoom distance after focusing
    pub floor_distance: f32,
    /// Minimum zoom distance = body radius * radius_multiplier
    pub radius_multiplier: f32,
    /// Framing distance = body radius * distance_multiplier
    pub distance_multiplier: f32,
    /// Camera offset used when focusing the star
    pub star_offset: Vec3,
    pub position_duration_ms: u64,
    pub target_duration_ms: u64,
    /// Delay before following resumes at normal time-scale
    pub rearm_delay_ms: u64,
    /// Time-scale magnitude above which following resumes immediately
    pub fast_time_threshold: f64,
    pub ease: Ease,
    /// Delay before the focused system's lighting is revealed
    pub spotlight_delay_ms: u64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            floor_distance: 0.0003,
            radius_multiplier: 1.5,
            distance_multiplier: 6.0,
            star_offset: Vec3::new(15.0, 15.0, 5.0),
            position_duration_ms: 2500,
            target_duration_ms: 2000,
            rearm_delay_ms: 2500,
            fast_time_threshold: 1.0,
            ease: Ease::Power4InOut,
            spotlight_delay_ms: 1000,
        }
    }
}

impl FocusConfig {
    pub fn position_duration(&self) -> Duration {
        Duration::from_millis(self.position_duration_ms)
    }

    pub fn target_duration(&self) -> Duration {
        Duration::from_millis(self.target_duration_ms)
    }

    pub fn rearm_delay(&self) -> Duration {
        Duration::from_millis(self.rearm_delay_ms)
    }

    pub fn spotlight_delay(&self) -> Duration {
        Duration::from_millis(self.spotlight_delay_ms)
    }
}

/// Viewing-offset geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetConfig {
    pub side_amount: f32,
    pub up_amount: f32,
    /// Reference "up" axis; the orbital plane is perpendicular to it
    pub world_up: Vec3,
    pub system_center: Vec3,
    /// Clamp for degenerate (zero or undefined) body radii
    pub min_body_radius: f32,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            side_amount: 0.8,
            up_amount: 0.2,
            world_up: Vec3::Z,
            system_center: Vec3::ZERO,
            min_body_radius: 1e-4,
        }
    }
}

/// Initial establishing-shot framing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Body the camera adopts as its followed anchor once the shot starts
    pub star: BodyId,
    pub establishing_position: Vec3,
    pub home_position: Vec3,
    pub home_target: Vec3,
    pub duration_ms: u64,
    pub ease: Ease,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            star: BodyId::new("sun"),
            establishing_position: Vec3::new(0.0, 50_000.0, 18_000.0),
            home_position: Vec3::new(-3000.0, 4000.0, 2000.0),
            home_target: Vec3::ZERO,
            duration_ms: 2500,
            ease: Ease::Power4Out,
        }
    }
}

impl FramingConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Orbit / trackball rig limits and input sensitivity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per unit of rotate input
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of zoom velocity kept after each rig update is `1 - zoom_damping`
    pub zoom_damping: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            min_distance: 0.000_05,
            max_distance: 120_000.0,
            rotate_speed: 0.008,
            zoom_speed: 0.5,
            zoom_damping: 0.05,
        }
    }
}

// =============================================================================
// CAMERA CONFIG
// =============================================================================

/// Complete camera configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub focus: FocusConfig,
    pub offset: OffsetConfig,
    pub framing: FramingConfig,
    pub rig: RigConfig,
}

impl CameraConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading camera configuration from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without validation
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Reject values that would make distance or timing math meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("focus.floor_distance", self.focus.floor_distance),
            ("focus.radius_multiplier", self.focus.radius_multiplier),
            ("focus.distance_multiplier", self.focus.distance_multiplier),
            ("offset.min_body_radius", self.offset.min_body_radius),
            ("rig.min_distance", self.rig.min_distance),
            ("rig.max_distance", self.rig.max_distance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.focus.position_duration_ms == 0
            || self.focus.target_duration_ms == 0
            || self.framing.duration_ms == 0
        {
            return Err(ConfigError::Invalid(
                "tween durations must be non-zero".to_string(),
            ));
        }

        if self.rig.max_distance < self.rig.min_distance {
            return Err(ConfigError::Invalid(format!(
                "rig.max_distance ({}) is below rig.min_distance ({})",
                self.rig.max_distance, self.rig.min_distance
            )));
        }

        if !(0.0..1.0).contains(&self.rig.zoom_damping) {
            return Err(ConfigError::Invalid(format!(
                "rig.zoom_damping must be in [0, 1), got {}",
                self.rig.zoom_damping
            )));
        }

        if self.offset.world_up.length_squared() == 0.0 {
            return Err(ConfigError::Invalid(
                "offset.world_up must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// Locates the camera config file
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create loader from `ORRERY_CONFIG` or the default locations
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::new(path);
        }

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::new(DEFAULT_CONFIG_PATH);
        }

        // crates/orrery-camera -> workspace root
        let workspace_config = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join(DEFAULT_CONFIG_PATH);
        if workspace_config.exists() {
            return Self::new(workspace_config);
        }

        Self::new(DEFAULT_CONFIG_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to defaults when the file does not exist
    pub fn load(&self) -> Result<CameraConfig, ConfigError> {
        if !self.path.exists() {
            debug!(
                "No camera config at {}, using defaults",
                self.path.display()
            );
            return Ok(CameraConfig::default());
        }
        CameraConfig::load(&self.path)
    }
}

static GLOBAL_CONFIG: OnceLock<CameraConfig> = OnceLock::new();

/// Process-wide camera config, loaded once on first use
pub fn global_config() -> &'static CameraConfig {
    GLOBAL_CONFIG.get_or_init(|| {
        let loader = ConfigLoader::from_env();
        loader.load().unwrap_or_else(|e| {
            warn!("Falling back to default camera config: {}", e);
            CameraConfig::default()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CameraConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
focus:
  distance_multiplier: 8.0
  ease: cubic_out
rig:
  max_distance: 5000.0
"#;
        let config = CameraConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.focus.distance_multiplier, 8.0);
        assert_eq!(config.focus.ease, Ease::CubicOut);
        assert_eq!(config.focus.radius_multiplier, 1.5);
        assert_eq!(config.rig.max_distance, 5000.0);
        assert_eq!(config.framing, FramingConfig::default());
    }

    #[test]
    fn test_vectors_parse_from_sequences() {
        let yaml = "focus:\n  star_offset: [1.0, 2.0, 3.0]\n";
        let config = CameraConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.focus.star_offset, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_validate_rejects_inverted_distances() {
        let mut config = CameraConfig::default();
        config.rig.max_distance = 0.00001;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let mut config = CameraConfig::default();
        config.focus.target_duration_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let loader = ConfigLoader::new("does/not/exist/camera.yaml");
        assert_eq!(loader.load().unwrap(), CameraConfig::default());
    }

    #[test]
    fn test_bundled_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/camera.yaml");
        let config = CameraConfig::load(path).unwrap();
        assert_eq!(config.focus.rearm_delay_ms, 2500);
    }
}
