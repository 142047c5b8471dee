//! Scene configuration.
//!
//! Every visual constant of the globe lives here and can be overridden from a
//! TOML file. Missing sections and fields fall back to the defaults below.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::scene::label::{LABEL_CANVAS_HEIGHT, LABEL_CANVAS_WIDTH};
use crate::scene::sync::{RingPolicy, VisualAttributes};

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "globe.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub points: PointConfig,
    pub rings: RingConfig,
    pub camera: CameraConfig,
    pub controls: ControlConfig,
    pub auto_rotate: AutoRotateConfig,
    pub body: BodyConfig,
    pub imagery: ImageryConfig,
    pub overlay: OverlayConfig,
}

/// Per-state point attributes, looked up selected > current > default
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointConfig {
    pub default: VisualAttributes,
    pub current: VisualAttributes,
    pub selected: VisualAttributes,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            default: VisualAttributes::new(0.25, 0.10, "#ffcc00"),
            current: VisualAttributes::new(0.25, 0.12, "#ffcc00"),
            selected: VisualAttributes::new(0.25, 0.10, "#38bdf8"),
        }
    }
}

/// Ring pulse timing (degrees, degrees per second, milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    pub policy: RingPolicy,
    pub max_radius: f64,
    pub propagation_speed: f64,
    pub repeat_period_ms: u64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            policy: RingPolicy::All,
            max_radius: 0.6,
            propagation_speed: 0.8,
            repeat_period_ms: 1600,
        }
    }
}

/// Camera framing, altitudes in globe radii above the surface
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub default_altitude: f64,
    pub selected_altitude: f64,
    pub transition_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            default_altitude: 1.5,
            selected_altitude: 0.6,
            transition_ms: 1100,
        }
    }
}

/// Orbit control settings, distances in scene units from the globe center
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub zoom_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enable_zoom: true,
            enable_pan: false,
            enable_damping: false,
            zoom_speed: 1.1,
            min_distance: 140.0,
            max_distance: 520.0,
        }
    }
}

/// Idle rotation kicks in beyond `distance`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoRotateConfig {
    pub distance: f64,
    pub speed: f64,
}

impl Default for AutoRotateConfig {
    fn default() -> Self {
        Self {
            distance: 200.0,
            speed: 0.15,
        }
    }
}

/// Secondary celestial body. Sizes are multiples of the globe radius.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub radius_multiplier: f64,
    pub distance_multiplier: f64,
    pub segments: u32,
    pub color: String,
    pub shininess: f64,
    pub texture: Option<String>,
    pub label: String,
    pub label_color: String,
    /// Label height above the body center, in body radii
    pub label_offset: f64,
    /// Label width, in globe radii
    pub label_scale: f64,
    /// Raster the label text is drawn into; zero means no drawing surface
    pub label_canvas: (u32, u32),
    /// Degrees per second around the globe's polar axis; 0 keeps it still
    pub orbit_speed: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            radius_multiplier: 0.2724,
            distance_multiplier: 60.3,
            segments: 48,
            color: "#cbd5f5".to_string(),
            shininess: 5.0,
            texture: Some("textures/moon.jpg".to_string()),
            label: "Moon".to_string(),
            label_color: "#e2e8f0".to_string(),
            label_offset: 3.2,
            label_scale: 6.0,
            label_canvas: (LABEL_CANVAS_WIDTH, LABEL_CANVAS_HEIGHT),
            orbit_speed: 0.0,
        }
    }
}

/// Globe imagery. The low-resolution ground is built in; the high-resolution
/// one is fetched after mount.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageryConfig {
    pub ground_high: Option<String>,
    pub ground_color: String,
    pub background_color: String,
    pub show_stars: bool,
    pub show_atmosphere: bool,
    pub atmosphere_color: String,
    pub atmosphere_altitude: f64,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            ground_high: Some("data/ne_110m_coastline.json".to_string()),
            ground_color: "#22d3ee".to_string(),
            background_color: "#020617".to_string(),
            show_stars: true,
            show_atmosphere: true,
            atmosphere_color: "#38bdf8".to_string(),
            atmosphere_altitude: 0.22,
        }
    }
}

/// Country outline overlay
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub path: Option<String>,
    pub stroke_color: String,
    pub altitude: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            path: Some("geo/countries.geojson".to_string()),
            stroke_color: "#737373".to_string(),
            altitude: 0.0015,
        }
    }
}

impl SceneConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `path`, or use defaults if it is missing or broken
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("could not load {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }
}
