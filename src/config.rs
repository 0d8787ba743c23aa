//! Configuration loading for Drishti

use crate::control::PidGains;
use crate::error::{DrishtiError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DrishtiConfig {
    #[serde(default)]
    pub navigator: NavigatorConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Approach controller parameters
#[derive(Clone, Debug, Deserialize)]
pub struct NavigatorConfig {
    /// Bounding-box area at which the target counts as reached (px², default: 20000)
    #[serde(default = "default_arrive_area_threshold")]
    pub arrive_area_threshold: f32,

    /// Camera image width in pixels (default: 640)
    #[serde(default = "default_image_width")]
    pub image_width: u32,

    /// Camera image height in pixels (default: 480)
    #[serde(default = "default_image_height")]
    pub image_height: u32,

    /// Maximum forward velocity in m/s (default: 0.15)
    #[serde(default = "default_max_forward")]
    pub max_forward_velocity: f32,

    /// Maximum turn velocity in rad/s (default: 0.8)
    #[serde(default = "default_max_turn")]
    pub max_turn_velocity: f32,

    /// Spin rate while the target is not visible, rad/s (default: 0.3)
    #[serde(default = "default_search_turn_rate")]
    pub search_turn_rate: f32,

    /// Gains acting on horizontal pixel error
    #[serde(default = "default_turn_gains")]
    pub turn_gains: PidGains,

    /// Gains acting on area error
    #[serde(default = "default_forward_gains")]
    pub forward_gains: PidGains,

    /// Optional bound on both PID integrals (default: unbounded)
    #[serde(default)]
    pub integral_limit: Option<f32>,
}

/// Perception parameters
#[derive(Clone, Debug, Deserialize)]
pub struct DetectorConfig {
    /// Named colour for the colour detector (default: "red")
    #[serde(default = "default_color")]
    pub color: String,

    /// Minimum blob size in pixels (default: 500)
    #[serde(default = "default_min_area")]
    pub min_area: u32,

    /// Opening passes applied to the colour mask (default: 2)
    #[serde(default = "default_open_iterations")]
    pub open_iterations: u32,

    /// Dilation passes after opening (default: 1)
    #[serde(default = "default_dilate_iterations")]
    pub dilate_iterations: u32,

    /// Square kernel radius for mask cleanup (default: 2, i.e. 5x5)
    #[serde(default = "default_kernel_radius")]
    pub kernel_radius: u8,

    /// Class label for model-backed detection (default: "cube")
    #[serde(default = "default_label")]
    pub label: String,

    /// Minimum model confidence (default: 0.4)
    #[serde(default = "default_conf_threshold")]
    pub conf_threshold: f32,
}

/// Control loop timing
#[derive(Clone, Debug, Deserialize)]
pub struct ControlConfig {
    /// Control rate in Hz (default: 20)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f32,

    /// Stop after this many cycles (default: unbounded)
    #[serde(default)]
    pub max_cycles: Option<u64>,

    /// Sleep to hold the control rate (default: false)
    #[serde(default)]
    pub realtime: bool,
}

/// Simulated scene used when no hardware is attached
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Base start position x (meters)
    #[serde(default)]
    pub start_x: f32,

    /// Base start position y (meters)
    #[serde(default)]
    pub start_y: f32,

    /// Base start heading (radians)
    #[serde(default)]
    pub start_theta: f32,

    /// Target position x (meters, default: 2.0)
    #[serde(default = "default_target_x")]
    pub target_x: f32,

    /// Target position y (meters, default: 0.3)
    #[serde(default = "default_target_y")]
    pub target_y: f32,

    /// Target edge length (meters, default: 0.2)
    #[serde(default = "default_target_size")]
    pub target_size: f32,

    /// Target colour as RGB (default: [220, 30, 30])
    #[serde(default = "default_target_rgb")]
    pub target_rgb: [u8; 3],

    /// Horizontal field of view (degrees, default: 60)
    #[serde(default = "default_fov_deg")]
    pub fov_deg: f32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            arrive_area_threshold: default_arrive_area_threshold(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            max_forward_velocity: default_max_forward(),
            max_turn_velocity: default_max_turn(),
            search_turn_rate: default_search_turn_rate(),
            turn_gains: default_turn_gains(),
            forward_gains: default_forward_gains(),
            integral_limit: None,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            min_area: default_min_area(),
            open_iterations: default_open_iterations(),
            dilate_iterations: default_dilate_iterations(),
            kernel_radius: default_kernel_radius(),
            label: default_label(),
            conf_threshold: default_conf_threshold(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            max_cycles: None,
            realtime: false,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            start_theta: 0.0,
            target_x: default_target_x(),
            target_y: default_target_y(),
            target_size: default_target_size(),
            target_rgb: default_target_rgb(),
            fov_deg: default_fov_deg(),
        }
    }
}

// Default value functions
fn default_arrive_area_threshold() -> f32 {
    20_000.0
}
fn default_image_width() -> u32 {
    640
}
fn default_image_height() -> u32 {
    480
}
fn default_max_forward() -> f32 {
    0.15
}
fn default_max_turn() -> f32 {
    0.8
}
fn default_search_turn_rate() -> f32 {
    0.3
}
fn default_turn_gains() -> PidGains {
    PidGains::new(0.004, 0.0001, 0.001)
}
fn default_forward_gains() -> PidGains {
    PidGains::new(0.00001, 0.0, 0.0)
}

fn default_color() -> String {
    "red".to_string()
}
fn default_min_area() -> u32 {
    500
}
fn default_open_iterations() -> u32 {
    2
}
fn default_dilate_iterations() -> u32 {
    1
}
fn default_kernel_radius() -> u8 {
    2
}
fn default_label() -> String {
    "cube".to_string()
}
fn default_conf_threshold() -> f32 {
    0.4
}

fn default_rate_hz() -> f32 {
    20.0
}

fn default_target_x() -> f32 {
    2.0
}
fn default_target_y() -> f32 {
    0.3
}
fn default_target_size() -> f32 {
    0.2
}
fn default_target_rgb() -> [u8; 3] {
    [220, 30, 30]
}
fn default_fov_deg() -> f32 {
    60.0
}

impl NavigatorConfig {
    /// Reject non-positive thresholds, image sizes and velocity caps.
    pub fn validate(&self) -> Result<()> {
        positive("navigator.arrive_area_threshold", self.arrive_area_threshold)?;
        positive("navigator.max_forward_velocity", self.max_forward_velocity)?;
        positive("navigator.max_turn_velocity", self.max_turn_velocity)?;
        if self.image_width == 0 || self.image_height == 0 {
            return Err(DrishtiError::Config(format!(
                "image size must be non-zero, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if self.search_turn_rate.is_nan() || self.search_turn_rate.abs() > self.max_turn_velocity {
            return Err(DrishtiError::Config(format!(
                "navigator.search_turn_rate must be within ±max_turn_velocity ({}), got {}",
                self.max_turn_velocity, self.search_turn_rate
            )));
        }
        for (name, gains) in [
            ("navigator.turn_gains", self.turn_gains),
            ("navigator.forward_gains", self.forward_gains),
        ] {
            if ![gains.kp, gains.ki, gains.kd].iter().all(|g| g.is_finite()) {
                return Err(DrishtiError::Config(format!("{} must be finite", name)));
            }
        }
        if let Some(limit) = self.integral_limit {
            positive("navigator.integral_limit", limit)?;
        }
        Ok(())
    }

    /// Horizontal image centre in pixels.
    pub fn center_x(&self) -> f32 {
        self.image_width as f32 / 2.0
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<()> {
        positive("control.rate_hz", self.rate_hz)
    }

    /// Control period in seconds.
    pub fn period_secs(&self) -> f32 {
        1.0 / self.rate_hz
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("simulation.start_x", self.start_x),
            ("simulation.start_y", self.start_y),
            ("simulation.start_theta", self.start_theta),
            ("simulation.target_x", self.target_x),
            ("simulation.target_y", self.target_y),
        ] {
            if !value.is_finite() {
                return Err(DrishtiError::Config(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        positive("simulation.target_size", self.target_size)?;
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(DrishtiError::Config(format!(
                "simulation.fov_deg must be in (0, 180), got {}",
                self.fov_deg
            )));
        }
        Ok(())
    }
}

impl DrishtiConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DrishtiError::Config(format!("Failed to read config file: {}", e)))?;
        let config: DrishtiConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.navigator.validate()?;
        self.control.validate()?;
        self.simulation.validate()
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DrishtiError::Config(format!("{} must be positive, got {}", name, value)))
    }
}
