//! Tool configuration.
//!
//! Handles loading, validating, and merging `pixmend.toml`. The file is
//! optional: stock defaults are the base layer and whatever the user writes
//! is merged on top, key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! quality = "high"          # "fast" (nearest neighbor) or "high" (progressive bilinear)
//!
//! [colors]
//! threshold = 0             # Default per-channel tolerance for replace-color (0-255)
//!
//! [output]
//! format = "png"            # Extension used for batch outputs
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [[steps]]                 # Transform pipeline used by `run` and `batch`
//! op = "resize"
//! width = 800
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [resize]
//! quality = "fast"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::color::validate_threshold;
use crate::imaging::{ResizeQuality, supported_input_extensions};
use crate::pipeline::Step;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pixmend.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixmendConfig {
    /// Resize defaults for steps that do not name a quality.
    pub resize: ResizeConfig,
    /// Color matching defaults.
    pub colors: ColorsConfig,
    /// Output file settings for batch runs.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Transform pipeline applied by `run` and `batch`.
    pub steps: Vec<Step>,
}

impl PixmendConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.colors.threshold).map_err(|e| {
            ConfigError::Validation(format!("colors.threshold: {e}"))
        })?;

        let format = self.output.format.to_ascii_lowercase();
        if !supported_input_extensions().contains(&format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "output.format must be one of {}, got \"{}\"",
                supported_input_extensions().join(", "),
                self.output.format
            )));
        }

        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }

        for (index, step) in self.steps.iter().enumerate() {
            step.validate().map_err(|e| {
                ConfigError::Validation(format!("steps[{index}] ({}): {e}", step.label()))
            })?;
        }
        Ok(())
    }
}

/// Resize settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub quality: ResizeQuality,
}

/// Color matching settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorsConfig {
    /// Tolerance used by replace-color steps that do not set their own.
    pub threshold: i32,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File extension (and thereby encoder) for batch outputs.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PixmendConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `[[steps]]` list replaces the stock one rather than extending it.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PixmendConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PixmendConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is missing.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<PixmendConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `pixmend.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixmend configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[resize]
# Quality used by resize steps that do not set their own.
#   "fast": nearest neighbor, one pass
#   "high": progressive bilinear, halving/doubling toward the target
quality = "high"

# ---------------------------------------------------------------------------
# Color matching
# ---------------------------------------------------------------------------
[colors]
# Default per-channel tolerance (0-255) for replace-color steps.
# 0 replaces exact RGB matches only.
threshold = 0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Format of files written by `batch`: png, jpg, jpeg, tif, tiff or webp.
format = "png"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Steps
# ---------------------------------------------------------------------------
# Transforms applied in order by `run` and `batch`. No steps by default.
# Every step has an `op`; the remaining keys depend on it:
#
# [[steps]]
# op = "resize"          # width/height in pixels; 0 keeps the aspect ratio
# width = 800
# height = 0
# quality = "fast"       # optional, falls back to [resize] quality
#
# [[steps]]
# op = "flip"
# horizontal = true
# vertical = false
#
# [[steps]]
# op = "rotate"          # 90, 180 or 270 (clockwise)
# degrees = 90
#
# [[steps]]
# op = "crop"            # margins in pixels, or percent when percent = true
# top = 10
# right = 0
# bottom = 10
# left = 0
# percent = false
#
# [[steps]]
# op = "extract"         # keep one rectangle
# x = 0
# y = 0
# width = 100
# height = 100
#
# [[steps]]
# op = "invert"
#
# [[steps]]
# op = "grayscale"
#
# [[steps]]
# op = "replace-color"   # colors as "#rrggbb", "#rrggbbaa" or "r,g,b[,a]"
# from = "#ff0000"
# to = "#00ff00"
# threshold = 16         # optional, falls back to [colors] threshold
"##
}
