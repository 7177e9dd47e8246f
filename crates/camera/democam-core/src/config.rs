//! Run configuration for democam-core.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DemoCamError, Result};

/// What the parser does with a row whose required fields cannot be coerced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Fail the whole run on the first bad row.
    #[default]
    Abort,
    /// Drop the row, log a warning, keep going.
    Skip,
}

/// Options recognized by the pipeline. Offsets are expressed in the
/// configured unit (centimetres in the replay's engine) and converted to
/// working units through `import_scale`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source sampling rate; also the scene rate while keyframes are written.
    pub tickrate: u32,
    /// Frame rate stamped on exported clips.
    pub export_fps: u32,
    /// Bake interval in frames (> 0).
    pub frame_step: f64,
    /// Vertical camera raise from feet to eye height.
    pub head_offset: f64,
    /// Divisor mapping configured-unit offsets into working units.
    pub import_scale: f64,
    /// Vertical drop at full crouch.
    pub crouch_offset: f64,
    pub malformed_rows: MalformedRowPolicy,
    /// Treat absent stance-flag columns as all-zero instead of failing.
    pub allow_missing_flags: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tickrate: 64,
            export_fps: 64,
            frame_step: 1.0,
            head_offset: 150.0,
            import_scale: 0.023,
            crouch_offset: 50.0,
            malformed_rows: MalformedRowPolicy::Abort,
            allow_missing_flags: false,
        }
    }
}

impl Config {
    /// Parse a JSON config; missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(s)
            .map_err(|e| DemoCamError::invalid_config(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DemoCamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tickrate == 0 {
            return Err(DemoCamError::invalid_config("tickrate must be >= 1"));
        }
        if self.export_fps == 0 {
            return Err(DemoCamError::invalid_config("export_fps must be >= 1"));
        }
        if !self.frame_step.is_finite() || self.frame_step <= 0.0 {
            return Err(DemoCamError::invalid_config(format!(
                "frame_step must be finite and > 0 (got {})",
                self.frame_step
            )));
        }
        if !self.import_scale.is_finite() || self.import_scale <= 0.0 {
            return Err(DemoCamError::invalid_config(format!(
                "import_scale must be finite and > 0 (got {})",
                self.import_scale
            )));
        }
        for (name, v) in [
            ("head_offset", self.head_offset),
            ("crouch_offset", self.crouch_offset),
        ] {
            if !v.is_finite() {
                return Err(DemoCamError::invalid_config(format!(
                    "{name} must be finite (got {v})"
                )));
            }
        }
        Ok(())
    }

    /// Convert a configured-unit offset into working length units.
    #[inline]
    pub fn to_working_units(&self, value: f64) -> f64 {
        (value / 100.0) / self.import_scale
    }

    #[inline]
    pub fn head_offset_units(&self) -> f64 {
        self.to_working_units(self.head_offset)
    }

    #[inline]
    pub fn crouch_depth_units(&self) -> f64 {
        self.to_working_units(self.crouch_offset)
    }
}
