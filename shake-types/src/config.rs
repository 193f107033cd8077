//! Run configuration for the excitation rig.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A translational axis of the rig's reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal, the primary excitation direction.
    X,
    /// Vertical (gravity acts along -Y).
    Y,
    /// Horizontal, orthogonal to X.
    Z,
}

impl Axis {
    /// All three axes, in X, Y, Z order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// The unit vector for this axis.
    #[must_use]
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    /// Index into a 3-vector (0, 1, or 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// Configuration for a rig run.
///
/// Construct with [`RigConfig::new`] and the builder methods, then call
/// [`RigConfig::validate`] before handing it to the simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    /// Fixed integration timestep in seconds.
    pub timestep: f64,

    /// Simulated time at which the run stops, in seconds.
    ///
    /// The sample whose time first exceeds this is still recorded, so a
    /// run with `stop_time = 3.0` and `timestep = 1.0` produces samples
    /// at t = 0, 1, 2 and 3.
    pub stop_time: f64,

    /// Axes along which the table is driven. Unlisted axes stay locked.
    pub excited_axes: Vec<Axis>,

    /// Path to a recorded motion profile, if one drives the excitation.
    pub profile_path: Option<PathBuf>,

    /// Directory receiving the output data streams.
    pub output_dir: PathBuf,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            timestep: 1e-3,
            stop_time: 3.0,
            excited_axes: vec![Axis::X],
            profile_path: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl RigConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the integration timestep in seconds.
    #[must_use]
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the stop time in seconds.
    #[must_use]
    pub fn with_stop_time(mut self, stop_time: f64) -> Self {
        self.stop_time = stop_time;
        self
    }

    /// Set the driven axes.
    #[must_use]
    pub fn with_excited_axes(mut self, axes: impl Into<Vec<Axis>>) -> Self {
        self.excited_axes = axes.into();
        self
    }

    /// Drive the excitation from a recorded profile file.
    #[must_use]
    pub fn with_profile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_path = Some(path.into());
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RigError::InvalidConfig`] if the timestep or stop
    /// time is not positive and finite, or if an axis is listed twice.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(crate::RigError::invalid_config(format!(
                "timestep must be positive and finite, got {}",
                self.timestep
            )));
        }
        if !self.stop_time.is_finite() || self.stop_time <= 0.0 {
            return Err(crate::RigError::invalid_config(format!(
                "stop_time must be positive and finite, got {}",
                self.stop_time
            )));
        }
        for axis in Axis::ALL {
            if self.excited_axes.iter().filter(|&&a| a == axis).count() > 1 {
                return Err(crate::RigError::invalid_config(format!(
                    "axis {axis} listed more than once"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RigConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.excited_axes, vec![Axis::X]);
        assert!(config.profile_path.is_none());
    }

    #[test]
    fn builder_chain() {
        let config = RigConfig::new()
            .with_timestep(1e-5)
            .with_stop_time(30.0)
            .with_excited_axes([Axis::X, Axis::Z])
            .with_profile_path("quake.txt")
            .with_output_dir("out");
        assert!(config.validate().is_ok());
        assert_eq!(config.timestep, 1e-5);
        assert_eq!(config.excited_axes.len(), 2);
        assert_eq!(config.profile_path, Some(PathBuf::from("quake.txt")));
    }

    #[test]
    fn rejects_bad_timestep() {
        assert!(RigConfig::new().with_timestep(0.0).validate().is_err());
        assert!(RigConfig::new().with_timestep(-1e-3).validate().is_err());
        assert!(RigConfig::new().with_timestep(f64::NAN).validate().is_err());
    }

    #[test]
    fn rejects_duplicate_axis() {
        let config = RigConfig::new().with_excited_axes([Axis::X, Axis::X]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn axis_helpers() {
        assert_eq!(Axis::Y.unit(), Vector3::y());
        assert_eq!(Axis::Z.index(), 2);
        assert_eq!(Axis::X.to_string(), "x");
    }

    #[test]
    fn config_serde_round_trip() {
        let config = RigConfig::new().with_stop_time(5.0);
        let json = serde_json::to_string(&config).unwrap();
        let back: RigConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
