//! Error types for the excitation rig.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the external dynamics engine.
///
/// The engine is a black box to the rig; these are the only failure shapes
/// that cross its boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A step failed to produce a valid state (`NaN`/`Inf` or solver failure).
    #[error("engine step diverged: {reason}")]
    Diverged {
        /// Description of what went wrong.
        reason: String,
    },

    /// An operation referenced a body the engine does not know.
    #[error("invalid body ID: {0}")]
    InvalidBody(u64),

    /// An operation referenced a constraint the engine does not know.
    #[error("invalid constraint ID: {0}")]
    InvalidConstraint(u64),
}

impl EngineError {
    /// Create a divergence error.
    #[must_use]
    pub fn diverged(reason: impl Into<String>) -> Self {
        Self::Diverged {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while setting up or running the rig.
#[derive(Debug, Error)]
pub enum RigError {
    /// A sampled motion profile yielded zero usable control points.
    ///
    /// A truncated profile is fine (parsing keeps the prefix); an *empty*
    /// one would make `value(t)` undefined for all t, so it is rejected at
    /// construction.
    #[error("motion profile is empty: {source_name}")]
    EmptyProfile {
        /// Where the profile came from (path or description).
        source_name: String,
    },

    /// Invalid run configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// An input profile file does not exist.
    #[error("profile not found: {}", path.display())]
    ProfileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A sample was appended to a stream that was never opened.
    #[error("unknown output stream: {0}")]
    UnknownStream(String),

    /// The external dynamics engine failed mid-run.
    ///
    /// Fatal: continuing with stale body state would corrupt the recorded
    /// time series, so the loop aborts after flushing what it has.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Reading an input or writing an output stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RigError {
    /// Create an empty-profile error.
    #[must_use]
    pub fn empty_profile(source_name: impl Into<String>) -> Self {
        Self::EmptyProfile {
            source_name: source_name.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this error occurs before the first simulation tick.
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyProfile { .. } | Self::InvalidConfig { .. } | Self::ProfileNotFound { .. }
        )
    }

    /// Check if this error came from the external engine.
    #[must_use]
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Self::Engine(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RigError::empty_profile("accelerogram.txt");
        assert!(err.to_string().contains("accelerogram.txt"));

        let err = RigError::invalid_config("timestep must be positive");
        assert!(err.to_string().contains("timestep"));

        let err = RigError::from(EngineError::diverged("NaN in table pose"));
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn error_predicates() {
        assert!(RigError::empty_profile("x").is_setup_error());
        assert!(!RigError::empty_profile("x").is_engine_error());

        let step_failure = RigError::from(EngineError::InvalidBody(3));
        assert!(step_failure.is_engine_error());
        assert!(!step_failure.is_setup_error());
    }
}
