//! Core types for the shake-table excitation rig.
//!
//! This crate provides the foundational types for prescribing a seismic-style
//! excitation between two rigid bodies and recording the response of bodies
//! resting on the shaken one:
//!
//! - [`Pose`] / [`BodyId`] - rigid-body pose and arena handles
//! - [`Excitation`] - a pure time-to-value motion function (closed-form sine
//!   or a sampled, interpolated motion profile)
//! - [`RigConfig`] - timestep, stop time, excited axes, file locations
//! - [`RigError`] - the error taxonomy shared across the rig
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no I/O loop, no physics, no
//! stepping. They're the common language between:
//!
//! - The external dynamics engine that resolves contacts and friction
//! - The excitation constraint that feeds it prescribed displacements
//! - The sampling/recording layer that persists relative motion
//!
//! # Coordinate System
//!
//! Right-handed, Y up: the table surface lies in the X-Z plane and the
//! primary horizontal excitation acts along X.
//!
//! # Example
//!
//! ```
//! use shake_types::{Excitation, Pose};
//! use nalgebra::Point3;
//!
//! let quake = Excitation::sine(0.0, 1.5, 0.02);
//! assert!(quake.value(0.0).abs() < 1e-12);
//!
//! let table = Pose::from_position(Point3::new(0.0, -0.5, 0.0));
//! assert!(table.is_finite());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(
    clippy::missing_const_for_fn, // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,   // Error docs added where non-obvious
)]

mod body;
mod config;
mod error;
mod excitation;

pub use body::{BodyGeometry, BodyId, MassProperties, Pose};
pub use config::{Axis, RigConfig};
pub use error::{EngineError, RigError};
pub use excitation::{ControlPoint, Excitation, MotionProfile, ProfileOutcome, StopReason};

// Re-export math types for convenience
pub use nalgebra::{Point3, UnitQuaternion, UnitVector3, Vector3};

/// Result type for rig operations.
pub type Result<T> = std::result::Result<T, RigError>;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Axis, BodyGeometry, BodyId, ControlPoint, EngineError, Excitation, MassProperties,
        MotionProfile, Pose, ProfileOutcome, Result, RigConfig, RigError, StopReason,
    };
}
