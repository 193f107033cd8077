//! Shake-table excitation rig: drive a table with a prescribed motion and
//! record how bodies resting on it respond.
//!
//! This crate provides the behavior around the pure data types of
//! [`shake_types`]: the engine abstraction, the prescribed-motion
//! constraint, a reference kinematic engine, relative-pose sampling, and
//! append-only data recording.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ShakeRig                              │
//! │  Orchestrates: sample → advance clock → engine step → stop  │
//! └───────────┬────────────────────────────────┬────────────────┘
//!             │                                │
//!             ▼                                ▼
//! ┌───────────────────────────┐  ┌─────────────────────────────┐
//! │      DynamicsEngine       │  │   Sampler + DataRecorder    │
//! │  Bodies, constraints,     │  │  Relative poses, canonical  │
//! │  prescribed axis motion   │  │  axis-angle, text streams   │
//! └───────────┬───────────────┘  └─────────────────────────────┘
//!             │
//!             ▼
//! ┌───────────────────────────┐
//! │   ExcitationConstraint    │
//! │  Per-axis Excitation,     │
//! │  unbound axes locked      │
//! └───────────────────────────┘
//! ```
//!
//! The engine is a trait seam: production runs plug in a full
//! contact-resolving dynamics engine, while [`KinematicEngine`] provides a
//! deterministic reference implementation that moves driven bodies exactly
//! along their prescribed motion.
//!
//! # Quick Start
//!
//! ```
//! use shake_core::{DynamicsEngine, KinematicEngine, ShakeRig};
//! use shake_types::{Axis, BodyGeometry, Excitation, MassProperties, Pose, RigConfig};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut engine = KinematicEngine::new();
//! let ground = engine.add_body(
//!     BodyGeometry::box_with_extents(10.0, 1.0, 10.0),
//!     MassProperties::box_from_density(10.0, 1.0, 10.0, 3000.0),
//!     Pose::from_position(Point3::new(0.0, -2.0, 0.0)),
//!     true,
//! );
//! let table = engine.add_body(
//!     BodyGeometry::box_with_extents(8.0, 0.5, 8.0),
//!     MassProperties::box_from_density(8.0, 0.5, 8.0, 3000.0),
//!     Pose::from_position(Point3::new(0.0, -0.5, 0.0)),
//!     false,
//! );
//! let constraint = engine.bind_constraint(ground, table).unwrap();
//! engine
//!     .set_axis_motion(constraint, Axis::X, Excitation::sine(0.0, 1.5, 0.001))
//!     .unwrap();
//!
//! let config = RigConfig::new().with_timestep(0.01).with_stop_time(0.1);
//! let mut rig = ShakeRig::new(engine, config).unwrap();
//! rig.track_offset("table", ground, table, Vector3::zeros());
//! let report = rig.run().unwrap();
//! assert_eq!(report.samples, 11);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(
    clippy::missing_const_for_fn, // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,   // Error docs added where non-obvious
)]

mod constraint;
mod engine;
mod kinematic;
mod recorder;
mod rig;
mod sampler;

pub use constraint::{ExcitationConstraint, MotionTarget};
pub use engine::{ConstraintId, DynamicsEngine};
pub use kinematic::KinematicEngine;
pub use recorder::DataRecorder;
pub use rig::{RunReport, RunState, ShakeRig};
pub use sampler::{relative_frame, RelativeFrame, Sample, SampleKind, ANGLE_EPSILON};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        relative_frame, ConstraintId, DataRecorder, DynamicsEngine, ExcitationConstraint,
        KinematicEngine, MotionTarget, RelativeFrame, RunReport, RunState, Sample, SampleKind,
        ShakeRig,
    };
    pub use shake_types::prelude::*;
}
