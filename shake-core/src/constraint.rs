//! The prescribed-motion constraint.
//!
//! An [`ExcitationConstraint`] rigidly binds a driven body to a reference
//! body and displaces it from its rest pose along the reference frame's
//! axes according to per-axis [`Excitation`] functions. Axes with no bound
//! excitation stay locked at the rest pose; they are never free.

use nalgebra::Vector3;
use shake_types::{Axis, Excitation, Pose};

/// The kinematic state a driven axis must hit at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTarget {
    /// Prescribed displacement from the rest pose.
    pub displacement: f64,
    /// Prescribed velocity.
    pub velocity: f64,
    /// Prescribed acceleration.
    pub acceleration: f64,
}

impl MotionTarget {
    /// The target of an axis with no bound excitation: held at rest.
    pub const LOCKED: Self = Self {
        displacement: 0.0,
        velocity: 0.0,
        acceleration: 0.0,
    };
}

/// A rigid lock between two bodies with optional prescribed motion per
/// translational axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcitationConstraint {
    reference_pose: Pose,
    motions: [Option<Excitation>; 3],
}

impl ExcitationConstraint {
    /// Create a constraint holding the driven body at `reference_pose`,
    /// expressed in the reference body's frame, with all axes locked.
    #[must_use]
    pub fn new(reference_pose: Pose) -> Self {
        Self {
            reference_pose,
            motions: [None, None, None],
        }
    }

    /// The driven body's rest pose in the reference body's frame.
    #[must_use]
    pub fn reference_pose(&self) -> &Pose {
        &self.reference_pose
    }

    /// Bind an excitation to one axis, replacing any previous binding.
    pub fn set_motion(&mut self, axis: Axis, excitation: Excitation) {
        self.motions[axis.index()] = Some(excitation);
    }

    /// Unbind an axis; it is locked at the rest pose again.
    pub fn clear_motion(&mut self, axis: Axis) {
        self.motions[axis.index()] = None;
    }

    /// The excitation bound to an axis, if any.
    #[must_use]
    pub fn motion(&self, axis: Axis) -> Option<&Excitation> {
        self.motions[axis.index()].as_ref()
    }

    /// The kinematic target for one axis at time `t`.
    ///
    /// An unbound axis reports [`MotionTarget::LOCKED`].
    #[must_use]
    pub fn target(&self, axis: Axis, t: f64) -> MotionTarget {
        match &self.motions[axis.index()] {
            Some(excitation) => MotionTarget {
                displacement: excitation.value(t),
                velocity: excitation.derivative(t),
                acceleration: excitation.second_derivative(t),
            },
            None => MotionTarget::LOCKED,
        }
    }

    /// The driven body's target pose in the reference body's frame at
    /// time `t`: the rest pose displaced by each axis's prescribed
    /// displacement along the reference frame's axes.
    #[must_use]
    pub fn target_pose(&self, t: f64) -> Pose {
        let mut displacement = Vector3::zeros();
        for axis in Axis::ALL {
            displacement[axis.index()] = self.target(axis, t).displacement;
        }
        let mut pose = self.reference_pose;
        pose.position += displacement;
        pose
    }
}
