//! The dynamics-engine abstraction.
//!
//! The rig never integrates dynamics itself. It talks to an engine through
//! [`DynamicsEngine`]: create bodies, bind a prescribed-motion constraint
//! between two of them, drive axes with excitations, and step time. A
//! production run plugs in a contact-resolving engine; tests and reference
//! runs use [`crate::KinematicEngine`].

use shake_types::{Axis, BodyGeometry, BodyId, EngineError, Excitation, MassProperties, Pose};

/// Opaque handle to a constraint inside an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub u64);

impl ConstraintId {
    /// Create a constraint ID from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Constraint({})", self.0)
    }
}

/// The contract between the rig and a dynamics engine.
///
/// Implementations own all body and constraint state. The rig holds only
/// the handles this trait returns and queries poses back out after each
/// step.
pub trait DynamicsEngine {
    /// Create a body and return its handle.
    ///
    /// The body starts at the identity pose; position it with
    /// [`DynamicsEngine::set_body_pose`]. Fixed bodies never move.
    fn create_body(
        &mut self,
        geometry: BodyGeometry,
        mass: MassProperties,
        is_fixed: bool,
    ) -> BodyId;

    /// Place a body, overwriting its current pose.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBody`] for an unknown handle.
    fn set_body_pose(&mut self, body: BodyId, pose: Pose) -> Result<(), EngineError>;

    /// Rigidly bind `driven` to `reference`.
    ///
    /// `reference_pose` is the driven body's rest pose expressed in the
    /// reference body's frame; prescribed axis motion displaces the driven
    /// body from there along the reference frame's axes. Until an axis is
    /// given motion, it is locked at the rest pose.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBody`] for an unknown handle.
    fn create_prescribed_constraint(
        &mut self,
        reference: BodyId,
        driven: BodyId,
        reference_pose: Pose,
    ) -> Result<ConstraintId, EngineError>;

    /// Drive one axis of a constraint with an excitation function.
    ///
    /// Replaces any excitation previously bound to that axis.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConstraint`] for an unknown handle.
    fn set_axis_motion(
        &mut self,
        constraint: ConstraintId,
        axis: Axis,
        excitation: Excitation,
    ) -> Result<(), EngineError>;

    /// Advance simulated time by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Diverged`] if the step produced an invalid
    /// state. The engine's state is unspecified afterwards; the caller
    /// must not step again.
    fn step(&mut self, dt: f64) -> Result<(), EngineError>;

    /// The current world pose of a body.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBody`] for an unknown handle.
    fn get_pose(&self, body: BodyId) -> Result<Pose, EngineError>;

    /// The engine's current simulated time in seconds.
    fn current_time(&self) -> f64;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn constraint_id_display() {
        assert_eq!(ConstraintId::new(7).to_string(), "Constraint(7)");
        assert_eq!(ConstraintId::new(7).raw(), 7);
    }
}
