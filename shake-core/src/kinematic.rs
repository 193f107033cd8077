//! Reference kinematic engine.
//!
//! [`KinematicEngine`] implements [`DynamicsEngine`] without any dynamics:
//! driven bodies follow their prescribed motion exactly, free bodies hold
//! their pose, and nothing ever slides or topples. It is the deterministic
//! baseline the rest of the rig is tested against, and the engine a run
//! falls back to when no physics backend is wired in.

use crate::constraint::ExcitationConstraint;
use crate::engine::{ConstraintId, DynamicsEngine};
use shake_types::{Axis, BodyGeometry, BodyId, EngineError, Excitation, MassProperties, Pose};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct KinematicBody {
    geometry: BodyGeometry,
    mass: MassProperties,
    pose: Pose,
    is_fixed: bool,
}

#[derive(Debug, Clone)]
struct BoundConstraint {
    reference: BodyId,
    driven: BodyId,
    constraint: ExcitationConstraint,
}

/// A dynamics engine that moves driven bodies exactly along their
/// prescribed motion.
#[derive(Debug, Clone, Default)]
pub struct KinematicEngine {
    bodies: Vec<KinematicBody>,
    constraints: Vec<BoundConstraint>,
    time: f64,
    fail_after: Option<f64>,
}

impl KinematicEngine {
    /// Create an empty engine at t = 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a body already placed at `pose`.
    pub fn add_body(
        &mut self,
        geometry: BodyGeometry,
        mass: MassProperties,
        pose: Pose,
        is_fixed: bool,
    ) -> BodyId {
        let id = self.create_body(geometry, mass, is_fixed);
        // The body was just created, the handle cannot be stale.
        if let Some(body) = self.bodies.get_mut(id.raw() as usize) {
            body.pose = pose;
        }
        id
    }

    /// Bind `driven` to `reference` at their current relative pose, all
    /// axes locked.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBody`] for an unknown handle.
    pub fn bind_constraint(
        &mut self,
        reference: BodyId,
        driven: BodyId,
    ) -> Result<ConstraintId, EngineError> {
        let reference_pose = self
            .body(reference)?
            .pose
            .inverse()
            .compose(&self.body(driven)?.pose);
        self.create_prescribed_constraint(reference, driven, reference_pose)
    }

    /// Force a divergence error on the first step at or past `t`.
    ///
    /// Test hook for exercising the rig's abort path.
    pub fn inject_divergence_after(&mut self, t: f64) {
        self.fail_after = Some(t);
    }

    /// Number of bodies in the engine.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// A body's collision geometry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBody`] for an unknown handle.
    pub fn geometry(&self, body: BodyId) -> Result<&BodyGeometry, EngineError> {
        Ok(&self.body(body)?.geometry)
    }

    /// A body's mass properties.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBody`] for an unknown handle.
    pub fn mass_properties(&self, body: BodyId) -> Result<&MassProperties, EngineError> {
        Ok(&self.body(body)?.mass)
    }

    /// Whether a body was created fixed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBody`] for an unknown handle.
    pub fn is_fixed(&self, body: BodyId) -> Result<bool, EngineError> {
        Ok(self.body(body)?.is_fixed)
    }

    fn body(&self, id: BodyId) -> Result<&KinematicBody, EngineError> {
        self.bodies
            .get(id.raw() as usize)
            .ok_or(EngineError::InvalidBody(id.raw()))
    }
}

impl DynamicsEngine for KinematicEngine {
    fn create_body(
        &mut self,
        geometry: BodyGeometry,
        mass: MassProperties,
        is_fixed: bool,
    ) -> BodyId {
        let id = BodyId::new(self.bodies.len() as u64);
        debug!(%id, fixed = is_fixed, "created body");
        self.bodies.push(KinematicBody {
            geometry,
            mass,
            pose: Pose::identity(),
            is_fixed,
        });
        id
    }

    fn set_body_pose(&mut self, body: BodyId, pose: Pose) -> Result<(), EngineError> {
        self.bodies
            .get_mut(body.raw() as usize)
            .ok_or(EngineError::InvalidBody(body.raw()))?
            .pose = pose;
        Ok(())
    }

    fn create_prescribed_constraint(
        &mut self,
        reference: BodyId,
        driven: BodyId,
        reference_pose: Pose,
    ) -> Result<ConstraintId, EngineError> {
        self.body(reference)?;
        let driven_body = self.body(driven)?;
        if driven_body.is_fixed {
            warn!(%driven, "prescribing motion on a fixed body; it will move anyway");
        }
        let id = ConstraintId::new(self.constraints.len() as u64);
        debug!(%id, %reference, %driven, "bound prescribed-motion constraint");
        self.constraints.push(BoundConstraint {
            reference,
            driven,
            constraint: ExcitationConstraint::new(reference_pose),
        });
        Ok(id)
    }

    fn set_axis_motion(
        &mut self,
        constraint: ConstraintId,
        axis: Axis,
        excitation: Excitation,
    ) -> Result<(), EngineError> {
        let bound = self
            .constraints
            .get_mut(constraint.raw() as usize)
            .ok_or(EngineError::InvalidConstraint(constraint.raw()))?;
        bound.constraint.set_motion(axis, excitation);
        Ok(())
    }

    fn step(&mut self, dt: f64) -> Result<(), EngineError> {
        self.time += dt;
        if let Some(fail_time) = self.fail_after {
            if self.time >= fail_time {
                return Err(EngineError::diverged(format!(
                    "injected divergence at t = {}",
                    self.time
                )));
            }
        }
        let mut updates = Vec::with_capacity(self.constraints.len());
        for bound in &self.constraints {
            let reference_pose = self.body(bound.reference)?.pose;
            let target = reference_pose.compose(&bound.constraint.target_pose(self.time));
            if !target.is_finite() {
                return Err(EngineError::diverged(format!(
                    "non-finite target pose for {}",
                    bound.driven
                )));
            }
            updates.push((bound.driven, target));
        }
        for (driven, target) in updates {
            self.set_body_pose(driven, target)?;
        }
        Ok(())
    }

    fn get_pose(&self, body: BodyId) -> Result<Pose, EngineError> {
        Ok(self.body(body)?.pose)
    }

    fn current_time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn test_mass() -> MassProperties {
        MassProperties::box_shape(1.0, nalgebra::Vector3::new(0.5, 0.5, 0.5))
    }

    fn test_geometry() -> BodyGeometry {
        BodyGeometry::box_with_extents(1.0, 1.0, 1.0)
    }

    #[test]
    fn free_body_holds_pose() {
        let mut engine = KinematicEngine::new();
        let body = engine.add_body(
            test_geometry(),
            test_mass(),
            Pose::from_position(Point3::new(1.0, 2.0, 3.0)),
            false,
        );
        engine.step(0.1).unwrap();
        let pose = engine.get_pose(body).unwrap();
        assert_relative_eq!(pose.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn driven_body_tracks_excitation() {
        let mut engine = KinematicEngine::new();
        let ground = engine.add_body(test_geometry(), test_mass(), Pose::identity(), true);
        let table = engine.add_body(
            test_geometry(),
            test_mass(),
            Pose::from_position(Point3::new(0.0, 1.0, 0.0)),
            false,
        );
        let constraint = engine.bind_constraint(ground, table).unwrap();
        engine
            .set_axis_motion(constraint, Axis::X, Excitation::sine(0.0, 0.25, 2.0))
            .unwrap();

        // A quarter period of 0.25 Hz is one second.
        for _ in 0..100 {
            engine.step(0.01).unwrap();
        }
        let pose = engine.get_pose(table).unwrap();
        assert_relative_eq!(pose.position.x, 2.0, max_relative = 1e-9);
        assert_relative_eq!(pose.position.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn constraint_follows_moving_reference() {
        let mut engine = KinematicEngine::new();
        let ground = engine.add_body(test_geometry(), test_mass(), Pose::identity(), true);
        let table = engine.add_body(
            test_geometry(),
            test_mass(),
            Pose::from_position(Point3::new(0.0, 1.0, 0.0)),
            false,
        );
        engine.bind_constraint(ground, table).unwrap();
        engine
            .set_body_pose(ground, Pose::from_position(Point3::new(5.0, 0.0, 0.0)))
            .unwrap();
        engine.step(0.01).unwrap();
        let pose = engine.get_pose(table).unwrap();
        assert_relative_eq!(pose.position, Point3::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut engine = KinematicEngine::new();
        assert!(matches!(
            engine.get_pose(BodyId::new(99)),
            Err(EngineError::InvalidBody(99))
        ));
        assert!(matches!(
            engine.set_axis_motion(ConstraintId::new(0), Axis::X, Excitation::none()),
            Err(EngineError::InvalidConstraint(0))
        ));
    }

    #[test]
    fn injected_divergence_fails_step() {
        let mut engine = KinematicEngine::new();
        engine.inject_divergence_after(0.05);
        engine.step(0.01).unwrap();
        let err = engine.step(0.04).unwrap_err();
        assert!(matches!(err, EngineError::Diverged { .. }));
    }
}
