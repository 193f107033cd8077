//! Rigid-body pose and scene-description types.
//!
//! The rig never owns body state: the external dynamics engine does. Bodies
//! are referred to by [`BodyId`] arena handles, and their poses cross the
//! engine boundary as [`Pose`] values.

use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Unique identifier for a rigid body owned by the dynamics engine.
///
/// Handles are stable small integers handed out at body creation; tracked
/// pairs and constraints store these indices rather than owning references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl BodyId {
    /// Create a new body ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for BodyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Position and orientation of a rigid body.
///
/// # Example
///
/// ```
/// use shake_types::Pose;
/// use nalgebra::Point3;
///
/// let pose = Pose::from_position(Point3::new(1.0, 2.0, 3.0));
/// let local = Point3::new(1.0, 0.0, 0.0);
/// assert_eq!(pose.transform_point(&local), Point3::new(2.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in world coordinates.
    pub position: Point3<f64>,
    /// Orientation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Create an identity pose (origin, no rotation).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pose from position only (identity rotation).
    #[must_use]
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pose from position and rotation.
    #[must_use]
    pub const fn from_position_rotation(
        position: Point3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self { position, rotation }
    }

    /// Create a pose from an isometry.
    #[must_use]
    pub fn from_isometry(isometry: nalgebra::Isometry3<f64>) -> Self {
        Self {
            position: isometry.translation.vector.into(),
            rotation: isometry.rotation,
        }
    }

    /// Convert to the equivalent isometry.
    #[must_use]
    pub fn to_isometry(&self) -> nalgebra::Isometry3<f64> {
        nalgebra::Isometry3::from_parts(self.position.coords.into(), self.rotation)
    }

    /// Transform a point from local to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.position + self.rotation * local.coords
    }

    /// Transform a vector from local to world coordinates (rotation only).
    #[must_use]
    pub fn transform_vector(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * local
    }

    /// Transform a point from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, world: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation.inverse() * (world - self.position))
    }

    /// Transform a vector from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_vector(&self, world: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse() * world
    }

    /// Compute the inverse pose.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            position: Point3::from(-(inv_rotation * self.position.coords)),
            rotation: inv_rotation,
        }
    }

    /// Compose two poses: self * other.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            position: self.transform_point(&other.position),
            rotation: self.rotation * other.rotation,
        }
    }

    /// Return this pose displaced by `offset` in its own local frame.
    #[must_use]
    pub fn translated_local(&self, offset: &Vector3<f64>) -> Self {
        Self {
            position: self.position + self.rotation * offset,
            rotation: self.rotation,
        }
    }

    /// Check if the pose contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|x| x.is_finite())
            && self.rotation.coords.iter().all(|x| x.is_finite())
    }
}

/// Collision/visual geometry of a body, consumed opaquely by the engine.
///
/// The shake-table scenario is built entirely from boxes (floor, table,
/// bricks), so that is the only shape the rig itself constructs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyGeometry {
    /// Axis-aligned box described by its half extents.
    Box {
        /// Half extents along the local X, Y and Z axes.
        half_extents: Vector3<f64>,
    },
}

impl BodyGeometry {
    /// Create a box from its full extents.
    #[must_use]
    pub fn box_with_extents(x: f64, y: f64, z: f64) -> Self {
        Self::Box {
            half_extents: Vector3::new(x / 2.0, y / 2.0, z / 2.0),
        }
    }

    /// Volume of the shape in m³.
    #[must_use]
    pub fn volume(&self) -> f64 {
        match self {
            Self::Box { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
        }
    }
}

/// Mass properties of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    /// Total mass in kg.
    pub mass: f64,
    /// Center of mass offset from body origin in local coordinates.
    pub center_of_mass: Vector3<f64>,
    /// Inertia tensor about the center of mass in local coordinates (kg·m²).
    pub inertia: Matrix3<f64>,
}

impl MassProperties {
    /// Create mass properties with explicit values.
    #[must_use]
    pub const fn new(mass: f64, center_of_mass: Vector3<f64>, inertia: Matrix3<f64>) -> Self {
        Self {
            mass,
            center_of_mass,
            inertia,
        }
    }

    /// Mass properties of a uniform box with the given half extents.
    ///
    /// Inertia of a solid box with full dimensions (x, y, z):
    /// - Ixx = (1/12) · m · (y² + z²), and cyclic permutations.
    #[must_use]
    pub fn box_shape(mass: f64, half_extents: Vector3<f64>) -> Self {
        let x2 = 4.0 * half_extents.x * half_extents.x;
        let y2 = 4.0 * half_extents.y * half_extents.y;
        let z2 = 4.0 * half_extents.z * half_extents.z;

        let ixx = mass * (y2 + z2) / 12.0;
        let iyy = mass * (x2 + z2) / 12.0;
        let izz = mass * (x2 + y2) / 12.0;

        Self {
            mass,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::from_diagonal(&Vector3::new(ixx, iyy, izz)),
        }
    }

    /// Mass properties of a uniform box given full extents and a density.
    ///
    /// This mirrors how the shake-table scene describes its bodies: the
    /// floor and table at 3000 kg/m³, the bricks at 2670 kg/m³.
    #[must_use]
    pub fn box_from_density(x: f64, y: f64, z: f64, density: f64) -> Self {
        let mass = x * y * z * density;
        Self::box_shape(mass, Vector3::new(x / 2.0, y / 2.0, z / 2.0))
    }

    /// Get the inverse mass (0 if mass is infinite/static).
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        if self.mass <= 0.0 || self.mass.is_infinite() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Check if this represents a static (immovable) body.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0 || self.mass.is_infinite()
    }

    /// Validate that the mass properties are physically plausible.
    pub fn validate(&self) -> crate::Result<()> {
        if self.mass < 0.0 {
            return Err(crate::RigError::invalid_config("mass cannot be negative"));
        }

        if !self.center_of_mass.iter().all(|x| x.is_finite()) {
            return Err(crate::RigError::invalid_config(
                "center of mass must be finite",
            ));
        }

        let eigenvalues = self.inertia.symmetric_eigenvalues();
        if eigenvalues.iter().any(|&e| e < -1e-10) {
            return Err(crate::RigError::invalid_config(
                "inertia tensor must be positive semi-definite",
            ));
        }

        Ok(())
    }
}
