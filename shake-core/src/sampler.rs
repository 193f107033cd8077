//! Relative-pose sampling.
//!
//! After every step the rig samples where a body sits relative to a
//! reference body (typically a brick relative to the shaken table). The
//! rotation is reduced to a canonical axis-angle so that recorded values
//! are unique: the angle is always in `[0, π]` and a near-identity
//! rotation reports an angle of exactly zero with a fixed placeholder
//! axis.

use nalgebra::{Point3, UnitVector3, Vector3};
use serde::{Deserialize, Serialize};
use shake_types::Pose;

/// Rotations with a vector part shorter than this are treated as the
/// identity: angle exactly `0.0`, axis `+X`.
pub const ANGLE_EPSILON: f64 = 1e-10;

/// A body's pose expressed in a reference body's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeFrame {
    /// Position of the body's origin in the reference frame.
    pub offset: Vector3<f64>,
    /// Rotation axis, unit length. `+X` when the rotation is degenerate.
    pub axis: UnitVector3<f64>,
    /// Rotation angle about `axis`, in `[0, π]` radians.
    pub angle: f64,
}

/// Which values of a [`RelativeFrame`] a tracked stream records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleKind {
    /// Offset components: `x y z`.
    Offset,
    /// In-plane tilt: `axis_z angle`.
    Rotation,
    /// Everything: `x y z axis_x axis_y axis_z angle`.
    Full,
}

/// One recorded sample of a tracked pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Sample time in seconds.
    pub time: f64,
    /// Values as laid out by the stream's [`SampleKind`].
    pub values: Vec<f64>,
}

/// Compute `body`'s pose in `reference`'s frame with canonical axis-angle
/// rotation.
///
/// The result is invariant under any rigid transform applied to both
/// poses: only the relative motion between the two bodies shows up.
#[must_use]
pub fn relative_frame(reference: &Pose, body: &Pose) -> RelativeFrame {
    let relative = reference.inverse().compose(body);
    let offset = relative.position - Point3::origin();

    // Canonicalize the quaternion to the w >= 0 hemisphere so equal
    // rotations always yield the same axis-angle pair.
    let q = relative.rotation.into_inner();
    let q = if q.w < 0.0 { -q } else { q };
    let vector_part = q.imag();
    let vector_norm = vector_part.norm();

    if vector_norm < ANGLE_EPSILON {
        RelativeFrame {
            offset,
            axis: Vector3::x_axis(),
            angle: 0.0,
        }
    } else {
        RelativeFrame {
            offset,
            axis: UnitVector3::new_unchecked(vector_part / vector_norm),
            angle: 2.0 * vector_norm.atan2(q.w),
        }
    }
}

impl RelativeFrame {
    /// Lay out this frame's values for one stream kind.
    #[must_use]
    pub fn values(&self, kind: SampleKind) -> Vec<f64> {
        match kind {
            SampleKind::Offset => vec![self.offset.x, self.offset.y, self.offset.z],
            SampleKind::Rotation => vec![self.axis.z, self.angle],
            SampleKind::Full => vec![
                self.offset.x,
                self.offset.y,
                self.offset.z,
                self.axis.x,
                self.axis.y,
                self.axis.z,
                self.angle,
            ],
        }
    }
}
