//! Closed-form inverse kinematics for a yaw + two-pitch-link arm.
//!
//! The shoulder yaws the arm toward the target azimuth, which leaves a
//! planar two-link problem in the (radial, z) plane. The elbow solution is
//! fixed to the negative branch of `acos`, so the same target always gives
//! the same configuration.

use crate::constants::{COS_TOLERANCE, REACH_TOLERANCE};
use crate::error::IkError;
use crate::types::{ArmGeometry, JointAngles, TargetPosition};

pub struct InverseKinematics {
    geometry: ArmGeometry,
}

impl InverseKinematics {
    pub fn new(geometry: ArmGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &ArmGeometry {
        &self.geometry
    }

    pub fn solve(&self, target: TargetPosition) -> Result<JointAngles, IkError> {
        solve(target, &self.geometry)
    }
}

/// Solve the joint angles, in degrees, that place the end effector at `target`.
pub fn solve(target: TargetPosition, geometry: &ArmGeometry) -> Result<JointAngles, IkError> {
    let l1 = geometry.upper_arm();
    let l2 = geometry.lower_arm();

    let shoulder_rad = target.y.atan2(target.x);

    let d = (target.x.powi(2) + target.y.powi(2)).sqrt();
    let distance = (d.powi(2) + target.z.powi(2)).sqrt();

    let reach = geometry.reach();
    if distance > reach + REACH_TOLERANCE {
        return Err(IkError::OutOfReach { distance, reach });
    }

    let fold = geometry.fold();
    if distance < fold - REACH_TOLERANCE {
        return Err(IkError::TooClose { distance, fold });
    }

    // Targets within tolerance of the boundary are pulled onto it.
    let radius = if distance > reach {
        reach
    } else if distance < fold {
        fold
    } else {
        distance
    };

    let cos_theta = (radius.powi(2) - l1.powi(2) - l2.powi(2)) / (2.0 * l1 * l2);
    if !(cos_theta >= -1.0 - COS_TOLERANCE && cos_theta <= 1.0 + COS_TOLERANCE) {
        return Err(IkError::MathDomain { cos_theta });
    }

    let lower_rad = -cos_theta.clamp(-1.0, 1.0).acos();

    let k1 = l1 + l2 * lower_rad.cos();
    let k2 = l2 * lower_rad.sin();
    let upper_rad = target.z.atan2(d) - k2.atan2(k1);

    Ok(JointAngles {
        shoulder: shoulder_rad.to_degrees(),
        upper: upper_rad.to_degrees(),
        lower: lower_rad.to_degrees(),
    })
}

/// Position of the end effector for the given joint angles, in degrees.
///
/// `upper` is measured from the horizontal plane and `lower` relative to
/// the upper arm, the same convention `solve` returns.
pub fn forward(angles: &JointAngles, geometry: &ArmGeometry) -> TargetPosition {
    let shoulder = angles.shoulder.to_radians();
    let upper = angles.upper.to_radians();
    let elbow = upper + angles.lower.to_radians();

    let radial = geometry.upper_arm() * upper.cos() + geometry.lower_arm() * elbow.cos();
    let z = geometry.upper_arm() * upper.sin() + geometry.lower_arm() * elbow.sin();

    TargetPosition {
        x: radial * shoulder.cos(),
        y: radial * shoulder.sin(),
        z,
    }
}
