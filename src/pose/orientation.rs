use nalgebra::{Matrix3, Vector3};

use super::PoseEstimate;

/// Rotation about the x, y and z axes, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
	pub theta_x: f64,
	pub theta_y: f64,
	pub theta_z: f64,
}

/// Decompose a rotation matrix into Euler angles.
///
/// Assumes `R = Rz * Ry * Rx`. No special handling near gimbal lock
/// (`theta_y` = ±90°), and a non-orthonormal `R` gives meaningless angles.
pub fn euler_angles(R: &Matrix3<f64>) -> EulerAngles {
	let theta_x = f64::atan2(R[(2, 1)], R[(2, 2)]);
	let theta_y = f64::atan2(-R[(2, 0)], f64::hypot(R[(2, 1)], R[(2, 2)]));
	let theta_z = f64::atan2(R[(1, 0)], R[(0, 0)]);
	EulerAngles {
		theta_x: theta_x.to_degrees(),
		theta_y: theta_y.to_degrees(),
		theta_z: theta_z.to_degrees(),
	}
}

/// Position of the camera in the tag frame: `Rᵗ·(−t)`
pub fn camera_position(R: &Matrix3<f64>, t: &Vector3<f64>) -> Vector3<f64> {
	R.tr_mul(&(-t))
}

/// Post-processed view of a [PoseEstimate]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagOrientation {
	pub angles: EulerAngles,
	pub camera_position: Vector3<f64>,
}

impl TagOrientation {
	pub fn from_pose(pose: &PoseEstimate) -> Self {
		Self {
			angles: euler_angles(&pose.R),
			camera_position: camera_position(&pose.R, &pose.t),
		}
	}
}
