//! Forward kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix3, Rotation3, Vector3};
use util::maths::round_dp;

use super::*;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Solver {
    /// Calculate the end effector coordinate for the given servo angles.
    ///
    /// The result is rounded to one decimal place (1 mm).
    pub fn forward(&self, angles_deg: [i32; NUM_KIN_JOINTS]) -> Coordinate {
        let exact = self.forward_exact([
            angles_deg[0] as f64,
            angles_deg[1] as f64,
            angles_deg[2] as f64,
        ]);

        exact.map(|c| round_dp(c, COORD_DECIMALS))
    }

    /// Calculate the unrounded end effector coordinate for the given servo
    /// angles.
    pub fn forward_exact(&self, angles_deg: [f64; NUM_KIN_JOINTS]) -> Coordinate {
        self.chain_position(&to_chain_rad(angles_deg))
    }

    /// End effector position for chain convention angles.
    pub(crate) fn chain_position(&self, angles_rad: &Vector3<f64>) -> Coordinate {
        let mut rot = Rotation3::identity();
        let mut pos = Vector3::zeros();

        for (i, link) in self.links.links().iter().enumerate() {
            rot *= link.rotation(angles_rad[i]);
            pos += rot * link.offset();
        }

        pos
    }

    /// End effector position and its jacobian with respect to the chain
    /// convention angles.
    ///
    /// Column `i` of the jacobian is the world axis of joint `i` crossed with
    /// the vector from that joint to the end effector.
    pub(crate) fn chain_position_jacobian(
        &self,
        angles_rad: &Vector3<f64>,
    ) -> (Coordinate, Matrix3<f64>) {
        let mut rot = Rotation3::identity();
        let mut pos = Vector3::zeros();

        let mut joint_pos = [Vector3::zeros(); NUM_KIN_JOINTS];
        let mut joint_axis = [Vector3::zeros(); NUM_KIN_JOINTS];

        for (i, link) in self.links.links().iter().enumerate() {
            joint_pos[i] = pos;
            joint_axis[i] = rot * link.axis.unit().into_inner();

            rot *= link.rotation(angles_rad[i]);
            pos += rot * link.offset();
        }

        let mut jac = Matrix3::zeros();
        for i in 0..NUM_KIN_JOINTS {
            jac.set_column(i, &joint_axis[i].cross(&(pos - joint_pos[i])));
        }

        (pos, jac)
    }
}
