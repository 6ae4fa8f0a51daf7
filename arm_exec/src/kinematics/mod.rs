//! Kinematics module
//!
//! Converts between joint space (the first three joint angles) and cartesian
//! space (the end effector coordinate).
//!
//! Externally joint angles follow the servo convention. Internally joints 1
//! and 2 are negated before the rotations are composed, as the servos turn
//! the opposite way to the right hand rule about their chain axis.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod forward;
mod inverse;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// Internal
use crate::geometry::LinkSpec;
use crate::joint::NUM_KIN_JOINTS;

pub use inverse::IkSolution;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sign applied to each kinematic joint when moving between the servo and
/// chain conventions.
pub const JOINT_SIGN: [f64; NUM_KIN_JOINTS] = [1.0, -1.0, -1.0];

/// Number of decimal places kept on a forward kinematics result.
pub const COORD_DECIMALS: i32 = 1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// End effector position in the arm base frame.
///
/// Units: centimeters
pub type Coordinate = Vector3<f64>;

/// Parameters of the inverse kinematics iteration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IkParams {
    /// Maximum number of iterations before the target is declared unreachable.
    pub max_iters: usize,

    /// Distance to the target below which the solution has converged.
    ///
    /// Units: centimeters
    pub tolerance_cm: f64,

    /// Damping factor of the least squares step.
    ///
    /// Units: centimeters
    pub damping: f64,

    /// Largest change of any joint during one iteration.
    ///
    /// Units: radians
    pub max_step_rad: f64,
}

/// Forward and inverse kinematics solver for one arm.
///
/// The solver holds no mutable state, it can be shared freely.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Solver {
    links: LinkSpec,
    ik: IkParams,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while solving the kinematics.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum KinematicsError {
    #[error(
        "Target {target:?} cm is unreachable (residual {residual_cm:.3} cm after \
        {iterations} iterations)"
    )]
    UnreachableTarget {
        target: [f64; 3],
        residual_cm: f64,
        iterations: usize,
    },

    #[error("The least squares step could not be computed at {angles_deg:?} deg")]
    Singular { angles_deg: [f64; NUM_KIN_JOINTS] },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for IkParams {
    fn default() -> Self {
        Self {
            max_iters: 100,
            tolerance_cm: 0.01,
            damping: 0.5,
            max_step_rad: 0.35,
        }
    }
}

impl Solver {
    pub fn new(links: LinkSpec, ik: IkParams) -> Self {
        Self { links, ik }
    }

    /// Solver for the reference arm with default iteration parameters.
    pub fn reference() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &LinkSpec {
        &self.links
    }

    pub fn ik_params(&self) -> &IkParams {
        &self.ik
    }
}

/// Convert servo convention angles into chain convention radians.
pub(crate) fn to_chain_rad(angles_deg: [f64; NUM_KIN_JOINTS]) -> Vector3<f64> {
    Vector3::new(
        (angles_deg[0] * JOINT_SIGN[0]).to_radians(),
        (angles_deg[1] * JOINT_SIGN[1]).to_radians(),
        (angles_deg[2] * JOINT_SIGN[2]).to_radians(),
    )
}

/// Convert chain convention radians into servo convention degrees.
pub(crate) fn from_chain_rad(angles_rad: &Vector3<f64>) -> [f64; NUM_KIN_JOINTS] {
    [
        angles_rad[0].to_degrees() * JOINT_SIGN[0],
        angles_rad[1].to_degrees() * JOINT_SIGN[1],
        angles_rad[2].to_degrees() * JOINT_SIGN[2],
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sign_convention() {
        let q = to_chain_rad([90.0, 60.0, 110.0]);
        assert!((q[0] - 90f64.to_radians()).abs() < 1e-12);
        assert!((q[1] + 60f64.to_radians()).abs() < 1e-12);
        assert!((q[2] + 110f64.to_radians()).abs() < 1e-12);

        let back = from_chain_rad(&q);
        for (a, b) in back.iter().zip([90.0, 60.0, 110.0].iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
