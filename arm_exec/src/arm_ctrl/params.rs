//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    geometry::LinkSpec,
    joint::{JointLimits, JointVector, NUM_JOINTS},
    kinematics::{IkParams, Solver},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The kinematic chain, base joint first.
    pub links: LinkSpec,

    // ---- CAPABILITIES ----
    /// Minimum joint angle (inclusive)
    ///
    /// Units: degrees
    pub min_pos_deg: [i32; NUM_JOINTS],

    /// Maximum joint angle (inclusive)
    ///
    /// Units: degrees
    pub max_pos_deg: [i32; NUM_JOINTS],

    /// Default SAFE pose of the arm.
    ///
    /// Units: degrees
    pub default_pos_deg: [i32; NUM_JOINTS],

    // ---- INVERSE KINEMATICS ----
    /// Maximum number of iterations of the solver.
    pub ik_max_iters: usize,

    /// Distance from the target at which the solver has converged.
    ///
    /// Units: centimeters
    pub ik_tolerance_cm: f64,

    /// Damping factor of the solver step.
    pub ik_damping: f64,

    /// Largest change of any joint in one solver iteration.
    ///
    /// Units: radians
    pub ik_max_step_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn limits(&self) -> JointLimits {
        JointLimits {
            min_pos_deg: self.min_pos_deg,
            max_pos_deg: self.max_pos_deg,
        }
    }

    pub fn default_pos(&self) -> JointVector {
        JointVector::new(self.default_pos_deg)
    }

    /// Build the kinematics solver described by these parameters.
    pub fn solver(&self) -> Solver {
        Solver::new(
            self.links,
            IkParams {
                max_iters: self.ik_max_iters,
                tolerance_cm: self.ik_tolerance_cm,
                damping: self.ik_damping,
                max_step_rad: self.ik_max_step_rad,
            },
        )
    }
}

impl Default for Params {
    /// Parameters of the reference arm.
    fn default() -> Self {
        let limits = JointLimits::default();
        let ik = IkParams::default();

        Self {
            links: LinkSpec::reference(),
            min_pos_deg: limits.min_pos_deg,
            max_pos_deg: limits.max_pos_deg,
            default_pos_deg: [90, 60, 110, 90, 90, 90],
            ik_max_iters: ik.max_iters,
            ik_tolerance_cm: ik.tolerance_cm,
            ik_damping: ik.damping,
            ik_max_step_rad: ik.max_step_rad,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_param_file_matches_reference() {
        let text = include_str!("../../../params/arm_ctrl.toml");
        let p: Params = util::params::from_str(text).unwrap();
        let d = Params::default();

        assert_eq!(p.links, d.links);
        assert_eq!(p.limits(), d.limits());
        assert_eq!(p.default_pos(), d.default_pos());
        assert_eq!(p.solver(), Solver::reference());
    }
}
