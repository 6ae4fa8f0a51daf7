//! # Arm control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::eqpt::servo::NUM_SERVOS;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be completed by arm control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArmCmd {
    /// Forward control: demand all joint angles directly.
    ///
    /// The end effector coordinate is recalculated from the new joint angles.
    SetJoints {
        /// Joint angles in degrees.
        pos_deg: [i32; NUM_SERVOS],
    },

    /// Forward control of a single joint, all other joints are kept.
    SetJoint {
        /// Index of the joint, 0 to 5.
        index: usize,

        /// Joint angle in degrees.
        pos_deg: i32,
    },

    /// Inverse control: the user defines the location of the end effector
    /// and the first three joint angles are calculated to achieve it.
    ///
    /// Joints 3 to 5 keep their current angles.
    MoveTo {
        /// Units: centimeters
        x_cm: f64,
        /// Units: centimeters
        y_cm: f64,
        /// Units: centimeters
        z_cm: f64,
    },

    /// Return all joints to the default pose.
    Reset,
}
