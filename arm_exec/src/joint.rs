//! Joint vector definitions
//!
//! A joint vector holds the commanded angle of every actuator in the arm. Only
//! the first [`NUM_KIN_JOINTS`] joints take part in the kinematics, the
//! remaining ones (wrist rotate and the two auxiliary joints) are carried
//! through unchanged.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

// Internal
use comms_if::eqpt::servo::{ServoDems, NUM_SERVOS};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of joints (actuators) on the arm.
pub const NUM_JOINTS: usize = NUM_SERVOS;

/// Number of joints which take part in the kinematics.
pub const NUM_KIN_JOINTS: usize = 3;

/// Index of the wrist joint, used when rocking.
pub const WRIST_JOINT: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Commanded angles of every joint of the arm.
///
/// Units: degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointVector(pub [i32; NUM_JOINTS]);

/// Physical range of every joint.
///
/// Units: degrees
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Minimum angle of each joint (inclusive)
    pub min_pos_deg: [i32; NUM_JOINTS],

    /// Maximum angle of each joint (inclusive)
    pub max_pos_deg: [i32; NUM_JOINTS],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with joint vectors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JointError {
    #[error("Joint {joint} angle {value} is outside of its range [{min}, {max}]")]
    OutOfRange {
        joint: usize,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("There is no joint with index {0}")]
    InvalidJoint(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointVector {
    pub const fn new(pos_deg: [i32; NUM_JOINTS]) -> Self {
        Self(pos_deg)
    }

    /// The angles of the joints which take part in the kinematics.
    pub fn kin_joints(&self) -> [i32; NUM_KIN_JOINTS] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Return a copy of this vector with the kinematic joints replaced.
    pub fn with_kin_joints(&self, kin: [i32; NUM_KIN_JOINTS]) -> Self {
        let mut v = *self;
        v.0[..NUM_KIN_JOINTS].copy_from_slice(&kin);
        v
    }

    /// Return a copy of this vector with a single joint replaced.
    pub fn with_joint(&self, index: usize, pos_deg: i32) -> Result<Self, JointError> {
        if index >= NUM_JOINTS {
            return Err(JointError::InvalidJoint(index));
        }

        let mut v = *self;
        v.0[index] = pos_deg;
        Ok(v)
    }

    /// Check that every joint is within its physical range.
    pub fn validate(&self, limits: &JointLimits) -> Result<(), JointError> {
        for (joint, value) in self.0.iter().enumerate() {
            let (min, max) = (limits.min_pos_deg[joint], limits.max_pos_deg[joint]);

            if *value < min || *value > max {
                return Err(JointError::OutOfRange {
                    joint,
                    value: *value,
                    min,
                    max,
                });
            }
        }

        Ok(())
    }
}

impl Index<usize> for JointVector {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        &self.0[index]
    }
}

impl From<[i32; NUM_JOINTS]> for JointVector {
    fn from(pos_deg: [i32; NUM_JOINTS]) -> Self {
        Self(pos_deg)
    }
}

impl From<JointVector> for ServoDems {
    fn from(v: JointVector) -> Self {
        ServoDems::new(v.0)
    }
}

impl fmt::Display for JointVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}, {}, {}]",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl Default for JointLimits {
    /// Limits of the reference arm, the last joint (gripper) has the
    /// narrowest range.
    fn default() -> Self {
        Self {
            min_pos_deg: [0, 0, 0, 0, 0, 60],
            max_pos_deg: [180, 180, 180, 180, 180, 90],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        let limits = JointLimits::default();

        assert!(JointVector::new([90, 60, 110, 90, 90, 90]).validate(&limits).is_ok());
        assert!(JointVector::new([0, 0, 0, 0, 0, 60]).validate(&limits).is_ok());
        assert!(JointVector::new([180, 180, 180, 180, 180, 90]).validate(&limits).is_ok());

        assert_eq!(
            JointVector::new([90, 60, 110, 90, 90, 91]).validate(&limits),
            Err(JointError::OutOfRange { joint: 5, value: 91, min: 60, max: 90 })
        );
        assert_eq!(
            JointVector::new([90, -3, 110, 90, 90, 90]).validate(&limits),
            Err(JointError::OutOfRange { joint: 1, value: -3, min: 0, max: 180 })
        );
    }

    #[test]
    fn test_kin_joints() {
        let v = JointVector::new([90, 60, 110, 45, 30, 75]);
        assert_eq!(v.kin_joints(), [90, 60, 110]);

        let w = v.with_kin_joints([10, 20, 30]);
        assert_eq!(w, JointVector::new([10, 20, 30, 45, 30, 75]));

        assert_eq!(v.with_joint(3, 180).unwrap()[3], 180);
        assert_eq!(v.with_joint(6, 180), Err(JointError::InvalidJoint(6)));
    }

    #[test]
    fn test_display() {
        let v = JointVector::new([90, 60, 110, 90, 90, 90]);
        assert_eq!(format!("{}", v), "[90, 60, 110, 90, 90, 90]");
    }
}
