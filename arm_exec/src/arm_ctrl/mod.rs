//! Arm control module
//!
//! Holds the explicit current state of the arm and converts arm commands into
//! new states. Forward commands set joint angles directly, inverse commands
//! place the end effector at a coordinate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use crate::{joint::JointError, kinematics::KinematicsError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Invalid joint demand: {0}")]
    Joint(#[from] JointError),
}

/// Possible errors that can occur while initialising ArmCtrl.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlInitError {
    #[error("Cannot load the parameters: {0}")]
    Params(#[from] util::params::LoadError),

    #[error("The default pose is invalid: {0}")]
    InvalidDefaultPose(JointError),

    #[error("Cannot create the archive: {0}")]
    Archive(#[from] util::archive::ArchiveError),
}
