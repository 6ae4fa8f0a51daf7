//! Trajectory generators
//!
//! Pure functions which synthesise action sequences from a starting pose.
//! None of the generators mutate their inputs, and on error no partial
//! sequence is produced.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ease;
mod rock;
mod shake;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use ease::*;
pub use rock::*;
pub use shake::*;

use crate::kinematics::KinematicsError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while generating a trajectory.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrajError {
    #[error("At least {required} positions are required, found {found}")]
    InsufficientSamples { required: usize, found: usize },

    #[error("The {name} count must be between {min} and {max}, found {value}")]
    InvalidStepCount {
        name: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),
}
