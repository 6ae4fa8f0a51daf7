//! # Arm library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the arm executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Joint vectors - the commanded angle of every actuator on the arm
pub mod joint;

/// Arm geometry - the kinematic chain of links and joint axes
pub mod geometry;

/// Kinematics - conversion between joint angles and end effector coordinates
pub mod kinematics;

/// Trajectory generators - ease-in-out, shake and rock sequences
pub mod traj_gen;

/// Action sequences - ordered joint vectors and their text form
pub mod action_seq;

/// Pacer - timed recording and playback of action sequences
pub mod pacer;

/// Arm control module - converts arm commands into joint demands
pub mod arm_ctrl;
