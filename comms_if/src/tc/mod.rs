//! # Telecommand module
//!
//! This module provides the commands which an external control surface may
//! send to the arm.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;
