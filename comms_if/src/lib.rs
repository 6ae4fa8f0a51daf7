//! # Communications interface crate.
//!
//! Provides the interfaces shared between the arm software and its external
//! collaborators (control surfaces and the servo transport).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommands accepted by the arm control modules
pub mod tc;

/// Command and response definitions for equipment (like the servo bank)
pub mod eqpt;
