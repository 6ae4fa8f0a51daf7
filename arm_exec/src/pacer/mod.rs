//! Playback and record pacer
//!
//! The pacer owns the active action sequence and moves between three modes:
//!
//! - `Idle`: the sequence may be edited, replaced, or played.
//! - `Recording`: an external tick source calls [`Pacer::sample`] at the
//!   record interval, each sample is appended to the sequence.
//! - `Playing`: every position is dispatched to a [`CmdSink`] in order,
//!   with a pause of the play interval between steps.
//!
//! Recording and playing are mutually exclusive.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod sink;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use params::*;
pub use sink::*;
pub use state::*;

use crate::joint::JointError;
use comms_if::eqpt::servo::FrameError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Operating mode of the pacer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PacerMode {
    Idle,
    Recording,
    Playing,
}

/// Possible errors that can occur during pacer operation.
#[derive(Debug, thiserror::Error)]
pub enum PacerError {
    #[error("Cannot {action} while the pacer is {mode:?}")]
    WrongMode {
        action: &'static str,
        mode: PacerMode,
    },

    #[error("Cannot play an empty sequence")]
    EmptySequence,

    #[error("Position {index} is outside the joint limits: {source}")]
    Rejected { index: usize, source: JointError },

    #[error("Position {index} cannot be sent to the servos: {source}")]
    NotEncodable { index: usize, source: FrameError },

    #[error(
        "Dispatch of position {index} failed (last successful position: {last_ok:?}): {source}"
    )]
    Dispatch {
        index: usize,
        last_ok: Option<usize>,
        source: SinkError,
    },

    #[error("Sequence error: {0}")]
    Sequence(#[from] crate::action_seq::SeqError),
}
