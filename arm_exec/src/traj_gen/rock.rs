//! Wrist rock oscillation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use super::TrajError;
use crate::{
    action_seq::ActionSequence,
    joint::{JointVector, WRIST_JOINT},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a rock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RockParams {
    /// Wrist angle at the bottom of the swing.
    ///
    /// Units: degrees
    pub start_deg: i32,

    /// Wrist angle at the top of the swing, where each repeat begins.
    ///
    /// Units: degrees
    pub end_deg: i32,

    /// Number of steps in each half swing.
    pub steps: usize,

    /// Number of full swings.
    pub repeats: usize,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a rock sequence from `current`.
///
/// Each repeat starts with the wrist at `end_deg`, takes `steps` steps down
/// towards `start_deg` and `steps` steps back up, giving `1 + 2 * steps`
/// positions per repeat. The step size is truncated to whole degrees.
pub fn rock(current: &JointVector, params: &RockParams) -> Result<ActionSequence, TrajError> {
    let steps = match i32::try_from(params.steps) {
        Ok(s) if s >= 1 => s,
        _ => {
            return Err(TrajError::InvalidStepCount {
                name: "step",
                value: params.steps,
                min: 1,
                max: i32::MAX as usize,
            })
        }
    };

    // Wide enough for any pair of angles
    let end = i64::from(params.end_deg);
    let step_deg = (end - i64::from(params.start_deg)) / i64::from(steps);

    // Every wrist angle lies between the start and end angles, so fits an i32
    let wrist = |n: i32| (end - i64::from(n) * step_deg) as i32;

    let mut pos = current.0;
    let mut seq = ActionSequence::new();

    for _ in 0..params.repeats {
        pos[WRIST_JOINT] = params.end_deg;
        seq.append(JointVector::new(pos));

        for n in (1..=steps).chain((0..steps).rev()) {
            pos[WRIST_JOINT] = wrist(n);
            seq.append(JointVector::new(pos));
        }
    }

    Ok(seq)
}

/// Generate a rock starting from the last position of a sequence.
pub fn rock_from_seq(
    seq: &ActionSequence,
    params: &RockParams,
) -> Result<ActionSequence, TrajError> {
    match seq.last() {
        Some(current) => rock(current, params),
        None => Err(TrajError::InsufficientSamples {
            required: 1,
            found: 0,
        }),
    }
}
