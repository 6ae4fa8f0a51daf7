//! Ease-in-out interpolation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use util::maths::{lin_map, linspace};

use super::TrajError;
use crate::{
    action_seq::ActionSequence,
    joint::{JointVector, NUM_JOINTS},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Smallest number of positions an interpolation can produce.
pub const MIN_INTERP_STEPS: usize = 2;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Raised cosine weight at `t` in `[0, 1]`.
///
/// The weight is 0 at `t = 0`, 1 at `t = 1`, and has zero slope at both ends.
pub fn ease_weight(t: f64) -> f64 {
    0.5 * (1.0 - (PI * t).cos())
}

/// Interpolate between two joint vectors with an ease-in-out profile.
///
/// Produces `num_steps` vectors, the first equal to `start` and the last
/// equal to `end`. Every joint moves monotonically between its two values.
pub fn ease_in_out(
    start: &JointVector,
    end: &JointVector,
    num_steps: usize,
) -> Result<ActionSequence, TrajError> {
    if num_steps < MIN_INTERP_STEPS {
        return Err(TrajError::InsufficientSamples {
            required: MIN_INTERP_STEPS,
            found: num_steps,
        });
    }

    Ok(linspace(0.0, 1.0, num_steps)
        .into_iter()
        .map(|t| {
            let w = ease_weight(t);
            let mut pos_deg = [0i32; NUM_JOINTS];

            for (i, p) in pos_deg.iter_mut().enumerate() {
                let (a, b) = (start[i] as f64, end[i] as f64);
                *p = lin_map((0.0, 1.0), (a, b), w).round() as i32;
            }

            JointVector::new(pos_deg)
        })
        .collect())
}

/// Interpolate between the first and last positions of a sequence.
pub fn ease_in_out_seq(
    seq: &ActionSequence,
    num_steps: usize,
) -> Result<ActionSequence, TrajError> {
    match (seq.first(), seq.last()) {
        (Some(start), Some(end)) if seq.len() >= MIN_INTERP_STEPS => {
            ease_in_out(start, end, num_steps)
        }
        _ => Err(TrajError::InsufficientSamples {
            required: MIN_INTERP_STEPS,
            found: seq.len(),
        }),
    }
}
