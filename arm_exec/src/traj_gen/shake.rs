//! Circular shake synthesis
//!
//! The end effector is moved around four corners offset from its current
//! position in the horizontal plane. Each corner is solved with inverse
//! kinematics, seeded from the previous corner so that consecutive corners
//! stay on the same solution branch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::TrajError;
use crate::{
    action_seq::ActionSequence,
    joint::JointVector,
    kinematics::{Coordinate, Solver},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of corners in one shake cycle.
pub const NUM_SHAKE_CORNERS: usize = 4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a shake.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShakeParams {
    /// Distance of each corner from the starting position.
    ///
    /// Units: centimeters
    pub radius_cm: f64,

    /// Visit the corners clockwise (viewed from above) if true.
    pub clockwise: bool,

    /// Number of times each corner position is repeated.
    pub hold: usize,

    /// Number of full cycles.
    pub repeats: usize,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Corner coordinates of one cycle around `centre`, in visiting order.
pub fn shake_corners(
    centre: &Coordinate,
    radius_cm: f64,
    clockwise: bool,
) -> [Coordinate; NUM_SHAKE_CORNERS] {
    let dx = Vector3::new(radius_cm, 0.0, 0.0);
    let dy = Vector3::new(0.0, radius_cm, 0.0);

    if clockwise {
        [centre - dx, centre + dy, centre + dx, centre - dy]
    }
    else {
        [centre + dx, centre + dy, centre - dx, centre - dy]
    }
}

/// Generate a shake sequence starting from `current`.
///
/// The output holds `4 * hold * repeats` positions. Joints outside the
/// kinematic chain are copied from `current` into every position.
pub fn shake(
    solver: &Solver,
    current: &JointVector,
    params: &ShakeParams,
) -> Result<ActionSequence, TrajError> {
    if params.hold < 1 {
        return Err(TrajError::InvalidStepCount {
            name: "hold",
            value: params.hold,
            min: 1,
            max: usize::MAX,
        });
    }

    let centre = solver.forward(current.kin_joints());
    let corners = shake_corners(&centre, params.radius_cm, params.clockwise);

    debug!(
        "Shaking {:.1} cm about ({:.1}, {:.1}, {:.1})",
        params.radius_cm, centre[0], centre[1], centre[2]
    );

    // Solve every corner up front, the cycle is identical on each repeat
    let k = current.kin_joints();
    let mut seed = [k[0] as f64, k[1] as f64, k[2] as f64];
    let mut cycle = Vec::with_capacity(NUM_SHAKE_CORNERS);

    for corner in corners.iter() {
        let solution = solver.solve(corner, seed)?;
        seed = solution.angles_deg;
        cycle.push(current.with_kin_joints(solution.rounded()));
    }

    let mut seq = ActionSequence::new();
    for _ in 0..params.repeats {
        for pos in cycle.iter() {
            for _ in 0..params.hold {
                seq.append(*pos);
            }
        }
    }

    Ok(seq)
}

/// Generate a shake starting from the last position of a sequence.
pub fn shake_from_seq(
    solver: &Solver,
    seq: &ActionSequence,
    params: &ShakeParams,
) -> Result<ActionSequence, TrajError> {
    match seq.last() {
        Some(current) => shake(solver, current, params),
        None => Err(TrajError::InsufficientSamples {
            required: 1,
            found: 0,
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::KinematicsError;

    const START: JointVector = JointVector::new([90, 60, 110, 45, 30, 75]);

    fn params(radius_cm: f64, clockwise: bool, hold: usize, repeats: usize) -> ShakeParams {
        ShakeParams {
            radius_cm,
            clockwise,
            hold,
            repeats,
        }
    }

    #[test]
    fn test_shake_single_cycle() {
        let solver = Solver::reference();
        let seq = shake(&solver, &START, &params(2.5, true, 1, 1)).unwrap();

        assert_eq!(seq.len(), 4);
        for pos in seq.iter() {
            assert_eq!(pos.0[3..], START.0[3..]);
        }

        // Every corner is within rounding distance of its target
        let centre = solver.forward(START.kin_joints());
        let corners = shake_corners(&centre, 2.5, true);
        for (pos, corner) in seq.iter().zip(corners.iter()) {
            assert!((solver.forward(pos.kin_joints()) - corner).norm() < 0.5);
        }

        // The first clockwise corner is towards -x, which from the default
        // pose means reaching further out with the shoulder
        assert_eq!(seq.get(0).unwrap().kin_joints(), [90, 75, 98]);
    }

    #[test]
    fn test_shake_direction() {
        let solver = Solver::reference();
        let cw = shake(&solver, &START, &params(2.5, true, 1, 1)).unwrap();
        let ccw = shake(&solver, &START, &params(2.5, false, 1, 1)).unwrap();

        // Both directions visit the same corners, with -x and +x swapped
        assert_eq!(cw.get(0), ccw.get(2));
        assert_eq!(cw.get(2), ccw.get(0));
        assert_eq!(cw.get(1), ccw.get(1));
        assert_eq!(cw.get(3), ccw.get(3));
    }

    #[test]
    fn test_shake_hold_and_repeat() {
        let solver = Solver::reference();
        let seq = shake(&solver, &START, &params(2.5, true, 3, 2)).unwrap();

        assert_eq!(seq.len(), 4 * 3 * 2);

        // Each corner is held for three positions, then the cycle repeats
        let s = seq.as_slice();
        for corner in 0..4 {
            let base = corner * 3;
            assert_eq!(s[base], s[base + 1]);
            assert_eq!(s[base], s[base + 2]);
            assert_eq!(s[base], s[base + 12]);
        }
        assert_ne!(s[0], s[3]);

        assert!(shake(&solver, &START, &params(2.5, true, 1, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_shake_errors() {
        let solver = Solver::reference();

        assert_eq!(
            shake(&solver, &START, &params(2.5, true, 0, 1)),
            Err(TrajError::InvalidStepCount {
                name: "hold",
                value: 0,
                min: 1,
                max: usize::MAX
            })
        );

        // A radius larger than the reach cannot be solved
        match shake(&solver, &START, &params(50.0, true, 1, 1)) {
            Err(TrajError::Kinematics(KinematicsError::UnreachableTarget { .. })) => (),
            r => panic!("Expected UnreachableTarget, got {:?}", r),
        }

        assert_eq!(
            shake_from_seq(&solver, &ActionSequence::new(), &params(2.5, true, 1, 1)),
            Err(TrajError::InsufficientSamples { required: 1, found: 0 })
        );
    }
}
