//! Arm inverse kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use nalgebra::{Matrix3, Vector3};

// Internal imports
use super::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Offsets added to joints 1 and 2 of the seed, in order, when the descent
/// from the seed itself stalls.
///
/// Units: degrees
pub const RESTART_OFFSETS_DEG: [[f64; 2]; 2] = [[20.0, 20.0], [-20.0, -20.0]];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A converged inverse kinematics solution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IkSolution {
    /// Unrounded joint angles in the servo convention.
    ///
    /// Units: degrees
    pub angles_deg: [f64; NUM_KIN_JOINTS],

    /// Number of iterations taken to converge, including those of any
    /// restarts.
    pub iterations: usize,

    /// Distance between the solution's end effector and the target.
    ///
    /// Units: centimeters
    pub residual_cm: f64,
}

/// End of one descent from a single starting point.
enum Descent {
    Converged(IkSolution),
    Stalled { residual_cm: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IkSolution {
    /// The solution rounded to whole degrees.
    pub fn rounded(&self) -> [i32; NUM_KIN_JOINTS] {
        [
            self.angles_deg[0].round() as i32,
            self.angles_deg[1].round() as i32,
            self.angles_deg[2].round() as i32,
        ]
    }
}

impl Solver {
    /// Calculate the servo angles which place the end effector at `target`.
    ///
    /// The iteration starts from `seed_deg`, usually the current angles, so
    /// that the solution closest to the current pose is found. The result is
    /// rounded to whole degrees.
    pub fn inverse(
        &self,
        target: &Coordinate,
        seed_deg: [i32; NUM_KIN_JOINTS],
    ) -> Result<[i32; NUM_KIN_JOINTS], KinematicsError> {
        let seed = [seed_deg[0] as f64, seed_deg[1] as f64, seed_deg[2] as f64];

        self.solve(target, seed).map(|s| s.rounded())
    }

    /// Solve the inverse kinematics without rounding the result.
    ///
    /// Uses damped least squares: each iteration steps the joints by
    /// `J^T (J J^T + d^2 I)^-1 e`, where `e` is the position error, with the
    /// largest joint change limited to `max_step_rad`.
    ///
    /// A descent can stall where the gradient vanishes, for instance with the
    /// arm straight and pointing directly away from the target. If the descent
    /// from the seed stalls it is restarted from the seed moved by each of
    /// [`RESTART_OFFSETS_DEG`] in turn. The seed itself is always tried first,
    /// so the branch nearest the seed is kept whenever it can be reached.
    pub fn solve(
        &self,
        target: &Coordinate,
        seed_deg: [f64; NUM_KIN_JOINTS],
    ) -> Result<IkSolution, KinematicsError> {
        let unreachable = |residual_cm: f64, iterations: usize| {
            KinematicsError::UnreachableTarget {
                target: [target[0], target[1], target[2]],
                residual_cm,
                iterations,
            }
        };

        // Nothing past the fully stretched chain can be reached, skip the
        // iteration entirely
        let excess_cm = target.norm() - self.links.max_reach_cm();
        if excess_cm > self.ik.tolerance_cm {
            debug!("IK target {:?} is {:.2} cm past full reach", target, excess_cm);
            let residual_cm = (target - self.chain_position(&to_chain_rad(seed_deg))).norm();
            return Err(unreachable(residual_cm, 0));
        }

        let restarts = RESTART_OFFSETS_DEG
            .iter()
            .map(|o| [seed_deg[0], seed_deg[1] + o[0], seed_deg[2] + o[1]]);

        let mut total_iters = 0;
        let mut best_residual_cm = std::f64::INFINITY;

        for (attempt, start_deg) in std::iter::once(seed_deg).chain(restarts).enumerate() {
            if attempt > 0 {
                debug!("IK restarting from {:?} deg", start_deg);
            }

            match self.descend(target, start_deg)? {
                Descent::Converged(mut solution) => {
                    total_iters += solution.iterations;
                    solution.iterations = total_iters;

                    debug!("IK converged: {:?}", solution);
                    return Ok(solution);
                }
                Descent::Stalled { residual_cm } => {
                    total_iters += self.ik.max_iters;
                    best_residual_cm = best_residual_cm.min(residual_cm);
                }
            }
        }

        debug!(
            "IK did not converge on {:?} within {} iterations",
            target, total_iters
        );

        Err(unreachable(best_residual_cm, total_iters))
    }

    /// Run one damped least squares descent from `start_deg`.
    fn descend(
        &self,
        target: &Coordinate,
        start_deg: [f64; NUM_KIN_JOINTS],
    ) -> Result<Descent, KinematicsError> {
        let damping_sq = self.ik.damping.powi(2);
        let mut angles_rad = to_chain_rad(start_deg);
        let mut residual_cm = std::f64::INFINITY;

        for iteration in 0..=self.ik.max_iters {
            let (pos, jac) = self.chain_position_jacobian(&angles_rad);
            let error: Vector3<f64> = target - pos;
            residual_cm = error.norm();

            trace!("IK iter {}: residual {:.5} cm", iteration, residual_cm);

            if residual_cm <= self.ik.tolerance_cm {
                return Ok(Descent::Converged(IkSolution {
                    angles_deg: from_chain_rad(&angles_rad),
                    iterations: iteration,
                    residual_cm,
                }));
            }

            if iteration == self.ik.max_iters {
                break;
            }

            let jjt = jac * jac.transpose() + Matrix3::identity() * damping_sq;
            let jjt_inv = match jjt.try_inverse() {
                Some(i) => i,
                None => {
                    return Err(KinematicsError::Singular {
                        angles_deg: from_chain_rad(&angles_rad),
                    })
                }
            };

            let mut step = jac.transpose() * jjt_inv * error;

            let largest = step.amax();
            if largest > self.ik.max_step_rad {
                step *= self.ik.max_step_rad / largest;
            }

            angles_rad += step;
        }

        Ok(Descent::Stalled { residual_cm })
    }
}
