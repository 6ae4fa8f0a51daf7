//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::{ArmCtrlError, ArmCtrlInitError, Params};
use crate::{
    joint::{JointLimits, JointVector},
    kinematics::{Coordinate, IkSolution, Solver},
};
use comms_if::tc::arm_ctrl::ArmCmd;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::{Safe, State},
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    solver: Solver,

    limits: JointLimits,

    pub(crate) report: StatusReport,

    pub(crate) state: ArmState,

    arch_state: Archiver,
}

/// The pose of the arm in both joint and cartesian space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmState {
    /// Joint angles.
    pub joints: JointVector,

    /// End effector position given by the joint angles, to 1 mm.
    ///
    /// Units: centimeters
    pub coord: Coordinate,
}

/// Input data to Arm Control.
#[derive(Default)]
pub struct InputData {
    /// The command to be executed, or `None` if there is no new command on
    /// this cycle.
    pub cmd: Option<ArmCmd>,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Solver iterations used by an inverse command on this cycle.
    pub ik_iterations: Option<usize>,

    /// Remaining distance to the target of an inverse command on this cycle.
    ///
    /// Units: centimeters
    pub ik_residual_cm: Option<f64>,
}

/// One row of the state archive.
#[derive(Serialize)]
struct StateRecord {
    time_s: f64,
    j0: i32,
    j1: i32,
    j2: i32,
    j3: i32,
    j4: i32,
    j5: i32,
    x_cm: f64,
    y_cm: f64,
    z_cm: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ArmState {
    fn default() -> Self {
        Self {
            joints: JointVector::default(),
            coord: Coordinate::zeros(),
        }
    }
}

impl ArmState {
    /// State of the arm at the given joint angles.
    pub fn from_joints(solver: &Solver, joints: JointVector) -> Self {
        Self {
            joints,
            coord: solver.forward(joints.kin_joints()),
        }
    }

    /// The state reached by demanding `joints`.
    pub fn set_joints(
        &self,
        solver: &Solver,
        limits: &JointLimits,
        joints: JointVector,
    ) -> Result<ArmState, ArmCtrlError> {
        joints.validate(limits)?;

        Ok(Self::from_joints(solver, joints))
    }

    /// The state reached by placing the end effector at `target`.
    ///
    /// The solver is seeded with the current angles so the arm stays on its
    /// current branch. Joints outside the kinematic chain are kept.
    pub fn move_to(
        &self,
        solver: &Solver,
        limits: &JointLimits,
        target: &Coordinate,
    ) -> Result<(ArmState, IkSolution), ArmCtrlError> {
        let k = self.joints.kin_joints();
        let solution = solver.solve(target, [k[0] as f64, k[1] as f64, k[2] as f64])?;

        let joints = self.joints.with_kin_joints(solution.rounded());
        joints.validate(limits)?;

        Ok((Self::from_joints(solver, joints), solution))
    }
}

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = ArmCtrlInitError;

    type InputData = InputData;
    type OutputData = ArmState;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: Option<&Session>,
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        let params: Params = params::load(init_data)?;

        *self = Self::with_params(params)?;

        if let Some(s) = session {
            self.arch_state = Archiver::from_path(s, "arm_ctrl/state.csv")?;
        }

        Ok(())
    }

    /// Perform cyclic processing of Arm Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new command
        if let Some(cmd) = &input_data.cmd {
            debug!("New ArmCtrl ArmCmd::{:?}", cmd);

            self.state = self.calc_next_state(cmd)?;
        }

        if let Err(e) = self.write() {
            warn!("Could not archive the ArmCtrl state: {}", e);
        }

        Ok((self.state, self.report))
    }
}

impl Archived for ArmCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        if !self.arch_state.is_initialised() {
            return Ok(());
        }

        let (j, c) = (self.state.joints, self.state.coord);
        self.arch_state.serialise(StateRecord {
            time_s: session::get_elapsed_seconds(),
            j0: j[0],
            j1: j[1],
            j2: j[2],
            j3: j[3],
            j4: j[4],
            j5: j[5],
            x_cm: c[0],
            y_cm: c[1],
            z_cm: c[2],
        })
    }
}

impl Safe for ArmCtrl {
    /// Return the arm to its default pose.
    fn make_safe(&mut self) {
        match self.calc_next_state(&ArmCmd::Reset) {
            Ok(s) => self.state = s,
            Err(e) => warn!("Cannot return the arm to its default pose: {}", e),
        }
    }
}

impl ArmCtrl {
    /// Create a new ArmCtrl from parameters, starting in the default pose.
    pub fn with_params(params: Params) -> Result<Self, ArmCtrlInitError> {
        let solver = params.solver();
        let limits = params.limits();

        let default_pos = params.default_pos();
        default_pos
            .validate(&limits)
            .map_err(ArmCtrlInitError::InvalidDefaultPose)?;

        let state = ArmState::from_joints(&solver, default_pos);
        info!("ArmCtrl starting at {} ({:.1?})", state.joints, state.coord.as_slice());

        Ok(Self {
            params,
            solver,
            limits,
            report: StatusReport::default(),
            state,
            arch_state: Archiver::default(),
        })
    }

    pub fn state(&self) -> &ArmState {
        &self.state
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    /// Based on the command calculate the next state of the arm.
    ///
    /// The current state is not modified.
    fn calc_next_state(&mut self, cmd: &ArmCmd) -> Result<ArmState, ArmCtrlError> {
        match cmd {
            ArmCmd::SetJoints { pos_deg } => {
                self.state
                    .set_joints(&self.solver, &self.limits, JointVector::new(*pos_deg))
            }
            ArmCmd::SetJoint { index, pos_deg } => {
                let joints = self.state.joints.with_joint(*index, *pos_deg)?;
                self.state.set_joints(&self.solver, &self.limits, joints)
            }
            ArmCmd::MoveTo { x_cm, y_cm, z_cm } => {
                let target = Coordinate::new(*x_cm, *y_cm, *z_cm);
                let (state, solution) = self.state.move_to(&self.solver, &self.limits, &target)?;

                self.report.ik_iterations = Some(solution.iterations);
                self.report.ik_residual_cm = Some(solution.residual_cm);

                Ok(state)
            }
            ArmCmd::Reset => {
                self.state
                    .set_joints(&self.solver, &self.limits, self.params.default_pos())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::KinematicsError;
    use crate::joint::JointError;

    fn arm() -> ArmCtrl {
        ArmCtrl::with_params(Params::default()).unwrap()
    }

    fn run(arm: &mut ArmCtrl, cmd: ArmCmd) -> Result<ArmState, ArmCtrlError> {
        arm.proc(&InputData { cmd: Some(cmd) }).map(|(s, _)| s)
    }

    #[test]
    fn test_starts_at_default_pose() {
        let arm = arm();

        assert_eq!(arm.state().joints, JointVector::new([90, 60, 110, 90, 90, 90]));
        assert_eq!(arm.state().coord, Coordinate::new(-12.6, 0.0, 12.9));
    }

    #[test]
    fn test_no_cmd_keeps_state() {
        let mut arm = arm();
        let before = *arm.state();

        let (state, report) = arm.proc(&InputData::default()).unwrap();
        assert_eq!(state, before);
        assert!(report.ik_iterations.is_none());
    }

    #[test]
    fn test_set_joints() {
        let mut arm = arm();

        let s = run(&mut arm, ArmCmd::SetJoints { pos_deg: [90, 0, 0, 45, 30, 75] }).unwrap();
        assert_eq!(s.joints, JointVector::new([90, 0, 0, 45, 30, 75]));
        assert_eq!(s.coord, arm.solver().forward([90, 0, 0]));

        let s = run(&mut arm, ArmCmd::SetJoint { index: 0, pos_deg: 0 }).unwrap();
        assert_eq!(s.joints, JointVector::new([0, 0, 0, 45, 30, 75]));
        assert_eq!(s.coord, Coordinate::new(0.0, -27.3, 1.5));
    }

    #[test]
    fn test_invalid_joints_leave_state() {
        let mut arm = arm();
        let before = *arm.state();

        match run(&mut arm, ArmCmd::SetJoints { pos_deg: [90, 60, 110, 90, 90, 30] }) {
            Err(ArmCtrlError::Joint(JointError::OutOfRange { joint: 5, .. })) => (),
            r => panic!("Expected OutOfRange, got {:?}", r),
        }
        assert!(run(&mut arm, ArmCmd::SetJoint { index: 9, pos_deg: 0 }).is_err());

        assert_eq!(*arm.state(), before);
    }

    #[test]
    fn test_move_to() {
        let mut arm = arm();

        let target = arm.state().coord + Coordinate::new(0.0, 0.0, 1.0);
        let (state, report) = arm
            .proc(&InputData {
                cmd: Some(ArmCmd::MoveTo {
                    x_cm: target[0],
                    y_cm: target[1],
                    z_cm: target[2],
                }),
            })
            .unwrap();

        assert!((state.coord - target).norm() <= 0.2);
        assert!(report.ik_iterations.is_some());
        assert!(report.ik_residual_cm.unwrap() <= 0.01);

        // Wrist and gripper are untouched
        assert_eq!(state.joints.0[3..], [90, 90, 90]);
    }

    #[test]
    fn test_unreachable_move_leaves_state() {
        let mut arm = arm();
        let before = *arm.state();

        match run(&mut arm, ArmCmd::MoveTo { x_cm: 40.0, y_cm: 0.0, z_cm: 0.0 }) {
            Err(ArmCtrlError::Kinematics(KinematicsError::UnreachableTarget { .. })) => (),
            r => panic!("Expected UnreachableTarget, got {:?}", r),
        }

        assert_eq!(*arm.state(), before);
    }

    #[test]
    fn test_reset() {
        let mut arm = arm();

        run(&mut arm, ArmCmd::SetJoints { pos_deg: [10, 20, 30, 40, 50, 60] }).unwrap();
        let s = run(&mut arm, ArmCmd::Reset).unwrap();
        assert_eq!(s.joints, arm.params.default_pos());

        run(&mut arm, ArmCmd::SetJoints { pos_deg: [10, 20, 30, 40, 50, 60] }).unwrap();
        arm.make_safe();
        assert_eq!(arm.state().joints, arm.params.default_pos());
    }

    #[test]
    fn test_invalid_default_pose() {
        let params = Params {
            default_pos_deg: [90, 60, 110, 90, 90, 0],
            ..Params::default()
        };

        assert!(matches!(
            ArmCtrl::with_params(params),
            Err(ArmCtrlInitError::InvalidDefaultPose(_))
        ));
    }
}
