//! # Arm Executable
//!
//! Offline tooling for the robotic arm:
//! - Build action sequences (concatenate, shorten, ease-in-out, shake, rock)
//! - Query the kinematics (forward and inverse)
//! - Play a sequence into a servo bank

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{info, warn};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use structopt::StructOpt;

// Internal
use arm_lib::{
    action_seq::ActionSequence,
    arm_ctrl::{self, ArmCtrl, InputData},
    pacer::{self, FrameSink, Pacer},
    traj_gen::{self, RockParams, ShakeParams},
};
use comms_if::tc::arm_ctrl::ArmCmd;
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const ARM_CTRL_PARAMS: &str = "arm_ctrl.toml";

const PACER_PARAMS: &str = "pacer.toml";

// ------------------------------------------------------------------------------------------------
// COMMAND LINE
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "Robotic arm sequence and kinematics tools")]
struct Opt {
    /// Log debug messages
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Concatenate sequence files in order.
    #[structopt(name = "concat")]
    Concat {
        /// Output sequence file.
        #[structopt(short, long, default_value = "concat.txt")]
        output: PathBuf,

        /// Sequence files to concatenate.
        #[structopt(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Keep only every n-th position of a sequence, saved as `<stem>_step<n>.txt`.
    #[structopt(name = "shorten")]
    Shorten {
        input: PathBuf,

        /// Keep one position every `stride` positions.
        stride: usize,
    },

    /// Ease-in-out between the first and last positions of a sequence, saved as
    /// `<stem>_easeinout<n>.txt`.
    #[structopt(name = "interp")]
    Interp {
        input: PathBuf,

        /// Total number of positions, including the first and last.
        steps: usize,
    },

    /// Shake around the last position of a sequence.
    #[structopt(name = "shake")]
    Shake {
        input: PathBuf,

        /// Output sequence file, defaults to `<stem>_execute.txt`.
        #[structopt(short, long)]
        output: Option<PathBuf>,

        /// Shake radius in centimeters.
        #[structopt(long, default_value = "2.5")]
        radius: f64,

        /// Go counter-clockwise.
        #[structopt(long)]
        ccw: bool,

        /// Number of positions spent at each corner, higher is slower.
        #[structopt(long, default_value = "1")]
        hold: usize,

        /// Number of full circles.
        #[structopt(long, default_value = "5")]
        repeats: usize,
    },

    /// Rock the wrist starting from the last position of a sequence, saved as
    /// `<stem>_execute.txt`.
    #[structopt(name = "rock")]
    Rock {
        input: PathBuf,

        /// Lowest wrist angle in degrees.
        #[structopt(long, default_value = "145")]
        start: i32,

        /// Highest wrist angle in degrees.
        #[structopt(long, default_value = "180")]
        end: i32,

        /// Steps between the lowest and highest angle, higher is slower.
        #[structopt(long, default_value = "1")]
        steps: usize,

        /// Number of swings.
        #[structopt(long, default_value = "5")]
        repeats: usize,
    },

    /// Print the end effector coordinate of the first three joint angles.
    #[structopt(name = "fk")]
    Fk { j0: i32, j1: i32, j2: i32 },

    /// Print the joint angles which place the end effector at a coordinate.
    #[structopt(
        name = "ik",
        setting = structopt::clap::AppSettings::AllowNegativeNumbers
    )]
    Ik {
        x_cm: f64,
        y_cm: f64,
        z_cm: f64,

        /// Starting joint angles used to pick the solution, defaults to the
        /// default pose.
        #[structopt(long, number_of_values = 3)]
        seed: Option<Vec<i32>>,
    },

    /// Play a sequence into the servo bank.
    #[structopt(name = "play")]
    Play {
        input: PathBuf,

        /// Device or file the servo frames are written to, stdout if not given.
        #[structopt(short, long)]
        device: Option<PathBuf>,
    },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = if opt.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Arm Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    match opt.cmd {
        Cmd::Concat { output, inputs } => {
            let seqs = inputs
                .iter()
                .map(|p| load_seq(p))
                .collect::<Result<Vec<_>>>()?;

            save_seq(&ActionSequence::concat(&seqs), &output)
        }
        Cmd::Shorten { input, stride } => {
            let short = load_seq(&input)?.downsample(stride)?;

            save_seq(&short, &derived_path(&input, &format!("_step{}", stride)))
        }
        Cmd::Interp { input, steps } => {
            let interp = traj_gen::ease_in_out_seq(&load_seq(&input)?, steps)
                .wrap_err("Failed to interpolate")?;

            save_seq(&interp, &derived_path(&input, &format!("_easeinout{}", steps)))
        }
        Cmd::Shake {
            input,
            output,
            radius,
            ccw,
            hold,
            repeats,
        } => {
            let arm = init_arm_ctrl(&session)?;
            let params = ShakeParams {
                radius_cm: radius,
                clockwise: !ccw,
                hold,
                repeats,
            };

            let shake = traj_gen::shake_from_seq(arm.solver(), &load_seq(&input)?, &params)
                .wrap_err("Failed to generate the shake")?;

            let output = output.unwrap_or_else(|| derived_path(&input, "_execute"));
            save_seq(&shake, &output)
        }
        Cmd::Rock {
            input,
            start,
            end,
            steps,
            repeats,
        } => {
            let params = RockParams {
                start_deg: start,
                end_deg: end,
                steps,
                repeats,
            };

            let rock = traj_gen::rock_from_seq(&load_seq(&input)?, &params)
                .wrap_err("Failed to generate the rock")?;

            save_seq(&rock, &derived_path(&input, "_execute"))
        }
        Cmd::Fk { j0, j1, j2 } => {
            let mut arm = init_arm_ctrl(&session)?;

            let mut pos_deg = arm.state().joints.0;
            pos_deg[..3].copy_from_slice(&[j0, j1, j2]);

            let (state, _) = arm.proc(&InputData {
                cmd: Some(ArmCmd::SetJoints { pos_deg }),
            })?;

            println!("{:.1} {:.1} {:.1}", state.coord[0], state.coord[1], state.coord[2]);
            Ok(())
        }
        Cmd::Ik {
            x_cm,
            y_cm,
            z_cm,
            seed,
        } => {
            let mut arm = init_arm_ctrl(&session)?;

            if let Some(seed) = seed {
                if seed.len() != 3 {
                    return Err(eyre!("Expected 3 seed angles, found {}", seed.len()));
                }

                let mut pos_deg = arm.state().joints.0;
                pos_deg[..3].copy_from_slice(&seed);
                arm.proc(&InputData {
                    cmd: Some(ArmCmd::SetJoints { pos_deg }),
                })
                .wrap_err("Invalid seed angles")?;
            }

            let (state, report) = arm.proc(&InputData {
                cmd: Some(ArmCmd::MoveTo { x_cm, y_cm, z_cm }),
            })?;

            info!("Solved in {:?} iterations", report.ik_iterations);
            println!("{}", state.joints);
            Ok(())
        }
        Cmd::Play { input, device } => play(&session, &input, device),
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn init_arm_ctrl(session: &Session) -> Result<ArmCtrl> {
    let mut arm = ArmCtrl::default();
    arm.init(ARM_CTRL_PARAMS, Some(session))
        .wrap_err("Failed to initialise ArmCtrl")?;

    Ok(arm)
}

fn play(session: &Session, input: &Path, device: Option<PathBuf>) -> Result<()> {
    let arm_params: arm_ctrl::Params =
        util::params::load(ARM_CTRL_PARAMS).wrap_err("Failed to load ArmCtrl parameters")?;
    let pacer_params: pacer::Params =
        util::params::load(PACER_PARAMS).wrap_err("Failed to load pacer parameters")?;

    let settle = pacer_params.settle_interval();

    let mut pacer = Pacer::new(pacer_params, arm_params.limits(), arm_params.default_pos());
    pacer.set_archiver(
        Archiver::from_path(session, "pacer/playback.csv")
            .wrap_err("Failed to create the playback archive")?,
    );
    pacer.load_sequence(load_seq(input)?)?;

    // Cancel the playback between steps on Ctrl-C
    let cancel = Arc::new(AtomicBool::new(false));
    let c = cancel.clone();
    ctrlc::set_handler(move || {
        c.store(true, Ordering::SeqCst);
    })
    .wrap_err("Failed to set the interrupt handler")?;

    let writer: Box<dyn Write> = match device {
        Some(path) => Box::new(
            pacer::open_device(&path).wrap_err_with(|| format!("Failed to open {:?}", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut sink = FrameSink::new(writer, settle);

    let report = pacer.play(&mut sink, &cancel)?;

    if report.cancelled {
        warn!(
            "Playback interrupted after {} positions, arm left at {}",
            report.num_dispatched, report.final_pos
        );
    } else {
        info!(
            "Played {} positions, arm left at {}",
            report.num_dispatched, report.final_pos
        );
    }

    Ok(())
}

fn load_seq(path: &Path) -> Result<ActionSequence> {
    ActionSequence::load(path).wrap_err_with(|| format!("Failed to load {:?}", path))
}

fn save_seq(seq: &ActionSequence, path: &Path) -> Result<()> {
    seq.save(path)
        .wrap_err_with(|| format!("Failed to save {:?}", path))?;

    info!("Saved {} positions to {:?}", seq.len(), path);

    Ok(())
}

/// Path next to `input` with `suffix` added to its stem.
fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    input.with_file_name(format!("{}{}.txt", stem, suffix))
}
