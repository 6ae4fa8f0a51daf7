//! Implementations for the Pacer state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use super::{CmdSink, PacerError, PacerMode, Params};
use crate::{
    action_seq::ActionSequence,
    joint::{JointLimits, JointVector},
};
use comms_if::eqpt::servo::ServoDems;
use util::{
    archive::{ArchiveError, Archiver},
    module::Safe,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Playback and record pacer state
pub struct Pacer {
    params: Params,

    limits: JointLimits,

    mode: PacerMode,

    /// The active sequence, owned exclusively by the pacer.
    seq: ActionSequence,

    /// The last joint vector known to have been sent or sampled.
    current: JointVector,

    /// Raised by the tick source to end a recording.
    stop_flag: Arc<AtomicBool>,

    arch_playback: Option<Archiver>,
}

/// Summary of a finished playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Number of positions dispatched.
    pub num_dispatched: usize,

    /// True if the playback was cancelled before reaching the end of the
    /// sequence.
    pub cancelled: bool,

    /// The final dispatched position.
    pub final_pos: JointVector,
}

/// One row of the playback archive.
#[derive(Serialize)]
struct PlaybackRecord {
    time_s: f64,
    index: usize,
    j0: i32,
    j1: i32,
    j2: i32,
    j3: i32,
    j4: i32,
    j5: i32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pacer {
    /// Create a new idle pacer with an empty sequence.
    pub fn new(params: Params, limits: JointLimits, current: JointVector) -> Self {
        Self {
            params,
            limits,
            mode: PacerMode::Idle,
            seq: ActionSequence::new(),
            current,
            stop_flag: Arc::new(AtomicBool::new(false)),
            arch_playback: None,
        }
    }

    /// Archive every dispatched step with the given archiver.
    ///
    /// Has no effect if playback archiving is disabled in the parameters.
    pub fn set_archiver(&mut self, archiver: Archiver) {
        if self.params.archive_playback {
            self.arch_playback = Some(archiver);
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn mode(&self) -> PacerMode {
        self.mode
    }

    /// The last position sampled or dispatched.
    pub fn current(&self) -> JointVector {
        self.current
    }

    /// Update the current position, for instance after a manual move.
    pub fn set_current(&mut self, pos: JointVector) {
        self.current = pos;
    }

    pub fn sequence(&self) -> &ActionSequence {
        &self.seq
    }

    // ---- RECORDING ----

    /// Handle to the flag which ends a recording at the next sample.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Begin recording. Samples are appended to the existing sequence.
    pub fn start_record(&mut self) -> Result<(), PacerError> {
        self.require_idle("start recording")?;

        self.stop_flag.store(false, Ordering::SeqCst);
        self.mode = PacerMode::Recording;

        info!("Recording started, {} positions already held", self.seq.len());

        Ok(())
    }

    /// Record one sample, called by the tick source once per record interval.
    ///
    /// Returns `Ok(true)` if the sample was recorded and the tick source
    /// should schedule another one, or `Ok(false)` if the stop flag was
    /// raised, in which case the recording is ended and nothing is recorded.
    ///
    /// A sample which could not be played back is rejected and not recorded,
    /// the recording carries on.
    pub fn sample(&mut self, pos: JointVector) -> Result<bool, PacerError> {
        if self.mode != PacerMode::Recording {
            return Err(PacerError::WrongMode {
                action: "sample",
                mode: self.mode,
            });
        }

        if self.stop_flag.load(Ordering::SeqCst) {
            self.finish_record();
            return Ok(false);
        }

        let index = self.seq.len();
        if let Err(e) = self.check_position(index, &pos) {
            warn!("Sample {} rejected: {}", index, e);
            return Err(e);
        }

        trace!("Sample {}: {}", index, pos);

        self.seq.append(pos);
        self.current = pos;

        Ok(true)
    }

    /// End the recording immediately.
    pub fn stop_record(&mut self) -> Result<(), PacerError> {
        if self.mode != PacerMode::Recording {
            return Err(PacerError::WrongMode {
                action: "stop recording",
                mode: self.mode,
            });
        }

        self.finish_record();

        Ok(())
    }

    /// Run a recording with a blocking tick source, sampling `source` every
    /// record interval until the stop flag is raised.
    ///
    /// Rejected samples are skipped. Returns the number of samples recorded.
    pub fn record<F>(&mut self, mut source: F) -> Result<usize, PacerError>
    where
        F: FnMut() -> JointVector,
    {
        self.start_record()?;

        let interval = self.params.record_interval();
        let start_len = self.seq.len();

        loop {
            match self.sample(source()) {
                Ok(true) => (),
                Ok(false) => break,
                Err(PacerError::Rejected { .. }) | Err(PacerError::NotEncodable { .. }) => (),
                Err(e) => return Err(e),
            }

            thread::sleep(interval);
        }

        Ok(self.seq.len() - start_len)
    }

    // ---- EDITING ----

    /// Replace the active sequence.
    pub fn load_sequence(&mut self, seq: ActionSequence) -> Result<(), PacerError> {
        self.require_idle("load a sequence")?;

        info!("Loaded sequence of {} positions", seq.len());
        self.seq = seq;

        Ok(())
    }

    /// Replace the active sequence with one parsed from text.
    ///
    /// If the text is malformed the active sequence is kept.
    pub fn load_sequence_text(&mut self, text: &str) -> Result<(), PacerError> {
        self.require_idle("load a sequence")?;

        self.seq.replace_from_text(text)?;
        info!("Loaded sequence of {} positions", self.seq.len());

        Ok(())
    }

    /// Take the active sequence, leaving an empty one in its place.
    pub fn take_sequence(&mut self) -> Result<ActionSequence, PacerError> {
        self.require_idle("take the sequence")?;

        Ok(std::mem::take(&mut self.seq))
    }

    /// Remove the last position from the active sequence.
    pub fn drop_last(&mut self) -> Result<Option<JointVector>, PacerError> {
        self.require_idle("edit the sequence")?;

        Ok(self.seq.drop_last())
    }

    /// Remove every position from the active sequence.
    pub fn clear(&mut self) -> Result<(), PacerError> {
        self.require_idle("edit the sequence")?;

        self.seq.clear();

        Ok(())
    }

    // ---- PLAYBACK ----

    /// Play the active sequence into `sink`, sleeping for the play interval
    /// between steps.
    pub fn play<S>(&mut self, sink: &mut S, cancel: &AtomicBool) -> Result<PlaybackReport, PacerError>
    where
        S: CmdSink + ?Sized,
    {
        self.play_with(sink, cancel, thread::sleep)
    }

    /// Play the active sequence into `sink`, calling `suspend` with the play
    /// interval between steps.
    ///
    /// `cancel` is checked before every step. On cancellation the last
    /// dispatched position becomes the current position and the pacer
    /// returns to idle.
    ///
    /// Every position is checked against the joint limits and the frame
    /// encoding before anything is dispatched. A dispatch failure ends the
    /// playback immediately.
    pub fn play_with<S, F>(
        &mut self,
        sink: &mut S,
        cancel: &AtomicBool,
        mut suspend: F,
    ) -> Result<PlaybackReport, PacerError>
    where
        S: CmdSink + ?Sized,
        F: FnMut(Duration),
    {
        self.require_idle("play")?;

        if self.seq.is_empty() {
            return Err(PacerError::EmptySequence);
        }

        self.check_sequence()?;

        let num_steps = self.seq.len();
        let interval = self.params.play_interval();
        let start = Instant::now();
        let mut last_ok: Option<usize> = None;
        let mut cancelled = false;

        info!("Playing {} positions", num_steps);
        self.mode = PacerMode::Playing;

        for index in 0..num_steps {
            if cancel.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }

            let pos = self.seq.as_slice()[index];

            if let Err(e) = sink.dispatch(&pos) {
                warn!("Playback halted at position {}: {}", index, e);
                self.mode = PacerMode::Idle;
                return Err(PacerError::Dispatch {
                    index,
                    last_ok,
                    source: e,
                });
            }

            debug!("Step {}/{}: {}", index + 1, num_steps, pos);

            self.current = pos;
            last_ok = Some(index);

            if let Err(e) = self.archive_step(start.elapsed(), index, &pos) {
                warn!("Could not archive playback step {}: {}", index, e);
            }

            if index + 1 < num_steps {
                suspend(interval);
            }
        }

        self.mode = PacerMode::Idle;

        let num_dispatched = last_ok.map_or(0, |i| i + 1);
        if cancelled {
            info!("Playback cancelled after {} positions", num_dispatched);
        }
        else {
            info!("Playback complete");
        }

        Ok(PlaybackReport {
            num_dispatched,
            cancelled,
            final_pos: self.current,
        })
    }

    fn require_idle(&self, action: &'static str) -> Result<(), PacerError> {
        match self.mode {
            PacerMode::Idle => Ok(()),
            mode => Err(PacerError::WrongMode { action, mode }),
        }
    }

    fn finish_record(&mut self) {
        self.mode = PacerMode::Idle;
        self.stop_flag.store(false, Ordering::SeqCst);

        info!("Recording stopped, sequence holds {} positions", self.seq.len());
    }

    /// Check every position against the limits and the frame encoding.
    fn check_sequence(&self) -> Result<(), PacerError> {
        for (index, pos) in self.seq.iter().enumerate() {
            self.check_position(index, pos)?;
        }

        Ok(())
    }

    fn check_position(&self, index: usize, pos: &JointVector) -> Result<(), PacerError> {
        pos.validate(&self.limits)
            .map_err(|source| PacerError::Rejected { index, source })?;

        ServoDems::from(*pos)
            .validate()
            .map_err(|source| PacerError::NotEncodable { index, source })
    }

    fn archive_step(
        &mut self,
        elapsed: Duration,
        index: usize,
        pos: &JointVector,
    ) -> Result<(), ArchiveError> {
        match self.arch_playback {
            Some(ref mut a) => a.serialise(PlaybackRecord {
                time_s: elapsed.as_secs_f64(),
                index,
                j0: pos[0],
                j1: pos[1],
                j2: pos[2],
                j3: pos[3],
                j4: pos[4],
                j5: pos[5],
            }),
            None => Ok(()),
        }
    }
}

impl Safe for Pacer {
    /// End any recording in progress, keeping what was recorded so far.
    fn make_safe(&mut self) {
        if self.mode == PacerMode::Recording {
            self.finish_record();
        }
        self.mode = PacerMode::Idle;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pacer::SinkError;

    /// Sink which keeps everything dispatched, optionally failing on one
    /// dispatch.
    #[derive(Default)]
    struct MockSink {
        sent: Vec<JointVector>,
        fail_at: Option<usize>,
        cancel_after: Option<(usize, Arc<AtomicBool>)>,
    }

    impl CmdSink for MockSink {
        fn dispatch(&mut self, pos: &JointVector) -> Result<(), SinkError> {
            if self.fail_at == Some(self.sent.len()) {
                return Err(SinkError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "link lost",
                )));
            }

            self.sent.push(*pos);

            if let Some((n, ref flag)) = self.cancel_after {
                if self.sent.len() == n {
                    flag.store(true, Ordering::SeqCst);
                }
            }

            Ok(())
        }
    }

    const HOME: JointVector = JointVector::new([90, 60, 110, 90, 90, 90]);

    fn pacer() -> Pacer {
        Pacer::new(Params::default(), JointLimits::default(), HOME)
    }

    fn ramp(len: usize) -> ActionSequence {
        (0..len as i32)
            .map(|i| JointVector::new([i, 60, 110, 90, 90, 90]))
            .collect()
    }

    #[test]
    fn test_play_to_end() {
        let mut p = pacer();
        p.load_sequence(ramp(5)).unwrap();

        let mut sink = MockSink::default();
        let mut pauses = Vec::new();
        let cancel = AtomicBool::new(false);

        let report = p
            .play_with(&mut sink, &cancel, |d| pauses.push(d))
            .unwrap();

        assert_eq!(sink.sent.as_slice(), ramp(5).as_slice());
        assert_eq!(report.num_dispatched, 5);
        assert!(!report.cancelled);
        assert_eq!(report.final_pos, *ramp(5).last().unwrap());
        assert_eq!(p.current(), report.final_pos);
        assert_eq!(p.mode(), PacerMode::Idle);

        // Pauses only between steps
        assert_eq!(pauses, vec![Duration::from_millis(100); 4]);
    }

    #[test]
    fn test_play_cancelled() {
        let mut p = pacer();
        p.load_sequence(ramp(10)).unwrap();

        let cancel = Arc::new(AtomicBool::new(false));
        let mut sink = MockSink {
            cancel_after: Some((3, cancel.clone())),
            ..Default::default()
        };

        let report = p.play_with(&mut sink, &cancel, |_| ()).unwrap();

        assert!(report.cancelled);
        assert_eq!(report.num_dispatched, 3);
        assert_eq!(sink.sent.len(), 3);
        assert_eq!(p.current(), *ramp(10).get(2).unwrap());
        assert_eq!(p.mode(), PacerMode::Idle);

        // Cancelled before the first step
        let mut sink = MockSink::default();
        let report = p.play_with(&mut sink, &cancel, |_| ()).unwrap();
        assert_eq!(report.num_dispatched, 0);
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn test_play_dispatch_failure() {
        let mut p = pacer();
        p.load_sequence(ramp(6)).unwrap();

        let mut sink = MockSink {
            fail_at: Some(4),
            ..Default::default()
        };

        match p.play_with(&mut sink, &AtomicBool::new(false), |_| ()) {
            Err(PacerError::Dispatch { index, last_ok, .. }) => {
                assert_eq!(index, 4);
                assert_eq!(last_ok, Some(3));
            }
            r => panic!("Expected Dispatch, got {:?}", r),
        }

        assert_eq!(p.mode(), PacerMode::Idle);
        assert_eq!(p.current(), *ramp(6).get(3).unwrap());

        // Failing on the very first step reports nothing dispatched
        let mut sink = MockSink {
            fail_at: Some(0),
            ..Default::default()
        };
        match p.play_with(&mut sink, &AtomicBool::new(false), |_| ()) {
            Err(PacerError::Dispatch { last_ok: None, .. }) => (),
            r => panic!("Expected Dispatch, got {:?}", r),
        }
    }

    #[test]
    fn test_play_rejects_before_dispatch() {
        let mut p = pacer();
        let mut seq = ramp(3);
        seq.append(JointVector::new([90, 60, 110, 90, 90, 120]));
        p.load_sequence(seq).unwrap();

        let mut sink = MockSink::default();
        match p.play_with(&mut sink, &AtomicBool::new(false), |_| ()) {
            Err(PacerError::Rejected { index: 3, .. }) => (),
            r => panic!("Expected Rejected, got {:?}", r),
        }
        assert!(sink.sent.is_empty());
        assert_eq!(p.current(), HOME);

        // Limits wider than the frame encoding still cannot be sent
        let limits = JointLimits {
            min_pos_deg: [-10; 6],
            max_pos_deg: [1000; 6],
        };
        let mut p = Pacer::new(Params::default(), limits, HOME);
        p.load_sequence(vec![JointVector::new([-5, 60, 110, 90, 90, 90])].into())
            .unwrap();
        match p.play_with(&mut sink, &AtomicBool::new(false), |_| ()) {
            Err(PacerError::NotEncodable { index: 0, .. }) => (),
            r => panic!("Expected NotEncodable, got {:?}", r),
        }

        match pacer().play_with(&mut sink, &AtomicBool::new(false), |_| ()) {
            Err(PacerError::EmptySequence) => (),
            r => panic!("Expected EmptySequence, got {:?}", r),
        }
    }

    #[test]
    fn test_record() {
        let mut p = pacer();
        let stop = p.stop_handle();

        assert!(p.sample(HOME).is_err());

        p.start_record().unwrap();
        assert_eq!(p.mode(), PacerMode::Recording);

        for pos in ramp(4).iter() {
            assert!(p.sample(*pos).unwrap());
        }

        // Playing and editing are refused while recording
        assert!(matches!(
            p.play_with(&mut MockSink::default(), &AtomicBool::new(false), |_| ()),
            Err(PacerError::WrongMode { mode: PacerMode::Recording, .. })
        ));
        assert!(p.clear().is_err());

        stop.store(true, Ordering::SeqCst);
        assert!(!p.sample(HOME).unwrap());
        assert_eq!(p.mode(), PacerMode::Idle);
        assert_eq!(p.sequence(), &ramp(4));
        assert_eq!(p.current(), *ramp(4).last().unwrap());

        // A second recording continues the same sequence
        p.start_record().unwrap();
        p.sample(HOME).unwrap();
        p.stop_record().unwrap();
        assert_eq!(p.sequence().len(), 5);
        assert!(p.stop_record().is_err());
    }

    #[test]
    fn test_record_rejects_out_of_range_sample() {
        let mut p = pacer();
        p.start_record().unwrap();
        p.sample(HOME).unwrap();

        // Gripper past its 90 degree limit
        match p.sample(JointVector::new([90, 60, 110, 90, 90, 120])) {
            Err(PacerError::Rejected { index: 1, .. }) => (),
            r => panic!("Expected Rejected, got {:?}", r),
        }

        // Still recording, the bad sample was not kept and current is unchanged
        assert_eq!(p.mode(), PacerMode::Recording);
        assert_eq!(p.sequence().len(), 1);
        assert_eq!(p.current(), HOME);

        let next = JointVector::new([91, 60, 110, 90, 90, 90]);
        assert!(p.sample(next).unwrap());
        assert_eq!(p.sequence().as_slice(), &[HOME, next]);
    }

    #[test]
    fn test_make_safe_ends_recording() {
        let mut p = pacer();
        p.start_record().unwrap();
        p.sample(HOME).unwrap();

        p.make_safe();
        assert_eq!(p.mode(), PacerMode::Idle);
        assert_eq!(p.sequence().len(), 1);

        // Idle pacers are left alone
        p.make_safe();
        assert_eq!(p.mode(), PacerMode::Idle);
    }

    #[test]
    fn test_record_with_tick_source() {
        let params = Params {
            record_interval_s: 0.0,
            ..Params::default()
        };
        let mut p = Pacer::new(params, JointLimits::default(), HOME);
        let stop = p.stop_handle();

        let mut ticks = 0;
        let num = p
            .record(|| {
                ticks += 1;
                if ticks == 6 {
                    stop.store(true, Ordering::SeqCst);
                }
                // Every third tick reads a gripper past its limit
                if ticks % 3 == 0 {
                    JointVector::new([90, 60, 110, 90, 90, 95])
                }
                else {
                    HOME
                }
            })
            .unwrap();

        // Ticks 1, 2, 4 and 5 recorded, 3 rejected, 6 stopped
        assert_eq!(num, 4);
        assert!(p.sequence().iter().all(|v| *v == HOME));
        assert_eq!(p.mode(), PacerMode::Idle);
    }

    #[test]
    fn test_editing() {
        let mut p = pacer();
        p.load_sequence(ramp(3)).unwrap();

        assert_eq!(p.drop_last().unwrap(), ramp(3).last().copied());
        assert_eq!(p.sequence().len(), 2);

        assert!(p.load_sequence_text("[[1, 2, 3]]").is_err());
        assert_eq!(p.sequence().len(), 2);

        p.load_sequence_text("[[1, 2, 3, 4, 5, 60]]").unwrap();
        assert_eq!(p.sequence().len(), 1);

        let taken = p.take_sequence().unwrap();
        assert_eq!(taken.len(), 1);
        assert!(p.sequence().is_empty());

        p.load_sequence(ramp(2)).unwrap();
        p.clear().unwrap();
        assert!(p.sequence().is_empty());
    }

    #[test]
    fn test_playback_archive() {
        let dir = std::env::temp_dir().join(format!("arm_pacer_test_{}", std::process::id()));
        let path = dir.join("playback.csv");

        let mut p = pacer();
        p.set_archiver(Archiver::create(&path).unwrap());
        p.load_sequence(ramp(2)).unwrap();
        p.play_with(&mut MockSink::default(), &AtomicBool::new(false), |_| ())
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "time_s,index,j0,j1,j2,j3,j4,j5");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with(",1,1,60,110,90,90,90"));
    }
}
