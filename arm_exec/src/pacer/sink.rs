//! Command sinks
//!
//! A sink is the transport which carries joint vectors to the servos.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::joint::JointVector;
use comms_if::eqpt::servo::{FrameError, ServoDems};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A destination for joint vector demands.
pub trait CmdSink {
    /// Send one joint vector.
    ///
    /// Once this returns the sink is ready to accept the next vector.
    fn dispatch(&mut self, pos: &JointVector) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sink which writes servo frames to any writer, then waits for the servos
/// to settle.
pub struct FrameSink<W: Write> {
    writer: W,
    settle: Duration,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while dispatching to a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Cannot encode the servo frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Cannot write to the sink: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<W: Write> FrameSink<W> {
    pub fn new(writer: W, settle: Duration) -> Self {
        Self { writer, settle }
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CmdSink for FrameSink<W> {
    fn dispatch(&mut self, pos: &JointVector) -> Result<(), SinkError> {
        let frame = ServoDems::from(*pos).to_frame()?;

        self.writer.write_all(frame.as_bytes())?;
        self.writer.flush()?;

        trace!("Sent frame {:?}", frame);

        if self.settle > Duration::from_secs(0) {
            thread::sleep(self.settle);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Open the device or file frames are written to.
///
/// A regular file is truncated so no frames from an earlier run are left
/// after the new ones.
pub fn open_device<P: AsRef<Path>>(path: P) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_sink() {
        let mut sink = FrameSink::new(Vec::new(), Duration::from_secs(0));

        sink.dispatch(&JointVector::new([90, 60, 110, 90, 90, 90])).unwrap();
        sink.dispatch(&JointVector::new([0, 5, 180, 145, 0, 60])).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "090060110090090090\n000005180145000060\n");
    }

    #[test]
    fn test_frame_sink_rejects_unencodable() {
        let mut sink = FrameSink::new(Vec::new(), Duration::from_secs(0));

        match sink.dispatch(&JointVector::new([90, 60, 110, 90, 90, -1])) {
            Err(SinkError::Frame(FrameError::NotEncodable { index: 5, value: -1 })) => (),
            r => panic!("Expected NotEncodable, got {:?}", r),
        }

        // Nothing was written
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_open_device_truncates() {
        let dir = std::env::temp_dir().join(format!("arm_sink_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frames.txt");

        // An earlier, longer run
        std::fs::write(&path, "090060110090090090\n".repeat(5)).unwrap();

        let mut sink = FrameSink::new(open_device(&path).unwrap(), Duration::from_secs(0));
        sink.dispatch(&JointVector::new([0, 5, 180, 145, 0, 60])).unwrap();
        drop(sink);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "000005180145000060\n"
        );
    }
}
