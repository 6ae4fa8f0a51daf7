//! # Servo Bank Equipment Commands
//!
//! The servo bank accepts one frame per demand. A frame is made of one field
//! per servo, each field being the demanded angle in degrees written as three
//! zero-padded base-10 digits. Fields are concatenated with no separator and
//! the frame is terminated by a line feed, for example
//! `090060110090090090\n`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Write;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of servos driven by one frame.
pub const NUM_SERVOS: usize = 6;

/// Number of digits in each field of a frame.
pub const FIELD_WIDTH: usize = 3;

/// Largest angle that fits in a field.
pub const MAX_FIELD_VALUE: i32 = 999;

/// Frame terminator.
pub const FRAME_TERMINATOR: char = '\n';

/// Length of an encoded frame in bytes, including the terminator.
pub const FRAME_LEN: usize = NUM_SERVOS * FIELD_WIDTH + 1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position demands for every servo in the bank.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServoDems {
    /// The demanded angle of each servo.
    ///
    /// Units: degrees
    pub pos_deg: [i32; NUM_SERVOS],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while encoding or decoding a frame.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("Servo {index} demand of {value} cannot be encoded, must be between 0 and 999")]
    NotEncodable { index: usize, value: i32 },

    #[error("Expected a frame of 19 bytes, found {0}")]
    InvalidLength(usize),

    #[error("Frame is not terminated by a line feed")]
    MissingTerminator,

    #[error("Frame contains a non-digit character at byte {0}")]
    InvalidDigit(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ServoDems {
    /// Create a new set of demands.
    pub fn new(pos_deg: [i32; NUM_SERVOS]) -> Self {
        Self { pos_deg }
    }

    /// Check that every demand can be represented in a frame.
    pub fn validate(&self) -> Result<(), FrameError> {
        match self
            .pos_deg
            .iter()
            .enumerate()
            .find(|(_, v)| **v < 0 || **v > MAX_FIELD_VALUE)
        {
            Some((index, value)) => Err(FrameError::NotEncodable {
                index,
                value: *value,
            }),
            None => Ok(()),
        }
    }

    /// Encode the demands into a frame, including the terminator.
    pub fn to_frame(&self) -> Result<String, FrameError> {
        self.validate()?;

        let mut frame = String::with_capacity(FRAME_LEN);
        for v in self.pos_deg.iter() {
            // Writing into a String cannot fail
            let _ = write!(frame, "{:03}", v);
        }
        frame.push(FRAME_TERMINATOR);

        Ok(frame)
    }

    /// Decode demands from a frame.
    ///
    /// The frame must include the terminator.
    pub fn from_frame(frame: &str) -> Result<Self, FrameError> {
        if frame.len() != FRAME_LEN {
            return Err(FrameError::InvalidLength(frame.len()));
        }

        let bytes = frame.as_bytes();
        if bytes[FRAME_LEN - 1] != FRAME_TERMINATOR as u8 {
            return Err(FrameError::MissingTerminator);
        }

        let mut pos_deg = [0i32; NUM_SERVOS];
        for (i, field) in bytes[..FRAME_LEN - 1].chunks(FIELD_WIDTH).enumerate() {
            let mut value = 0i32;
            for (j, b) in field.iter().enumerate() {
                if !b.is_ascii_digit() {
                    return Err(FrameError::InvalidDigit(i * FIELD_WIDTH + j));
                }
                value = value * 10 + (b - b'0') as i32;
            }
            pos_deg[i] = value;
        }

        Ok(Self { pos_deg })
    }
}

impl From<[i32; NUM_SERVOS]> for ServoDems {
    fn from(pos_deg: [i32; NUM_SERVOS]) -> Self {
        Self { pos_deg }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encode_frame() {
        let dems = ServoDems::new([90, 60, 110, 90, 90, 90]);
        assert_eq!(dems.to_frame().unwrap(), "090060110090090090\n");

        let dems = ServoDems::new([0, 5, 999, 180, 45, 60]);
        assert_eq!(dems.to_frame().unwrap(), "000005999180045060\n");
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert_eq!(
            ServoDems::new([90, -1, 110, 90, 90, 90]).to_frame(),
            Err(FrameError::NotEncodable { index: 1, value: -1 })
        );
        assert_eq!(
            ServoDems::new([90, 60, 110, 90, 90, 1000]).to_frame(),
            Err(FrameError::NotEncodable { index: 5, value: 1000 })
        );
    }

    #[test]
    fn test_decode_frame() {
        assert_eq!(
            ServoDems::from_frame("180000090145090075\n").unwrap(),
            ServoDems::new([180, 0, 90, 145, 90, 75])
        );
        assert_eq!(
            ServoDems::from_frame("18000009014509007\n"),
            Err(FrameError::InvalidLength(18))
        );
        assert_eq!(
            ServoDems::from_frame("1800000901450900750"),
            Err(FrameError::MissingTerminator)
        );
        assert_eq!(
            ServoDems::from_frame("18000009014509007x\n"),
            Err(FrameError::InvalidDigit(17))
        );
    }
}
