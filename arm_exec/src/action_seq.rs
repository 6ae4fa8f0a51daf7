//! Action sequence store
//!
//! An action sequence is the ordered list of joint vectors which makes up a
//! recorded or generated motion. Order is playback order.
//!
//! Sequences are persisted as a text literal of nested integer lists, for
//! example `[[90, 60, 110, 90, 90, 90], [88, 60, 110, 90, 90, 90]]`. Loading
//! uses a strict parser which only accepts a list of 6 element integer lists.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// Internal
use crate::joint::JointVector;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered sequence of joint vectors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSequence {
    positions: Vec<JointVector>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with action sequences.
#[derive(Debug, thiserror::Error)]
pub enum SeqError {
    #[error("The sequence data is malformed: {0}")]
    MalformedSequence(serde_json::Error),

    #[error("Down-sampling stride must be at least 1, found {0}")]
    InvalidStride(usize),

    #[error("Could not access the sequence file: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ActionSequence {
    /// Create a new empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JointVector> {
        self.positions.get(index)
    }

    pub fn first(&self) -> Option<&JointVector> {
        self.positions.first()
    }

    pub fn last(&self) -> Option<&JointVector> {
        self.positions.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JointVector> {
        self.positions.iter()
    }

    pub fn as_slice(&self) -> &[JointVector] {
        &self.positions
    }

    /// Add a position to the end of the sequence.
    pub fn append(&mut self, position: JointVector) {
        self.positions.push(position);
    }

    /// Add every position of `other` to the end of this sequence.
    pub fn extend_from(&mut self, other: &ActionSequence) {
        self.positions.extend_from_slice(&other.positions);
    }

    /// Remove and return the last position.
    pub fn drop_last(&mut self) -> Option<JointVector> {
        self.positions.pop()
    }

    /// Remove every position.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Concatenate sequences in order, keeping the order within each one.
    pub fn concat(sequences: &[ActionSequence]) -> ActionSequence {
        let mut out = ActionSequence {
            positions: Vec::with_capacity(sequences.iter().map(|s| s.len()).sum()),
        };

        for seq in sequences {
            out.extend_from(seq);
        }

        out
    }

    /// Keep only the positions at indices `0, stride, 2*stride, ...`.
    pub fn downsample(&self, stride: usize) -> Result<ActionSequence, SeqError> {
        if stride < 1 {
            return Err(SeqError::InvalidStride(stride));
        }

        Ok(self.positions.iter().copied().step_by(stride).collect())
    }

    /// Serialise the sequence into its text form.
    pub fn to_text(&self) -> String {
        let rows: Vec<String> = self.positions.iter().map(|p| p.to_string()).collect();
        format!("[{}]", rows.join(", "))
    }

    /// Parse a sequence from its text form.
    ///
    /// The text must be a list of lists, each inner list holding exactly 6
    /// integers. Anything else is rejected as malformed.
    pub fn from_text(text: &str) -> Result<ActionSequence, SeqError> {
        serde_json::from_str(text).map_err(SeqError::MalformedSequence)
    }

    /// Replace the contents of this sequence with the parsed text.
    ///
    /// On error this sequence is left untouched.
    pub fn replace_from_text(&mut self, text: &str) -> Result<(), SeqError> {
        *self = Self::from_text(text)?;
        Ok(())
    }

    /// Load a sequence from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ActionSequence, SeqError> {
        let text = fs::read_to_string(path.as_ref())?;
        let seq = Self::from_text(&text)?;

        info!("Loaded {} positions from {:?}", seq.len(), path.as_ref());

        Ok(seq)
    }

    /// Save the sequence to a file, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SeqError> {
        fs::write(path.as_ref(), self.to_text())?;

        debug!("Saved {} positions to {:?}", self.len(), path.as_ref());

        Ok(())
    }
}

impl From<Vec<JointVector>> for ActionSequence {
    fn from(positions: Vec<JointVector>) -> Self {
        Self { positions }
    }
}

impl std::iter::FromIterator<JointVector> for ActionSequence {
    fn from_iter<I: IntoIterator<Item = JointVector>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ActionSequence {
    type Item = JointVector;
    type IntoIter = std::vec::IntoIter<JointVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.into_iter()
    }
}

impl<'a> IntoIterator for &'a ActionSequence {
    type Item = &'a JointVector;
    type IntoIter = std::slice::Iter<'a, JointVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}
