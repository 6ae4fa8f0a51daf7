//! Parameters structure for the pacer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::time::Duration;

use util::time::seconds_to_std;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the pacer.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Interval between two recorded samples.
    ///
    /// Units: seconds
    pub record_interval_s: f64,

    /// Interval between two played steps.
    ///
    /// Units: seconds
    pub play_interval_s: f64,

    /// Time given to the servos to respond after each frame is sent.
    ///
    /// Units: seconds
    pub settle_interval_s: f64,

    /// Write a row to the playback archive for every dispatched step.
    pub archive_playback: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn record_interval(&self) -> Duration {
        seconds_to_std(self.record_interval_s)
    }

    pub fn play_interval(&self) -> Duration {
        seconds_to_std(self.play_interval_s)
    }

    pub fn settle_interval(&self) -> Duration {
        seconds_to_std(self.settle_interval_s)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            record_interval_s: 0.1,
            play_interval_s: 0.1,
            settle_interval_s: 0.05,
            archive_playback: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_params() {
        let p: Params = util::params::from_str(
            "record_interval_s = 0.2\nplay_interval_s = 0.1\n\
             settle_interval_s = 0.0\narchive_playback = false\n",
        )
        .unwrap();

        assert_eq!(p.record_interval(), Duration::from_millis(200));
        assert_eq!(p.play_interval(), Duration::from_millis(100));
        assert_eq!(p.settle_interval(), Duration::from_secs(0));
        assert!(!p.archive_playback);
    }
}
