//! Audio sink that logs and counts cues instead of playing them.

use log::{debug, info};
use path_defence_core::AudioCue;
use path_defence_rendering::AudioSink;

/// Audio sink for headless runs: every cue is logged and tallied.
#[derive(Debug, Default)]
pub(crate) struct LoggingSink {
    played: Vec<(AudioCue, u32)>,
}

impl LoggingSink {
    /// Logs how often each cue was played, in order of first appearance.
    pub(crate) fn report(&self) {
        for (cue, count) in &self.played {
            info!("audio cue {cue:?} played {count} times");
        }
    }
}

impl AudioSink for LoggingSink {
    fn play(&mut self, cue: AudioCue) {
        debug!("audio cue {cue:?}");
        match self.played.iter_mut().find(|(played, _)| *played == cue) {
            Some((_, count)) => *count += 1,
            None => self.played.push((cue, 1)),
        }
    }
}
