//! Wave director driving spawn timing and wave progression.

use std::time::Duration;

use path_defence_core::{ActorSpec, WaveSpec};

/// Progress of the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WavePhase {
    /// Actors of the current wave are still being released.
    Spawning,
    /// Every actor of the current wave was released.
    Active,
    /// The last wave was cleared.
    Complete,
}

/// Spawn order produced when the spawn timer elapses.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SpawnOrder {
    pub(crate) wave: usize,
    pub(crate) index: usize,
    pub(crate) spec: ActorSpec,
}

/// Wave transition produced once the live actor collection empties.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WaveProgress {
    /// The current wave is not finished yet.
    Pending,
    /// `cleared` finished and `next` starts spawning.
    Advanced { cleared: usize, next: usize },
    /// `cleared` was the final wave.
    Completed { cleared: usize },
}

#[derive(Clone, Debug)]
pub(crate) struct WaveDirector {
    waves: Vec<WaveSpec>,
    spawn_delay: Duration,
    current: usize,
    spawned: usize,
    last_spawn: Option<Duration>,
    phase: WavePhase,
}

impl WaveDirector {
    pub(crate) fn new(waves: Vec<WaveSpec>, spawn_delay: Duration) -> Self {
        let phase = if waves.is_empty() {
            WavePhase::Complete
        } else {
            WavePhase::Spawning
        };

        Self {
            waves,
            spawn_delay,
            current: 0,
            spawned: 0,
            last_spawn: None,
            phase,
        }
    }

    pub(crate) fn phase(&self) -> WavePhase {
        self.phase
    }

    pub(crate) fn current_wave(&self) -> usize {
        self.current
    }

    pub(crate) fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Waves not yet cleared, the current one included.
    pub(crate) fn waves_left(&self) -> usize {
        match self.phase {
            WavePhase::Complete => 0,
            WavePhase::Spawning | WavePhase::Active => self.waves.len() - self.current,
        }
    }

    /// Releases the next actor of the current wave when the spawn delay has
    /// strictly elapsed. The first actor of a wave is released immediately.
    pub(crate) fn due_spawn(&mut self, now: Duration) -> Option<SpawnOrder> {
        if self.phase != WavePhase::Spawning {
            return None;
        }

        if let Some(last) = self.last_spawn {
            if now.saturating_sub(last) <= self.spawn_delay {
                return None;
            }
        }

        let wave = self.waves.get(self.current)?;
        let Some(spec) = wave.actor(self.spawned) else {
            debug_assert!(false, "spawning phase outlived wave {}", self.current);
            self.phase = WavePhase::Active;
            return None;
        };

        let order = SpawnOrder {
            wave: self.current,
            index: self.spawned,
            spec: spec.clone(),
        };
        self.spawned += 1;
        self.last_spawn = Some(now);
        if self.spawned >= wave.len() {
            self.phase = WavePhase::Active;
        }

        Some(order)
    }

    /// Moves to the next wave once the current one is fully spawned and no
    /// actor is left alive.
    pub(crate) fn advance_if_cleared(&mut self, live_actors: usize) -> WaveProgress {
        if self.phase != WavePhase::Active || live_actors > 0 {
            return WaveProgress::Pending;
        }

        let cleared = self.current;
        if cleared + 1 < self.waves.len() {
            self.current += 1;
            self.spawned = 0;
            self.last_spawn = None;
            self.phase = WavePhase::Spawning;
            WaveProgress::Advanced {
                cleared,
                next: self.current,
            }
        } else {
            self.phase = WavePhase::Complete;
            WaveProgress::Completed { cleared }
        }
    }
}
