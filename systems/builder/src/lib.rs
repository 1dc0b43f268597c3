#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system responsible for emitting emplacement placement, upgrade
//! and sale commands.

use log::warn;
use glam::Vec2;
use path_defence_core::{Command, EmplacementId, EmplacementKind, Event};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput<'a> {
    /// Variant tag the player selected on this frame.
    pub select_variant: Option<&'a str>,
    /// Screen point where the player attempted a placement.
    pub place_at: Option<Vec2>,
    /// Screen point where the player requested an upgrade.
    pub upgrade_at: Option<Vec2>,
    /// Screen point where the player requested a sale.
    pub sell_at: Option<Vec2>,
    /// Indicates whether the player toggled the grid overlay on this frame.
    pub toggle_grid_overlay: bool,
    /// Indicates whether the player asked to quit.
    pub quit: bool,
}

/// Builder system that translates player input into world commands.
#[derive(Debug, Clone)]
pub struct Builder {
    selected: Option<EmplacementKind>,
    overlay_visible: bool,
    quit_requested: bool,
    level_over: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a new builder with the basic variant selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: Some(EmplacementKind::Basic),
            overlay_visible: false,
            quit_requested: false,
            level_over: false,
        }
    }

    /// Variant placed by the next placement attempt, if a valid one is selected.
    #[must_use]
    pub const fn selected(&self) -> Option<EmplacementKind> {
        self.selected
    }

    /// Reports whether the legal-slot overlay should be drawn.
    #[must_use]
    pub const fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Reports whether the player asked to leave the game loop.
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// The `emplacement_at` closure should mirror the semantics of the world's
    /// `query::emplacement_at` helper so the system can identify the hovered
    /// emplacement. Once the world reports a terminal state no further
    /// commands are emitted.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: BuilderInput<'_>,
        mut emplacement_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(Vec2) -> Option<EmplacementId>,
    {
        for event in events {
            if matches!(event, Event::GameLost | Event::AllWavesComplete) {
                self.level_over = true;
            }
        }

        if input.quit {
            self.quit_requested = true;
        }

        if input.toggle_grid_overlay {
            self.overlay_visible = !self.overlay_visible;
        }

        if let Some(tag) = input.select_variant {
            self.selected = match tag.parse::<EmplacementKind>() {
                Ok(kind) => Some(kind),
                Err(error) => {
                    warn!("{error}; placement disabled until a known variant is selected");
                    None
                }
            };
        }

        if self.level_over {
            return;
        }

        if let Some(point) = input.place_at {
            match self.selected {
                Some(kind) => out.push(Command::PlaceEmplacement { kind, point }),
                None => warn!(
                    "placement at ({}, {}) ignored: no variant selected",
                    point.x, point.y
                ),
            }
        }

        if let Some(emplacement) = input.upgrade_at.and_then(&mut emplacement_at) {
            out.push(Command::UpgradeEmplacement { emplacement });
        }

        if let Some(emplacement) = input.sell_at.and_then(&mut emplacement_at) {
            out.push(Command::SellEmplacement { emplacement });
        }
    }
}
