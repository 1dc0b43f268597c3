#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering and audio contracts for Path Defence adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use path_defence_core::{
    ActorId, Armament, AudioCue, EmplacementId, EmplacementKind, EmplacementSnapshot, Event,
    GameStatus, ProjectileId,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Variant tag selected on this frame.
    pub select_variant: Option<String>,
    /// Cursor position where a placement was attempted.
    pub place_at: Option<Vec2>,
    /// Cursor position where an upgrade was requested.
    pub upgrade_at: Option<Vec2>,
    /// Cursor position where a sale was requested.
    pub sell_at: Option<Vec2>,
    /// Cursor position used for hover statistics.
    pub hover: Option<Vec2>,
    /// Whether the adapter detected a grid overlay toggle on this frame.
    pub toggle_grid_overlay: bool,
    /// Whether the adapter detected a quit request on this frame.
    pub quit: bool,
}

/// Actor drawn at its current path position.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneActor {
    /// Identifier of the actor.
    pub id: ActorId,
    /// Centre of the sprite.
    pub position: Vec2,
    /// Sprite reference configured for the actor's wave.
    pub sprite: String,
    /// Remaining health as a fraction of the spawn health.
    pub health_fraction: f32,
}

/// Emplacement drawn at its slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEmplacement {
    /// Identifier of the emplacement.
    pub id: EmplacementId,
    /// Variant, used to pick the sprite.
    pub kind: EmplacementKind,
    /// Centre of the slot.
    pub position: Vec2,
    /// Sprite rotation in radians.
    pub facing: f32,
    /// Current level.
    pub level: u32,
}

impl SceneEmplacement {
    /// Captures the drawable part of an emplacement snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &EmplacementSnapshot) -> Self {
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            position: snapshot.position,
            facing: snapshot.facing,
            level: snapshot.level,
        }
    }
}

/// Projectile drawn at its current position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Current position.
    pub position: Vec2,
}

/// Line segment describing a turret's current aim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetLine {
    /// Identifier of the aiming turret.
    pub emplacement: EmplacementId,
    /// Identifier of the tracked actor.
    pub actor: ActorId,
    /// Start of the line at the turret.
    pub from: Vec2,
    /// End of the line at the actor.
    pub to: Vec2,
}

/// Legal slot drawn by the grid overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotMarker {
    /// Centre of the slot.
    pub center: Vec2,
    /// Side length of the slot.
    pub size: f32,
    /// Whether an emplacement occupies the slot.
    pub occupied: bool,
}

/// Statistics shown while the cursor hovers an emplacement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverStats {
    /// Hovered emplacement.
    pub emplacement: EmplacementId,
    /// Variant of the hovered emplacement.
    pub kind: EmplacementKind,
    /// Current level.
    pub level: u32,
    /// Damage per shot, for turrets.
    pub damage: Option<u32>,
    /// Targeting range, for turrets.
    pub range: Option<f32>,
    /// Currency paid per cycle, for generators.
    pub income: Option<u32>,
    /// Price of the next upgrade.
    pub upgrade_cost: u32,
}

impl HoverStats {
    /// Extracts hover statistics from an emplacement snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &EmplacementSnapshot) -> Self {
        let (damage, range, income) = match snapshot.armament {
            Armament::Turret(stats) => (Some(stats.damage), Some(stats.range), None),
            Armament::Generator(stats) => (None, None, Some(stats.income)),
        };

        Self {
            emplacement: snapshot.id,
            kind: snapshot.kind,
            level: snapshot.level,
            damage,
            range,
            income,
            upgrade_cost: snapshot.upgrade_cost,
        }
    }
}

/// Scalars shown in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// Currency available to the player.
    pub currency: u32,
    /// Lives left.
    pub lives: u32,
    /// Waves not yet cleared.
    pub waves_left: usize,
    /// Live actors on the field.
    pub enemies_left: usize,
    /// Variant placed by the next placement attempt.
    pub selected: Option<EmplacementKind>,
    /// Overall outcome of the level.
    pub status: GameStatus,
    /// Statistics of the hovered emplacement.
    pub hover: Option<HoverStats>,
}

impl Hud {
    /// Banner drawn over the field once the level has ended.
    #[must_use]
    pub const fn banner(&self) -> Option<&'static str> {
        match self.status {
            GameStatus::Running => None,
            GameStatus::Won => Some("You Win!"),
            GameStatus::Lost => Some("Game Over"),
        }
    }
}

/// Scene description combining the playfield and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Size of the playfield in world units.
    pub playfield: Vec2,
    /// Waypoints of the path actors follow.
    pub path: Vec<Vec2>,
    /// Actors currently on the field, in spawn order.
    pub actors: Vec<SceneActor>,
    /// Placed emplacements.
    pub emplacements: Vec<SceneEmplacement>,
    /// Projectiles in flight.
    pub projectiles: Vec<SceneProjectile>,
    /// Current aim of every turret with a target.
    pub target_lines: Vec<TargetLine>,
    /// Legal slots, present only while the grid overlay is visible.
    pub slots: Option<Vec<SlotMarker>>,
    /// Heads-up display scalars.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene for a playfield of the given size.
    pub fn new(width: f32, height: f32, path: Vec<Vec2>, hud: Hud) -> Result<Self, RenderingError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(RenderingError::InvalidPlayfield { width, height });
        }

        Ok(Self {
            playfield: Vec2::new(width, height),
            path,
            actors: Vec::new(),
            emplacements: Vec::new(),
            projectiles: Vec::new(),
            target_lines: Vec::new(),
            slots: None,
            hud,
        })
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Path Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and per-frame input captured by the adapter, mutates the scene before
    /// it is rendered, and returns `false` once the adapter should stop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static;
}

/// Audio layer that plays fire-and-forget sound cues.
pub trait AudioSink {
    /// Plays a single cue; no acknowledgement is expected.
    fn play(&mut self, cue: AudioCue);
}

/// Forwards the audio cue of every event to `sink`, in event order.
pub fn play_cues<S>(events: &[Event], sink: &mut S)
where
    S: AudioSink + ?Sized,
{
    for cue in events.iter().filter_map(Event::audio_cue) {
        sink.play(cue);
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The playfield must have a positive area.
    InvalidPlayfield {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlayfield { width, height } => {
                write!(
                    f,
                    "playfield must have a positive size (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{CellCoord, GeneratorStats, TargetPolicy, TurretStats};

    fn hud() -> Hud {
        Hud {
            currency: 500,
            lives: 1,
            waves_left: 3,
            enemies_left: 0,
            selected: Some(EmplacementKind::Basic),
            status: GameStatus::Running,
            hover: None,
        }
    }

    fn snapshot(armament: Armament) -> EmplacementSnapshot {
        EmplacementSnapshot {
            id: EmplacementId::new(3),
            kind: EmplacementKind::Sniper,
            position: Vec2::new(96.0, 224.0),
            cell: CellCoord::new(1, 3),
            level: 2,
            facing: 1.5,
            armament,
            upgrade_cost: 200,
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        cues: Vec<AudioCue>,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, cue: AudioCue) {
            self.cues.push(cue);
        }
    }

    #[test]
    fn scene_creation_rejects_empty_playfield_without_panicking() {
        let error = Scene::new(0.0, 800.0, Vec::new(), hud()).expect_err("zero width");

        assert_eq!(
            error,
            RenderingError::InvalidPlayfield {
                width: 0.0,
                height: 800.0
            }
        );
        assert_eq!(
            error.to_string(),
            "playfield must have a positive size (received 0x800)"
        );
    }

    #[test]
    fn hover_stats_describe_turrets() {
        let stats = HoverStats::from_snapshot(&snapshot(Armament::Turret(TurretStats {
            range: 300.0,
            damage: 40,
            fire_interval_ms: 2000,
            policy: TargetPolicy::Healthiest,
        })));

        assert_eq!(stats.damage, Some(40));
        assert_eq!(stats.range, Some(300.0));
        assert_eq!(stats.income, None);
        assert_eq!(stats.upgrade_cost, 200);
        assert_eq!(stats.level, 2);
    }

    #[test]
    fn hover_stats_describe_generators() {
        let stats = HoverStats::from_snapshot(&snapshot(Armament::Generator(GeneratorStats {
            income: 15,
            interval_ms: 4500,
            income_step: 5,
            interval_step_ms: 500,
            interval_floor_ms: 1000,
        })));

        assert_eq!(stats.damage, None);
        assert_eq!(stats.income, Some(15));
    }

    #[test]
    fn banner_follows_status() {
        let mut hud = hud();
        assert_eq!(hud.banner(), None);
        hud.status = GameStatus::Won;
        assert_eq!(hud.banner(), Some("You Win!"));
        hud.status = GameStatus::Lost;
        assert_eq!(hud.banner(), Some("Game Over"));
    }

    #[test]
    fn audio_cues_are_forwarded_in_order() {
        let mut sink = RecordingSink::default();
        let events = [
            Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            },
            Event::ActorSpawned {
                actor: ActorId::new(0),
                wave: 0,
                position: Vec2::ZERO,
            },
            Event::ActorHit {
                actor: ActorId::new(0),
                projectile: ProjectileId::new(1),
                damage: 20,
                remaining: 80,
            },
            Event::ActorKilled {
                actor: ActorId::new(0),
            },
        ];

        play_cues(&events, &mut sink);

        assert_eq!(sink.cues, vec![AudioCue::EnemySpawn, AudioCue::EnemyHit]);
    }
}
