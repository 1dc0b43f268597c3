#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that adapters use
//! for feedback, logging and audio. Systems read immutable snapshots such as
//! [`ActorView`] and never mutate world state directly.

mod config;
mod geometry;

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{
    ActorSpec, Armament, ConfigError, Economy, GameConfig, GeneratorStats, Lattice, Playfield,
    ProjectileConfig, SlotRegion, SpawnGroup, TargetPolicy, TurretStats, WaveSpec,
};
pub use geometry::{Extent, Rect};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Path Defence.";

/// Overall outcome of the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waves are still being fought.
    Running,
    /// Every wave was spawned and cleared.
    Won,
    /// The player ran out of lives.
    Lost,
}

impl GameStatus {
    /// Reports whether the level reached a terminal state.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one tick.
    Tick {
        /// Simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of an emplacement at the lattice cell under `point`.
    PlaceEmplacement {
        /// Variant to construct.
        kind: EmplacementKind,
        /// Screen point selected by the player.
        point: Vec2,
    },
    /// Requests an upgrade of an existing emplacement.
    UpgradeEmplacement {
        /// Emplacement to upgrade.
        emplacement: EmplacementId,
    },
    /// Requests the sale of an existing emplacement.
    SellEmplacement {
        /// Emplacement to sell.
        emplacement: EmplacementId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A wave started releasing actors.
    WaveStarted {
        /// Zero-based index of the wave.
        wave: usize,
    },
    /// Every actor of a wave was spawned and has left the field.
    WaveCleared {
        /// Zero-based index of the wave.
        wave: usize,
    },
    /// The final wave was cleared; the level is won.
    AllWavesComplete,
    /// An actor entered the field at the start of the path.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Wave that released the actor.
        wave: usize,
        /// Spawn position.
        position: Vec2,
    },
    /// A projectile struck an actor.
    ActorHit {
        /// Actor that took damage.
        actor: ActorId,
        /// Projectile consumed by the hit.
        projectile: ProjectileId,
        /// Damage applied.
        damage: u32,
        /// Health left after the hit.
        remaining: u32,
    },
    /// An actor's health reached zero.
    ActorKilled {
        /// Actor that died.
        actor: ActorId,
    },
    /// An actor reached the end of the path.
    ActorLeaked {
        /// Actor that escaped.
        actor: ActorId,
        /// Lives left after the leak.
        lives: u32,
    },
    /// The player ran out of lives.
    GameLost,
    /// An emplacement fired a projectile.
    ProjectileFired {
        /// Projectile that was created.
        projectile: ProjectileId,
        /// Emplacement that fired.
        emplacement: EmplacementId,
        /// Actor that was targeted.
        actor: ActorId,
        /// Fixed aim point captured when firing.
        target: Vec2,
    },
    /// A projectile reached its aim point or left the playfield without hitting anything.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: ProjectileId,
    },
    /// A generator paid out currency.
    IncomeGenerated {
        /// Paying emplacement.
        emplacement: EmplacementId,
        /// Currency credited.
        amount: u32,
    },
    /// An emplacement was constructed.
    EmplacementPlaced {
        /// Identifier assigned to the emplacement.
        emplacement: EmplacementId,
        /// Variant that was constructed.
        kind: EmplacementKind,
        /// Lattice cell the emplacement occupies.
        cell: CellCoord,
        /// Centre of the occupied cell.
        position: Vec2,
    },
    /// A placement request was refused.
    PlacementRejected {
        /// Variant requested for placement.
        kind: EmplacementKind,
        /// Screen point provided in the request.
        point: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// An emplacement gained a level.
    EmplacementUpgraded {
        /// Upgraded emplacement.
        emplacement: EmplacementId,
        /// Level reached.
        level: u32,
        /// Currency spent on the upgrade.
        cost: u32,
    },
    /// An emplacement was sold and its slot freed.
    EmplacementSold {
        /// Sold emplacement.
        emplacement: EmplacementId,
        /// Currency refunded.
        refund: u32,
    },
    /// An upgrade or sale request was refused.
    ManagementRejected {
        /// Emplacement targeted by the request.
        emplacement: EmplacementId,
        /// Specific reason the request failed.
        reason: ManagementError,
    },
}

impl Event {
    /// Sound cue the audio layer should play in response to the event, if any.
    #[must_use]
    pub const fn audio_cue(&self) -> Option<AudioCue> {
        match self {
            Self::ProjectileFired { .. } => Some(AudioCue::Shoot),
            Self::ActorSpawned { .. } => Some(AudioCue::EnemySpawn),
            Self::ActorHit { .. } => Some(AudioCue::EnemyHit),
            Self::EmplacementUpgraded { .. } => Some(AudioCue::Upgrade),
            Self::EmplacementSold { .. } => Some(AudioCue::Sell),
            _ => None,
        }
    }
}

/// Fire-and-forget sound cues emitted alongside state transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// An emplacement fired.
    Shoot,
    /// An actor spawned.
    EnemySpawn,
    /// An actor was hit.
    EnemyHit,
    /// An emplacement was upgraded.
    Upgrade,
    /// An emplacement was sold.
    Sell,
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an emplacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmplacementId(u32);

impl EmplacementId {
    /// Creates a new emplacement identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single lattice cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new lattice cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Variants of emplacement the player can construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmplacementKind {
    /// Short-range turret that targets the nearest actor.
    Basic,
    /// Long-range turret that targets the healthiest actor.
    Sniper,
    /// Generator that produces currency instead of firing.
    Money,
}

impl EmplacementKind {
    /// Every variant in display order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Sniper, Self::Money];

    /// Lowercase tag used by input bindings and configuration files.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Sniper => "sniper",
            Self::Money => "money",
        }
    }
}

impl fmt::Display for EmplacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EmplacementKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant(value.to_owned()))
    }
}

/// Error returned when a variant tag names no known emplacement.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown emplacement variant `{0}`")]
pub struct UnknownVariant(pub String);

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The player cannot afford the placement cost.
    #[error("not enough currency to place an emplacement")]
    InsufficientFunds,
    /// The point does not map to a legal slot.
    #[error("position is not a legal emplacement slot")]
    IllegalSlot,
    /// Another emplacement already occupies the slot.
    #[error("slot is already occupied")]
    Occupied,
    /// The level already ended.
    #[error("the game is over")]
    GameOver,
}

/// Reasons an upgrade or sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ManagementError {
    /// No emplacement with the provided identifier exists.
    #[error("no such emplacement")]
    MissingEmplacement,
    /// The player cannot afford the upgrade.
    #[error("not enough currency to upgrade")]
    InsufficientFunds,
    /// The level already ended.
    #[error("the game is over")]
    GameOver,
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Current position on the path.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Health the actor spawned with.
    pub max_health: u32,
    /// Sprite reference of the actor.
    pub sprite: String,
}

/// Read-only snapshot describing all live actors.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    ///
    /// Identifiers grow with spawn order, so sorting by identifier keeps the
    /// world's iteration order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single emplacement's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmplacementSnapshot {
    /// Identifier allocated to the emplacement by the world.
    pub id: EmplacementId,
    /// Variant that was constructed.
    pub kind: EmplacementKind,
    /// Centre of the occupied lattice cell.
    pub position: Vec2,
    /// Lattice cell the emplacement occupies.
    pub cell: CellCoord,
    /// Current level, starting at one.
    pub level: u32,
    /// Facing angle in radians; cosmetic only.
    pub facing: f32,
    /// Current statistics.
    pub armament: Armament,
    /// Price of the next upgrade.
    pub upgrade_cost: u32,
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Current position.
    pub position: Vec2,
    /// Fixed aim point.
    pub target: Vec2,
    /// Damage delivered on impact.
    pub damage: u32,
}

/// Legal emplacement slot and its occupant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSnapshot {
    /// Lattice cell of the slot.
    pub cell: CellCoord,
    /// Centre of the slot in playfield units.
    pub center: Vec2,
    /// Emplacement currently occupying the slot.
    pub occupant: Option<EmplacementId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn emplacement_kind_parses_tags_case_insensitively() {
        assert_eq!("basic".parse::<EmplacementKind>(), Ok(EmplacementKind::Basic));
        assert_eq!(" Sniper ".parse::<EmplacementKind>(), Ok(EmplacementKind::Sniper));
        assert_eq!("MONEY".parse::<EmplacementKind>(), Ok(EmplacementKind::Money));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let error = "laser".parse::<EmplacementKind>().expect_err("unknown tag");
        assert_eq!(error, UnknownVariant("laser".to_owned()));
        assert_eq!(error.to_string(), "unknown emplacement variant `laser`");
    }

    #[test]
    fn emplacement_kind_display_matches_tag() {
        for kind in EmplacementKind::ALL {
            assert_eq!(kind.to_string(), kind.tag());
        }
    }

    #[test]
    fn audio_cues_follow_state_transitions() {
        let fired = Event::ProjectileFired {
            projectile: ProjectileId::new(1),
            emplacement: EmplacementId::new(2),
            actor: ActorId::new(3),
            target: Vec2::ZERO,
        };
        assert_eq!(fired.audio_cue(), Some(AudioCue::Shoot));
        assert_eq!(
            Event::EmplacementSold {
                emplacement: EmplacementId::new(2),
                refund: 75,
            }
            .audio_cue(),
            Some(AudioCue::Sell)
        );
        assert_eq!(Event::GameLost.audio_cue(), None);
    }

    #[test]
    fn terminal_statuses_report_game_over() {
        assert!(!GameStatus::Running.is_over());
        assert!(GameStatus::Won.is_over());
        assert!(GameStatus::Lost.is_over());
    }

    #[test]
    fn actor_view_orders_by_spawn() {
        let snapshot = |id| ActorSnapshot {
            id: ActorId::new(id),
            position: Vec2::ZERO,
            health: 10,
            max_health: 10,
            sprite: "basic_enemy".to_owned(),
        };
        let view = ActorView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(2)]);
        let ids: Vec<_> = view.iter().map(|actor| actor.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn management_error_round_trips_through_bincode() {
        assert_round_trip(&ManagementError::MissingEmplacement);
    }

    #[test]
    fn emplacement_kind_round_trips_through_bincode() {
        assert_round_trip(&EmplacementKind::Money);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }
}
