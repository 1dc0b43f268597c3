//! Static game configuration loaded once before a playthrough starts.
//!
//! Every tunable constant of the simulation lives in [`GameConfig`]. The value
//! is deserialised by adapters (typically from TOML), validated once, and then
//! handed to the world by value; nothing mutates it afterwards.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, EmplacementKind, Extent};

/// Complete configuration table for a single level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Dimensions of the playable area.
    pub playfield: Playfield,
    /// Placement lattice laid over the playfield.
    pub lattice: Lattice,
    /// Waypoints every actor follows, in traversal order.
    pub path: Vec<Vec2>,
    /// Waves spawned in order.
    pub waves: Vec<WaveSpec>,
    /// Armament assigned to each emplacement variant.
    pub emplacements: BTreeMap<EmplacementKind, Armament>,
    /// Currency rules.
    pub economy: Economy,
    /// Lives available before the level is lost.
    pub starting_lives: u32,
    /// Minimum delay between two spawns within a wave, in milliseconds.
    pub spawn_delay_ms: u64,
    /// Projectile kinematics.
    pub projectiles: ProjectileConfig,
    /// Collision box used for every actor.
    pub actor_hitbox: Extent,
}

impl GameConfig {
    /// Minimum delay between two spawns within a wave.
    #[must_use]
    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    /// Armament configured for the provided emplacement variant.
    #[must_use]
    pub fn armament(&self, kind: EmplacementKind) -> Option<&Armament> {
        self.emplacements.get(&kind)
    }

    /// Checks the table for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let playfield = self.playfield;
        if !(playfield.width > 0.0 && playfield.height > 0.0) {
            return Err(ConfigError::EmptyPlayfield);
        }

        if !(self.lattice.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize {
                cell_size: self.lattice.cell_size,
            });
        }

        let slots = self.lattice.slots;
        if slots.column_start >= slots.column_end
            || slots.row_start >= slots.row_end
            || slots.column_end > self.lattice.columns
            || slots.row_end > self.lattice.rows
        {
            return Err(ConfigError::SlotsOutsideLattice);
        }

        if self.path.len() < 2 {
            return Err(ConfigError::PathTooShort {
                waypoints: self.path.len(),
            });
        }

        if let Some(index) = self
            .path
            .iter()
            .position(|point| !(point.is_finite() && point.cmpge(Vec2::ZERO).all()))
        {
            return Err(ConfigError::InvalidWaypoint { index });
        }

        if self.waves.is_empty() {
            return Err(ConfigError::NoWaves);
        }

        for (wave, spec) in self.waves.iter().enumerate() {
            if spec.is_empty() {
                return Err(ConfigError::EmptyWave { wave });
            }
            for group in &spec.groups {
                if !(group.actor.speed > 0.0) {
                    return Err(ConfigError::NonPositiveSpeed { wave });
                }
                if group.actor.health == 0 {
                    return Err(ConfigError::ZeroHealth { wave });
                }
            }
        }

        for kind in EmplacementKind::ALL {
            let armament = self
                .emplacements
                .get(&kind)
                .ok_or(ConfigError::MissingArmament { kind })?;
            let role_matches = match kind {
                EmplacementKind::Basic | EmplacementKind::Sniper => {
                    matches!(armament, Armament::Turret(_))
                }
                EmplacementKind::Money => matches!(armament, Armament::Generator(_)),
            };
            if !role_matches {
                return Err(ConfigError::ArmamentRoleMismatch { kind });
            }
        }

        if !(0.0..=1.0).contains(&self.economy.sell_refund_ratio) {
            return Err(ConfigError::InvalidRefundRatio {
                ratio: self.economy.sell_refund_ratio,
            });
        }

        if !(self.projectiles.speed.is_finite() && self.projectiles.speed > 0.0) {
            return Err(ConfigError::NonPositiveProjectileSpeed);
        }

        let radius = self.projectiles.arrival_radius;
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(ConfigError::InvalidArrivalRadius { radius });
        }

        for hitbox in [self.projectiles.hitbox, self.actor_hitbox] {
            if !hitbox.is_valid() {
                return Err(ConfigError::InvalidHitbox {
                    width: hitbox.width,
                    height: hitbox.height,
                });
            }
        }

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let path = [
            (50.0, 400.0),
            (300.0, 400.0),
            (300.0, 200.0),
            (600.0, 200.0),
            (600.0, 600.0),
            (900.0, 600.0),
            (900.0, 300.0),
            (1150.0, 300.0),
        ]
        .into_iter()
        .map(|(x, y)| Vec2::new(x, y))
        .collect();

        let waves = vec![
            WaveSpec::uniform(5, ActorSpec::new(1.0, 100, "basic_enemy")),
            WaveSpec::uniform(7, ActorSpec::new(1.5, 150, "fast_enemy")),
            WaveSpec::uniform(4, ActorSpec::new(0.75, 200, "strong_enemy")),
        ];

        let emplacements = BTreeMap::from([
            (
                EmplacementKind::Basic,
                Armament::Turret(TurretStats {
                    range: 150.0,
                    damage: 20,
                    fire_interval_ms: 1000,
                    policy: TargetPolicy::Nearest,
                }),
            ),
            (
                EmplacementKind::Sniper,
                Armament::Turret(TurretStats {
                    range: 300.0,
                    damage: 40,
                    fire_interval_ms: 2000,
                    policy: TargetPolicy::Healthiest,
                }),
            ),
            (
                EmplacementKind::Money,
                Armament::Generator(GeneratorStats {
                    income: 10,
                    interval_ms: 5000,
                    income_step: 5,
                    interval_step_ms: 500,
                    interval_floor_ms: 1000,
                }),
            ),
        ]);

        Self {
            playfield: Playfield {
                width: 1200.0,
                height: 800.0,
            },
            lattice: Lattice {
                cell_size: 64.0,
                columns: 15,
                rows: 10,
                slots: SlotRegion {
                    column_start: 1,
                    column_end: 15,
                    row_start: 3,
                    row_end: 10,
                },
            },
            path,
            waves,
            emplacements,
            economy: Economy {
                starting_currency: 500,
                placement_cost: 100,
                upgrade_cost_per_level: 100,
                sell_refund_ratio: 0.75,
            },
            starting_lives: 1,
            spawn_delay_ms: 1000,
            projectiles: ProjectileConfig {
                speed: 5.0,
                arrival_radius: 10.0,
                hitbox: Extent::new(10.0, 10.0),
            },
            actor_hitbox: Extent::new(30.0, 40.0),
        }
    }
}

/// Size of the playable area. Projectiles leaving it expire.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    /// Horizontal extent in playfield units.
    pub width: f32,
    /// Vertical extent in playfield units.
    pub height: f32,
}

impl Playfield {
    /// Reports whether the point lies within `[0, width] x [0, height]`.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Regular square lattice used to snap emplacement positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// Side length of a single lattice cell.
    pub cell_size: f32,
    /// Number of lattice columns.
    pub columns: u32,
    /// Number of lattice rows.
    pub rows: u32,
    /// Sub-rectangle of cells reserved for emplacements.
    pub slots: SlotRegion,
}

/// Half-open rectangle of lattice cells in which emplacements may be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRegion {
    /// First column of the region.
    pub column_start: u32,
    /// Column one past the last column of the region.
    pub column_end: u32,
    /// First row of the region.
    pub row_start: u32,
    /// Row one past the last row of the region.
    pub row_end: u32,
}

impl SlotRegion {
    /// Iterates the cells of the region column by column.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.column_start..self.column_end).flat_map(move |column| {
            (self.row_start..self.row_end).map(move |row| CellCoord::new(column, row))
        })
    }
}

/// Ordered batch of actors released by the wave director.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Groups of identical actors, spawned in order.
    pub groups: Vec<SpawnGroup>,
}

impl WaveSpec {
    /// Creates a wave made of `count` copies of the same actor.
    #[must_use]
    pub fn uniform(count: u32, actor: ActorSpec) -> Self {
        Self {
            groups: vec![SpawnGroup { count, actor }],
        }
    }

    /// Number of actors released by the wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.count as usize).sum()
    }

    /// Reports whether the wave releases no actors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn specification of the actor at `index` in release order.
    #[must_use]
    pub fn actor(&self, index: usize) -> Option<&ActorSpec> {
        let mut remaining = index;
        for group in &self.groups {
            let count = group.count as usize;
            if remaining < count {
                return Some(&group.actor);
            }
            remaining -= count;
        }
        None
    }
}

/// Run of identical actors within a wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Number of actors in the run.
    pub count: u32,
    /// Specification shared by every actor of the run.
    #[serde(flatten)]
    pub actor: ActorSpec,
}

/// Parameters of a single spawned actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    /// Distance covered per tick.
    pub speed: f32,
    /// Health the actor spawns with.
    pub health: u32,
    /// Sprite reference forwarded to the rendering layer.
    pub sprite: String,
}

impl ActorSpec {
    /// Creates a new actor specification.
    #[must_use]
    pub fn new(speed: f32, health: u32, sprite: impl Into<String>) -> Self {
        Self {
            speed,
            health,
            sprite: sprite.into(),
        }
    }
}

/// Behaviour and statistics of an emplacement variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Armament {
    /// Fires projectiles at actors selected by a targeting policy.
    Turret(TurretStats),
    /// Never fires; pays currency on a timer instead.
    Generator(GeneratorStats),
}

/// Statistics of a firing emplacement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretStats {
    /// Maximum distance at which an actor can be targeted.
    pub range: f32,
    /// Damage carried by every projectile.
    pub damage: u32,
    /// Minimum time between two shots, in milliseconds.
    pub fire_interval_ms: u64,
    /// Rule used to pick a target among actors in range.
    pub policy: TargetPolicy,
}

impl TurretStats {
    /// Minimum time between two shots.
    #[must_use]
    pub fn fire_interval(&self) -> Duration {
        Duration::from_millis(self.fire_interval_ms)
    }
}

/// Statistics of a currency-producing emplacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorStats {
    /// Currency paid per cycle.
    pub income: u32,
    /// Length of a cycle, in milliseconds.
    pub interval_ms: u64,
    /// Income added by each upgrade.
    pub income_step: u32,
    /// Cycle shortening applied by each upgrade, in milliseconds.
    pub interval_step_ms: u64,
    /// Shortest cycle upgrades may reach, in milliseconds.
    pub interval_floor_ms: u64,
}

impl GeneratorStats {
    /// Length of a payout cycle.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Statistics after one upgrade.
    #[must_use]
    pub fn upgraded(self) -> Self {
        let shortened = self.interval_ms.saturating_sub(self.interval_step_ms);
        Self {
            income: self.income.saturating_add(self.income_step),
            interval_ms: shortened.max(self.interval_floor_ms),
            ..self
        }
    }
}

/// Target-selection rule of a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Closest actor within range; the first one seen wins ties.
    Nearest,
    /// Actor with the most remaining health within range; the first one seen wins ties.
    Healthiest,
}

/// Currency rules applied to placement, upgrades and sales.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    /// Currency available when the level starts.
    pub starting_currency: u32,
    /// Price of placing any emplacement.
    pub placement_cost: u32,
    /// Upgrade price multiplied by the emplacement's current level.
    pub upgrade_cost_per_level: u32,
    /// Share of the placement cost refunded on sale, in `0.0..=1.0`.
    pub sell_refund_ratio: f32,
}

impl Economy {
    /// Price of upgrading an emplacement currently at `level`.
    #[must_use]
    pub fn upgrade_cost(&self, level: u32) -> u32 {
        self.upgrade_cost_per_level.saturating_mul(level)
    }

    /// Currency returned when an emplacement is sold.
    #[must_use]
    pub fn sell_refund(&self) -> u32 {
        (self.placement_cost as f32 * self.sell_refund_ratio).floor() as u32
    }
}

/// Projectile kinematics shared by every emplacement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileConfig {
    /// Distance covered per tick.
    pub speed: f32,
    /// Distance to the aim point below which a projectile expires.
    pub arrival_radius: f32,
    /// Collision box of a projectile.
    pub hitbox: Extent,
}

/// Reasons a configuration table is rejected at start-up.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Width or height of the playfield is not positive.
    #[error("playfield must have a positive width and height")]
    EmptyPlayfield,
    /// Lattice cells must have a positive size.
    #[error("lattice cell size must be positive (received {cell_size})")]
    InvalidCellSize {
        /// Offending cell size.
        cell_size: f32,
    },
    /// The reserved slot rectangle is empty or extends past the lattice.
    #[error("reserved slot region must be non-empty and lie inside the lattice")]
    SlotsOutsideLattice,
    /// The path has fewer than two waypoints.
    #[error("path needs at least two waypoints (received {waypoints})")]
    PathTooShort {
        /// Number of waypoints provided.
        waypoints: usize,
    },
    /// A waypoint is not finite or lies left of or above the playfield origin.
    #[error("path waypoint {index} must have finite, non-negative coordinates")]
    InvalidWaypoint {
        /// Zero-based index of the waypoint.
        index: usize,
    },
    /// The level defines no waves.
    #[error("at least one wave must be configured")]
    NoWaves,
    /// A wave releases no actors.
    #[error("wave {wave} releases no actors")]
    EmptyWave {
        /// Zero-based index of the wave.
        wave: usize,
    },
    /// A wave contains an actor that would never move.
    #[error("wave {wave} contains an actor with a non-positive speed")]
    NonPositiveSpeed {
        /// Zero-based index of the wave.
        wave: usize,
    },
    /// A wave contains an actor that spawns dead.
    #[error("wave {wave} contains an actor with zero health")]
    ZeroHealth {
        /// Zero-based index of the wave.
        wave: usize,
    },
    /// An emplacement variant has no armament entry.
    #[error("no armament configured for the {kind} emplacement")]
    MissingArmament {
        /// Variant without an entry.
        kind: EmplacementKind,
    },
    /// A variant is configured with the wrong armament role.
    ///
    /// Basic and sniper emplacements must be turrets; money emplacements must
    /// be generators.
    #[error("the {kind} emplacement is configured with the wrong armament role")]
    ArmamentRoleMismatch {
        /// Variant with the mismatched entry.
        kind: EmplacementKind,
    },
    /// The sale refund ratio lies outside `0.0..=1.0`.
    #[error("sell refund ratio must lie within 0.0..=1.0 (received {ratio})")]
    InvalidRefundRatio {
        /// Offending ratio.
        ratio: f32,
    },
    /// Projectiles would never leave their emplacement.
    #[error("projectile speed must be positive and finite")]
    NonPositiveProjectileSpeed,
    /// The projectile arrival radius is negative or not finite.
    #[error("projectile arrival radius must be finite and non-negative (received {radius})")]
    InvalidArrivalRadius {
        /// Offending radius.
        radius: f32,
    },
    /// A collision box has a negative or non-finite side.
    #[error("collision box must have finite, non-negative sides (received {width}x{height})")]
    InvalidHitbox {
        /// Offending width.
        width: f32,
        /// Offending height.
        height: f32,
    },
}
