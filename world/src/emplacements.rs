//! Placed emplacements and their per-variant behaviour.

use std::time::Duration;

use glam::Vec2;
use path_defence_core::{
    ActorId, ActorView, Armament, CellCoord, ConfigError, EmplacementId, EmplacementKind,
    EmplacementSnapshot, GameConfig, GeneratorStats, TurretStats,
};
use path_defence_system_tower_targeting::find_target;

/// Armament lookup resolved once from the configuration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ArmamentTable {
    basic: Armament,
    sniper: Armament,
    money: Armament,
}

impl ArmamentTable {
    /// Resolves the armament of every variant, failing on the first missing entry.
    pub(crate) fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        let lookup = |kind| {
            config
                .armament(kind)
                .copied()
                .ok_or(ConfigError::MissingArmament { kind })
        };

        Ok(Self {
            basic: lookup(EmplacementKind::Basic)?,
            sniper: lookup(EmplacementKind::Sniper)?,
            money: lookup(EmplacementKind::Money)?,
        })
    }

    pub(crate) fn get(&self, kind: EmplacementKind) -> Armament {
        match kind {
            EmplacementKind::Basic => self.basic,
            EmplacementKind::Sniper => self.sniper,
            EmplacementKind::Money => self.money,
        }
    }
}

/// Something an emplacement wants the world to do after its tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum EmplacementAction {
    /// Spawn a projectile aimed at the captured actor position.
    Fire {
        actor: ActorId,
        target: Vec2,
        damage: u32,
    },
    /// Credit currency to the player.
    Income { amount: u32 },
}

#[derive(Clone, Copy, Debug)]
enum ArmamentState {
    Turret {
        stats: TurretStats,
        last_fire: Duration,
    },
    Generator {
        stats: GeneratorStats,
        last_payout: Duration,
    },
}

/// Emplacement owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Emplacement {
    pub(crate) id: EmplacementId,
    pub(crate) kind: EmplacementKind,
    pub(crate) cell: CellCoord,
    position: Vec2,
    level: u32,
    facing: f32,
    state: ArmamentState,
}

impl Emplacement {
    /// Constructs an emplacement whose timers start at `now`.
    pub(crate) fn new(
        id: EmplacementId,
        kind: EmplacementKind,
        cell: CellCoord,
        position: Vec2,
        armament: Armament,
        now: Duration,
    ) -> Self {
        let state = match armament {
            Armament::Turret(stats) => ArmamentState::Turret {
                stats,
                last_fire: now,
            },
            Armament::Generator(stats) => ArmamentState::Generator {
                stats,
                last_payout: now,
            },
        };

        Self {
            id,
            kind,
            cell,
            position,
            level: 1,
            facing: 0.0,
            state,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn armament(&self) -> Armament {
        match self.state {
            ArmamentState::Turret { stats, .. } => Armament::Turret(stats),
            ArmamentState::Generator { stats, .. } => Armament::Generator(stats),
        }
    }

    /// Runs the emplacement's timer against the current actor view.
    ///
    /// Turrets fire once the fire interval has strictly elapsed and a target
    /// is in range; without a target the timer keeps running. Generators pay
    /// out once a full cycle has elapsed.
    pub(crate) fn tick(&mut self, actors: &ActorView, now: Duration) -> Option<EmplacementAction> {
        match &mut self.state {
            ArmamentState::Turret { stats, last_fire } => {
                if now.saturating_sub(*last_fire) <= stats.fire_interval() {
                    return None;
                }

                let target = find_target(stats.policy, self.position, stats.range, actors)?;
                let aim = target.position - self.position;
                self.facing = aim.y.atan2(aim.x);
                *last_fire = now;
                Some(EmplacementAction::Fire {
                    actor: target.id,
                    target: target.position,
                    damage: stats.damage,
                })
            }
            ArmamentState::Generator { stats, last_payout } => {
                if now.saturating_sub(*last_payout) < stats.interval() {
                    return None;
                }

                *last_payout = now;
                Some(EmplacementAction::Income {
                    amount: stats.income,
                })
            }
        }
    }

    /// Raises the level by one and applies the variant's stat scaling.
    ///
    /// Turrets only gain a level; generators pay more on a shorter cycle.
    pub(crate) fn upgrade(&mut self) {
        self.level = self.level.saturating_add(1);
        if let ArmamentState::Generator { stats, .. } = &mut self.state {
            *stats = stats.upgraded();
        }
    }

    pub(crate) fn snapshot(&self, upgrade_cost: u32) -> EmplacementSnapshot {
        EmplacementSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            cell: self.cell,
            level: self.level,
            facing: self.facing,
            armament: self.armament(),
            upgrade_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::ActorSnapshot;

    fn emplacement(kind: EmplacementKind) -> Emplacement {
        let config = GameConfig::default();
        let table = ArmamentTable::from_config(&config).expect("default table is complete");
        Emplacement::new(
            EmplacementId::new(0),
            kind,
            CellCoord::new(4, 6),
            Vec2::new(288.0, 416.0),
            table.get(kind),
            Duration::ZERO,
        )
    }

    fn actors_at(points: &[(u32, f32, f32, u32)]) -> ActorView {
        ActorView::from_snapshots(
            points
                .iter()
                .map(|&(id, x, y, health)| ActorSnapshot {
                    id: ActorId::new(id),
                    position: Vec2::new(x, y),
                    health,
                    max_health: health,
                    sprite: "basic_enemy".to_owned(),
                })
                .collect(),
        )
    }

    #[test]
    fn table_rejects_missing_variant() {
        let mut config = GameConfig::default();
        let _ = config.emplacements.remove(&EmplacementKind::Money);

        let error = ArmamentTable::from_config(&config).expect_err("money is missing");
        assert_eq!(
            error,
            ConfigError::MissingArmament {
                kind: EmplacementKind::Money
            }
        );
    }

    #[test]
    fn turret_waits_for_strictly_elapsed_interval() {
        let mut basic = emplacement(EmplacementKind::Basic);
        let actors = actors_at(&[(1, 388.0, 416.0, 100)]);

        assert_eq!(basic.tick(&actors, Duration::from_millis(1000)), None);
        let action = basic.tick(&actors, Duration::from_millis(1001));
        assert_eq!(
            action,
            Some(EmplacementAction::Fire {
                actor: ActorId::new(1),
                target: Vec2::new(388.0, 416.0),
                damage: 20,
            })
        );
        assert_eq!(basic.tick(&actors, Duration::from_millis(1500)), None);
    }

    #[test]
    fn turret_faces_its_target() {
        let mut basic = emplacement(EmplacementKind::Basic);
        let actors = actors_at(&[(1, 288.0, 516.0, 100)]);

        let _ = basic.tick(&actors, Duration::from_secs(2));
        let facing = basic.snapshot(100).facing;
        assert!((facing - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn turret_without_target_keeps_timer() {
        let mut basic = emplacement(EmplacementKind::Basic);
        let far = actors_at(&[(1, 1000.0, 100.0, 100)]);
        let near = actors_at(&[(1, 300.0, 416.0, 100)]);

        assert_eq!(basic.tick(&far, Duration::from_secs(2)), None);
        assert!(basic.tick(&near, Duration::from_millis(2016)).is_some());
    }

    #[test]
    fn sniper_targets_healthiest_actor() {
        let mut sniper = emplacement(EmplacementKind::Sniper);
        let actors = actors_at(&[
            (1, 300.0, 416.0, 30),
            (2, 400.0, 416.0, 90),
            (3, 500.0, 416.0, 60),
        ]);

        match sniper.tick(&actors, Duration::from_millis(2001)) {
            Some(EmplacementAction::Fire { actor, damage, .. }) => {
                assert_eq!(actor, ActorId::new(2));
                assert_eq!(damage, 40);
            }
            other => panic!("expected the sniper to fire, got {other:?}"),
        }
    }

    #[test]
    fn generator_pays_each_full_cycle_and_never_fires() {
        let mut money = emplacement(EmplacementKind::Money);
        let actors = actors_at(&[(1, 300.0, 416.0, 100)]);

        assert_eq!(money.tick(&actors, Duration::from_millis(4999)), None);
        assert_eq!(
            money.tick(&actors, Duration::from_millis(5000)),
            Some(EmplacementAction::Income { amount: 10 })
        );
        assert_eq!(money.tick(&actors, Duration::from_millis(9000)), None);
    }

    #[test]
    fn upgrades_scale_monotonically() {
        let mut money = emplacement(EmplacementKind::Money);
        money.upgrade();
        assert_eq!(money.level(), 2);
        assert_eq!(
            money.armament(),
            Armament::Generator(GeneratorStats {
                income: 15,
                interval_ms: 4500,
                income_step: 5,
                interval_step_ms: 500,
                interval_floor_ms: 1000,
            })
        );

        let mut basic = emplacement(EmplacementKind::Basic);
        let before = basic.armament();
        basic.upgrade();
        assert_eq!(basic.level(), 2);
        assert_eq!(basic.armament(), before);
    }
}
