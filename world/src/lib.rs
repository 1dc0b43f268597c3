#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Path Defence.
//!
//! The world owns every live actor, emplacement and projectile together with
//! the placement grid, the wave director and the player's purse. It is only
//! mutated through [`apply`]; adapters and systems observe it through the
//! [`query`] module.

mod actors;
mod emplacements;
mod grid;
mod projectiles;
mod waves;

use std::{collections::BTreeMap, rc::Rc, time::Duration};

use glam::Vec2;
use log::{debug, info, warn};
use path_defence_core::{
    ActorId, ActorView, CellCoord, Command, ConfigError, EmplacementId, EmplacementKind, Event,
    GameConfig, GameStatus, ManagementError, PlacementError, ProjectileId, WELCOME_BANNER,
};

use actors::{Actor, Advance};
use emplacements::{ArmamentTable, Emplacement, EmplacementAction};
use grid::PlacementGrid;
use projectiles::Projectile;
use waves::{WaveDirector, WavePhase, WaveProgress};

/// Represents the authoritative Path Defence level state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    armaments: ArmamentTable,
    path: Rc<[Vec2]>,
    clock: Duration,
    currency: u32,
    lives: u32,
    status: GameStatus,
    director: WaveDirector,
    grid: PlacementGrid,
    actors: Vec<Actor>,
    emplacements: BTreeMap<EmplacementId, Emplacement>,
    projectiles: Vec<Projectile>,
    next_actor_id: u32,
    next_emplacement_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates a level from a configuration table.
    ///
    /// The table is validated once and kept immutable for the whole
    /// playthrough.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let armaments = ArmamentTable::from_config(&config)?;
        let path: Rc<[Vec2]> = config.path.clone().into();
        let director = WaveDirector::new(config.waves.clone(), config.spawn_delay());
        let grid = PlacementGrid::new(&config.lattice);

        info!(
            "level ready: {} waves, {} waypoints, {} currency, {} lives",
            director.wave_count(),
            path.len(),
            config.economy.starting_currency,
            config.starting_lives
        );

        Ok(Self {
            banner: WELCOME_BANNER,
            currency: config.economy.starting_currency,
            lives: config.starting_lives,
            status: GameStatus::Running,
            clock: Duration::ZERO,
            armaments,
            path,
            director,
            grid,
            actors: Vec::new(),
            emplacements: BTreeMap::new(),
            projectiles: Vec::new(),
            next_actor_id: 0,
            next_emplacement_id: 0,
            next_projectile_id: 0,
            config,
        })
    }

    fn actor_view(&self) -> ActorView {
        ActorView::from_snapshots(self.actors.iter().map(Actor::snapshot).collect())
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        self.spawn_due_actor(out_events);
        self.resolve_collisions(out_events);
        self.advance_actors(out_events);
        if self.status.is_over() {
            return;
        }
        self.tick_emplacements(out_events);
        self.advance_projectiles(out_events);
        self.progress_waves(out_events);
    }

    fn spawn_due_actor(&mut self, out_events: &mut Vec<Event>) {
        if self.director.phase() != WavePhase::Spawning {
            return;
        }

        let Some(order) = self.director.due_spawn(self.clock) else {
            return;
        };

        if order.index == 0 {
            info!("wave {} started", order.wave);
            out_events.push(Event::WaveStarted { wave: order.wave });
        }

        let id = ActorId::new(self.next_actor_id);
        self.next_actor_id += 1;
        let actor = Actor::spawn(id, Rc::clone(&self.path), &order.spec);
        debug!(
            "spawned actor {} ({}) in wave {}",
            id.get(),
            order.spec.sprite,
            order.wave
        );
        out_events.push(Event::ActorSpawned {
            actor: id,
            wave: order.wave,
            position: actor.position(),
        });
        self.actors.push(actor);
    }

    /// Each projectile damages the first overlapping actor and is consumed.
    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let actor_hitbox = self.config.actor_hitbox;
        let projectile_hitbox = self.config.projectiles.hitbox;
        let actors = &mut self.actors;

        self.projectiles.retain(|projectile| {
            let bounds = projectile.bounds(projectile_hitbox);
            let Some(actor) = actors
                .iter_mut()
                .find(|actor| actor.bounds(actor_hitbox).overlaps(&bounds))
            else {
                return true;
            };

            let remaining = actor.take_damage(projectile.damage());
            debug!(
                "projectile {} from emplacement {} hit actor {} ({} left)",
                projectile.id.get(),
                projectile.source.get(),
                actor.id.get(),
                remaining
            );
            out_events.push(Event::ActorHit {
                actor: actor.id,
                projectile: projectile.id,
                damage: projectile.damage(),
                remaining,
            });
            false
        });

        self.actors.retain(|actor| {
            if !actor.is_dead() {
                return true;
            }
            debug!("actor {} killed", actor.id.get());
            out_events.push(Event::ActorKilled { actor: actor.id });
            false
        });
    }

    fn advance_actors(&mut self, out_events: &mut Vec<Event>) {
        let mut leaked = Vec::new();
        self.actors.retain_mut(|actor| match actor.advance() {
            Advance::Moving => true,
            Advance::ReachedEnd => {
                leaked.push(actor.id);
                false
            }
        });

        if leaked.is_empty() {
            return;
        }

        for actor in leaked {
            self.lives = self.lives.saturating_sub(1);
            warn!("actor {} reached the end of the path", actor.get());
            out_events.push(Event::ActorLeaked {
                actor,
                lives: self.lives,
            });
        }

        if self.lives == 0 {
            info!("no lives left; level lost");
            self.status = GameStatus::Lost;
            out_events.push(Event::GameLost);
        }
    }

    fn tick_emplacements(&mut self, out_events: &mut Vec<Event>) {
        let view = self.actor_view();
        let now = self.clock;

        for emplacement in self.emplacements.values_mut() {
            match emplacement.tick(&view, now) {
                None => {}
                Some(EmplacementAction::Fire {
                    actor,
                    target,
                    damage,
                }) => {
                    let id = ProjectileId::new(self.next_projectile_id);
                    self.next_projectile_id += 1;
                    debug!(
                        "emplacement {} fired projectile {} at actor {}",
                        emplacement.id.get(),
                        id.get(),
                        actor.get()
                    );
                    self.projectiles.push(Projectile::fire(
                        id,
                        emplacement.id,
                        emplacement.position(),
                        target,
                        self.config.projectiles.speed,
                        damage,
                    ));
                    out_events.push(Event::ProjectileFired {
                        projectile: id,
                        emplacement: emplacement.id,
                        actor,
                        target,
                    });
                }
                Some(EmplacementAction::Income { amount }) => {
                    self.currency = self.currency.saturating_add(amount);
                    debug!(
                        "emplacement {} generated {} currency",
                        emplacement.id.get(),
                        amount
                    );
                    out_events.push(Event::IncomeGenerated {
                        emplacement: emplacement.id,
                        amount,
                    });
                }
            }
        }
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let playfield = self.config.playfield;
        let arrival_radius = self.config.projectiles.arrival_radius;

        self.projectiles.retain_mut(|projectile| {
            if !projectile.advance(&playfield, arrival_radius) {
                return true;
            }
            out_events.push(Event::ProjectileExpired {
                projectile: projectile.id,
            });
            false
        });
    }

    fn progress_waves(&mut self, out_events: &mut Vec<Event>) {
        match self.director.advance_if_cleared(self.actors.len()) {
            WaveProgress::Pending => {}
            WaveProgress::Advanced { cleared, next } => {
                info!("wave {cleared} cleared; wave {next} queued");
                out_events.push(Event::WaveCleared { wave: cleared });
            }
            WaveProgress::Completed { cleared } => {
                info!("final wave {cleared} cleared; level won");
                self.status = GameStatus::Won;
                out_events.push(Event::WaveCleared { wave: cleared });
                out_events.push(Event::AllWavesComplete);
            }
        }
    }

    fn place(
        &mut self,
        kind: EmplacementKind,
        point: Vec2,
    ) -> Result<(EmplacementId, CellCoord, Vec2), PlacementError> {
        if self.status.is_over() {
            return Err(PlacementError::GameOver);
        }

        let cost = self.config.economy.placement_cost;
        if self.currency < cost {
            return Err(PlacementError::InsufficientFunds);
        }

        let center = self.grid.grid_position_for(point);
        let id = EmplacementId::new(self.next_emplacement_id);
        let cell = self.grid.place(id, center)?;
        self.next_emplacement_id += 1;
        self.currency -= cost;

        let emplacement = Emplacement::new(
            id,
            kind,
            cell,
            center,
            self.armaments.get(kind),
            self.clock,
        );
        let _ = self.emplacements.insert(id, emplacement);
        Ok((id, cell, center))
    }

    fn upgrade(&mut self, id: EmplacementId) -> Result<(u32, u32), ManagementError> {
        if self.status.is_over() {
            return Err(ManagementError::GameOver);
        }

        let economy = self.config.economy;
        let emplacement = self
            .emplacements
            .get_mut(&id)
            .ok_or(ManagementError::MissingEmplacement)?;
        let cost = economy.upgrade_cost(emplacement.level());
        if self.currency < cost {
            return Err(ManagementError::InsufficientFunds);
        }

        self.currency -= cost;
        emplacement.upgrade();
        Ok((emplacement.level(), cost))
    }

    fn sell(&mut self, id: EmplacementId) -> Result<u32, ManagementError> {
        if self.status.is_over() {
            return Err(ManagementError::GameOver);
        }

        let emplacement = self
            .emplacements
            .remove(&id)
            .ok_or(ManagementError::MissingEmplacement)?;
        self.grid.remove(emplacement.id);

        let refund = self.config.economy.sell_refund();
        self.currency = self.currency.saturating_add(refund);
        info!(
            "sold {} emplacement {} at cell ({}, {})",
            emplacement.kind,
            id.get(),
            emplacement.cell.column(),
            emplacement.cell.row()
        );
        Ok(refund)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            if !world.status.is_over() {
                world.step(out_events);
            }
        }
        Command::PlaceEmplacement { kind, point } => match world.place(kind, point) {
            Ok((emplacement, cell, position)) => {
                info!(
                    "placed {kind} emplacement {} at cell ({}, {})",
                    emplacement.get(),
                    cell.column(),
                    cell.row()
                );
                out_events.push(Event::EmplacementPlaced {
                    emplacement,
                    kind,
                    cell,
                    position,
                });
            }
            Err(reason) => {
                warn!(
                    "rejected {kind} placement at ({}, {}): {reason}",
                    point.x, point.y
                );
                out_events.push(Event::PlacementRejected {
                    kind,
                    point,
                    reason,
                });
            }
        },
        Command::UpgradeEmplacement { emplacement } => match world.upgrade(emplacement) {
            Ok((level, cost)) => {
                info!(
                    "upgraded emplacement {} to level {level} for {cost}",
                    emplacement.get()
                );
                out_events.push(Event::EmplacementUpgraded {
                    emplacement,
                    level,
                    cost,
                });
            }
            Err(reason) => {
                warn!("rejected upgrade of emplacement {}: {reason}", emplacement.get());
                out_events.push(Event::ManagementRejected {
                    emplacement,
                    reason,
                });
            }
        },
        Command::SellEmplacement { emplacement } => match world.sell(emplacement) {
            Ok(refund) => out_events.push(Event::EmplacementSold {
                emplacement,
                refund,
            }),
            Err(reason) => {
                warn!("rejected sale of emplacement {}: {reason}", emplacement.get());
                out_events.push(Event::ManagementRejected {
                    emplacement,
                    reason,
                });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use glam::Vec2;
    use path_defence_core::{
        ActorView, EmplacementId, EmplacementSnapshot, GameConfig, GameStatus, ProjectileSnapshot,
        SlotSnapshot,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the level was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Simulated time elapsed since the level started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Currency currently available to the player.
    #[must_use]
    pub fn currency(world: &World) -> u32 {
        world.currency
    }

    /// Lives left before the level is lost.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Overall outcome of the level so far.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Zero-based index of the wave currently being fought.
    #[must_use]
    pub fn current_wave(world: &World) -> usize {
        world.director.current_wave()
    }

    /// Number of waves configured for the level.
    #[must_use]
    pub fn wave_count(world: &World) -> usize {
        world.director.wave_count()
    }

    /// Waves not yet cleared, the current one included.
    #[must_use]
    pub fn waves_left(world: &World) -> usize {
        world.director.waves_left()
    }

    /// Number of live actors on the field.
    #[must_use]
    pub fn enemies_left(world: &World) -> usize {
        world.actors.len()
    }

    /// Captures a read-only view of the live actors in spawn order.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        world.actor_view()
    }

    /// Snapshots of every placed emplacement in placement order.
    #[must_use]
    pub fn emplacement_view(world: &World) -> Vec<EmplacementSnapshot> {
        let economy = world.config.economy;
        world
            .emplacements
            .values()
            .map(|emplacement| emplacement.snapshot(economy.upgrade_cost(emplacement.level())))
            .collect()
    }

    /// Snapshot of a single emplacement, if it exists.
    #[must_use]
    pub fn emplacement(world: &World, id: EmplacementId) -> Option<EmplacementSnapshot> {
        let economy = world.config.economy;
        world
            .emplacements
            .get(&id)
            .map(|emplacement| emplacement.snapshot(economy.upgrade_cost(emplacement.level())))
    }

    /// Emplacement occupying the lattice cell under `point`, if any.
    #[must_use]
    pub fn emplacement_at(world: &World, point: Vec2) -> Option<EmplacementId> {
        world
            .grid
            .cell_for(point)
            .and_then(|cell| world.grid.occupant(cell))
    }

    /// Snapshots of every projectile in flight, in firing order.
    #[must_use]
    pub fn projectile_view(world: &World) -> Vec<ProjectileSnapshot> {
        world.projectiles.iter().map(|projectile| projectile.snapshot()).collect()
    }

    /// Every legal emplacement slot with its occupant.
    #[must_use]
    pub fn slots(world: &World) -> Vec<SlotSnapshot> {
        world.grid.slots()
    }

    /// Snaps a screen point to the centre of its lattice cell.
    #[must_use]
    pub fn grid_position_for(world: &World, point: Vec2) -> Vec2 {
        world.grid.grid_position_for(point)
    }

    /// Reports whether `center` is a free legal slot.
    #[must_use]
    pub fn is_slot_available(world: &World, center: Vec2) -> bool {
        world.grid.is_slot_available(center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(world: &mut World, events: &mut Vec<Event>) {
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            events,
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut config = GameConfig::default();
        config.waves.clear();
        assert_eq!(World::new(config).err(), Some(ConfigError::NoWaves));
    }

    #[test]
    fn rejects_non_finite_waypoints() {
        let mut config = GameConfig::default();
        config.path[1] = Vec2::new(f32::NAN, 400.0);
        assert_eq!(
            World::new(config).err(),
            Some(ConfigError::InvalidWaypoint { index: 1 })
        );
    }

    #[test]
    fn first_tick_spawns_first_actor_of_first_wave() {
        let mut world = World::new(GameConfig::default()).expect("default config is valid");
        let mut events = Vec::new();

        tick(&mut world, &mut events);

        assert_eq!(
            &events[..3],
            &[
                Event::TimeAdvanced {
                    dt: Duration::from_millis(100)
                },
                Event::WaveStarted { wave: 0 },
                Event::ActorSpawned {
                    actor: ActorId::new(0),
                    wave: 0,
                    position: Vec2::new(50.0, 400.0),
                },
            ]
        );
        assert_eq!(query::enemies_left(&world), 1);
        assert_eq!(
            query::actor_view(&world).iter().next().map(|actor| actor.position),
            Some(Vec2::new(51.0, 400.0))
        );
    }

    #[test]
    fn collisions_consume_projectile_once() {
        let mut world = World::new(GameConfig::default()).expect("default config is valid");
        let mut events = Vec::new();
        tick(&mut world, &mut events);

        let position = world.actors[0].position();
        for id in 0..2 {
            world.projectiles.push(Projectile::fire(
                ProjectileId::new(id),
                EmplacementId::new(0),
                position,
                position + Vec2::new(100.0, 0.0),
                5.0,
                30,
            ));
        }

        events.clear();
        world.resolve_collisions(&mut events);

        assert!(world.projectiles.is_empty());
        assert_eq!(world.actors[0].snapshot().health, 40);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::ActorHit { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn overlapping_actors_share_one_projectile() {
        let mut world = World::new(GameConfig::default()).expect("default config is valid");
        let mut events = Vec::new();
        tick(&mut world, &mut events);

        let spawn = world.actors[0].clone();
        let mut twin = spawn.clone();
        twin.id = ActorId::new(99);
        world.actors.push(twin);

        world.projectiles.push(Projectile::fire(
            ProjectileId::new(0),
            EmplacementId::new(0),
            spawn.position(),
            spawn.position() + Vec2::new(0.0, 100.0),
            5.0,
            100,
        ));

        events.clear();
        world.resolve_collisions(&mut events);

        assert_eq!(
            events,
            vec![
                Event::ActorHit {
                    actor: spawn.id,
                    projectile: ProjectileId::new(0),
                    damage: 100,
                    remaining: 0,
                },
                Event::ActorKilled { actor: spawn.id },
            ]
        );
        assert_eq!(world.actors.len(), 1);
        assert_eq!(world.actors[0].id, ActorId::new(99));
    }

    #[test]
    fn lethal_damage_takes_priority_over_reaching_the_end() {
        let config = GameConfig {
            path: vec![Vec2::new(50.0, 400.0), Vec2::new(52.0, 400.0)],
            waves: vec![path_defence_core::WaveSpec::uniform(
                1,
                path_defence_core::ActorSpec::new(1.0, 100, "basic_enemy"),
            )],
            ..GameConfig::default()
        };
        let mut world = World::new(config).expect("config is valid");
        let mut events = Vec::new();
        tick(&mut world, &mut events);

        let position = world.actors[0].position();
        world.projectiles.push(Projectile::fire(
            ProjectileId::new(0),
            EmplacementId::new(0),
            position,
            position + Vec2::new(0.0, 300.0),
            5.0,
            100,
        ));

        events.clear();
        tick(&mut world, &mut events);

        assert!(events.contains(&Event::ActorKilled {
            actor: ActorId::new(0)
        }));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::ActorLeaked { .. })));
        assert_eq!(world.lives, 1);
        assert_eq!(world.status, GameStatus::Won);
        assert_eq!(events.last(), Some(&Event::AllWavesComplete));
    }
}
