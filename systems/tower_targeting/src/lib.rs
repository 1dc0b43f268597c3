#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects emplacement targets from actor snapshots.
//!
//! Selection is deterministic: candidates are visited in spawn order and a
//! candidate only replaces the current best when it is strictly better, so the
//! first actor seen wins every tie.

use glam::Vec2;
use path_defence_core::{
    ActorId, ActorSnapshot, ActorView, Armament, EmplacementId, EmplacementSnapshot, TargetPolicy,
};

/// Selects a target for a turret at `origin` according to `policy`.
///
/// Returns `None` when no actor lies within `range`; callers treat that as
/// "hold fire", never as an error.
#[must_use]
pub fn find_target(
    policy: TargetPolicy,
    origin: Vec2,
    range: f32,
    actors: &ActorView,
) -> Option<&ActorSnapshot> {
    match policy {
        TargetPolicy::Nearest => nearest_in_range(origin, range, actors),
        TargetPolicy::Healthiest => healthiest_in_range(origin, range, actors),
    }
}

/// Closest actor whose distance to `origin` does not exceed `range`.
#[must_use]
pub fn nearest_in_range(origin: Vec2, range: f32, actors: &ActorView) -> Option<&ActorSnapshot> {
    let mut best: Option<(&ActorSnapshot, f32)> = None;

    for actor in actors.iter() {
        let distance = origin.distance(actor.position);
        if distance > range {
            continue;
        }

        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((actor, distance)),
        }
    }

    best.map(|(actor, _)| actor)
}

/// Actor with the most remaining health among those within `range` of `origin`.
#[must_use]
pub fn healthiest_in_range(origin: Vec2, range: f32, actors: &ActorView) -> Option<&ActorSnapshot> {
    let mut best: Option<&ActorSnapshot> = None;
    let mut best_health = 0;

    for actor in actors.iter() {
        if origin.distance(actor.position) <= range && actor.health > best_health {
            best = Some(actor);
            best_health = actor.health;
        }
    }

    best
}

/// Current aim of a single turret, used to draw targeting lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Turret holding the target.
    pub emplacement: EmplacementId,
    /// Actor being tracked.
    pub actor: ActorId,
    /// Position of the turret.
    pub from: Vec2,
    /// Position of the tracked actor.
    pub to: Vec2,
}

/// Tower targeting system computing the aim of every turret for presentation.
#[derive(Debug, Default)]
pub struct TowerTargeting;

impl TowerTargeting {
    /// Creates a new tower targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes the target of every turret in `emplacements`.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Generators never appear in the output.
    pub fn handle(
        &self,
        emplacements: &[EmplacementSnapshot],
        actors: &ActorView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if actors.is_empty() {
            return;
        }

        for emplacement in emplacements {
            let Armament::Turret(stats) = emplacement.armament else {
                continue;
            };

            if let Some(actor) =
                find_target(stats.policy, emplacement.position, stats.range, actors)
            {
                out.push(TowerTarget {
                    emplacement: emplacement.id,
                    actor: actor.id,
                    from: emplacement.position,
                    to: actor.position,
                });
            }
        }
    }
}
