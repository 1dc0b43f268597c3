//! Actors walking the level path.

use std::rc::Rc;

use glam::Vec2;
use path_defence_core::{ActorId, ActorSnapshot, ActorSpec, Extent, Rect};

/// Outcome of advancing an actor by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// The actor is still walking the path.
    Moving,
    /// The actor arrived at the final waypoint.
    ReachedEnd,
}

/// Live actor owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    position: Vec2,
    path: Rc<[Vec2]>,
    path_index: usize,
    speed: f32,
    health: u32,
    max_health: u32,
    sprite: String,
}

impl Actor {
    /// Places a freshly spawned actor on the first waypoint of `path`.
    pub(crate) fn spawn(id: ActorId, path: Rc<[Vec2]>, spec: &ActorSpec) -> Self {
        debug_assert!(path.len() >= 2, "paths are validated to hold two waypoints");
        let position = path.first().copied().unwrap_or(Vec2::ZERO);
        Self {
            id,
            position,
            path,
            path_index: 0,
            speed: spec.speed,
            health: spec.health,
            max_health: spec.health,
            sprite: spec.sprite.clone(),
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Moves the actor `speed` units along the path.
    ///
    /// Distance left over after snapping onto a waypoint is carried into the
    /// next segment, so the travelled distance always equals the path length
    /// walked so far.
    pub(crate) fn advance(&mut self) -> Advance {
        let mut budget = self.speed;

        loop {
            let Some(&next) = self.path.get(self.path_index + 1) else {
                return Advance::ReachedEnd;
            };

            let remaining = self.position.distance(next);
            if remaining <= budget {
                self.position = next;
                self.path_index += 1;
                budget -= remaining;
                if self.path_index + 1 >= self.path.len() {
                    return Advance::ReachedEnd;
                }
                continue;
            }

            let direction = (next - self.position).normalize_or_zero();
            self.position += direction * budget;
            return Advance::Moving;
        }
    }

    /// Applies damage and returns the remaining health.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub(crate) fn bounds(&self, hitbox: Extent) -> Rect {
        Rect::centered(self.position, hitbox)
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            sprite: self.sprite.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn polyline_length(points: &[Vec2]) -> f32 {
        points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
    }

    fn actor(points: &[(f32, f32)], speed: f32) -> Actor {
        let path: Rc<[Vec2]> = points
            .iter()
            .map(|&(x, y)| Vec2::new(x, y))
            .collect::<Vec<_>>()
            .into();
        Actor::spawn(ActorId::new(0), path, &ActorSpec::new(speed, 100, "basic_enemy"))
    }

    #[test]
    fn spawns_on_first_waypoint() {
        let actor = actor(&[(50.0, 400.0), (300.0, 400.0)], 1.0);
        assert_eq!(actor.position(), Vec2::new(50.0, 400.0));
        assert_eq!(actor.path_index, 0);
    }

    #[test]
    fn carries_leftover_distance_around_corners() {
        let mut actor = actor(&[(0.0, 0.0), (3.0, 0.0), (3.0, 10.0)], 4.0);

        assert_eq!(actor.advance(), Advance::Moving);
        assert_eq!(actor.path_index, 1);
        assert!((actor.position().x - 3.0).abs() < 1e-6);
        assert!((actor.position().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn reports_end_of_path() {
        let mut actor = actor(&[(0.0, 0.0), (10.0, 0.0)], 4.0);

        assert_eq!(actor.advance(), Advance::Moving);
        assert_eq!(actor.advance(), Advance::Moving);
        assert_eq!(actor.advance(), Advance::ReachedEnd);
        assert_eq!(actor.position(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn duplicate_waypoints_do_not_stall() {
        let mut actor = actor(&[(0.0, 0.0), (0.0, 0.0), (2.0, 0.0)], 1.0);

        assert_eq!(actor.advance(), Advance::Moving);
        assert_eq!(actor.position(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn damage_saturates_at_zero() {
        let mut actor = actor(&[(0.0, 0.0), (10.0, 0.0)], 1.0);

        assert_eq!(actor.take_damage(40), 60);
        assert!(!actor.is_dead());
        assert_eq!(actor.take_damage(80), 0);
        assert!(actor.is_dead());
    }

    fn waypoints() -> impl Strategy<Value = Vec<(f32, f32)>> {
        prop::collection::vec((0.0f32..1200.0, 0.0f32..800.0), 2..8)
    }

    proptest! {
        #[test]
        fn traversal_distance_matches_polyline_length(
            points in waypoints(),
            speed in 0.5f32..20.0,
        ) {
            let mut actor = actor(&points, speed);
            let polyline: Vec<Vec2> = points.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let length = polyline_length(&polyline);

            let tolerance = 1e-3 * length.max(1.0);
            let mut previous_index = 0;
            let mut steps = 0u32;
            let limit = (length / speed).ceil() as u32 + 2;

            loop {
                let before = actor.position();
                let outcome = actor.advance();
                prop_assert!(actor.path_index >= previous_index);
                previous_index = actor.path_index;
                prop_assert!(before.distance(actor.position()) <= speed + tolerance);
                steps += 1;

                if outcome == Advance::ReachedEnd {
                    break;
                }
                prop_assert!(steps <= limit);
            }

            // Every tick but the last consumes the full speed budget.
            prop_assert!(steps as f32 * speed >= length - tolerance);
            prop_assert!((steps - 1) as f32 * speed <= length + tolerance);
            prop_assert_eq!(actor.position(), *polyline.last().expect("non-empty"));
        }
    }
}
