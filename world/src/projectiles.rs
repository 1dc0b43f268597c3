//! Projectiles flying toward a fixed aim point.

use glam::Vec2;
use path_defence_core::{EmplacementId, Extent, Playfield, ProjectileId, ProjectileSnapshot, Rect};

/// In-flight shot owned by the world.
///
/// The aim point is captured when the shot is fired and never follows the
/// targeted actor afterwards.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) source: EmplacementId,
    position: Vec2,
    target: Vec2,
    velocity: Vec2,
    damage: u32,
}

impl Projectile {
    /// Fires a projectile from `origin` toward `target`.
    ///
    /// A shot fired at its own origin gets a zero velocity and expires on its
    /// first advance.
    pub(crate) fn fire(
        id: ProjectileId,
        source: EmplacementId,
        origin: Vec2,
        target: Vec2,
        speed: f32,
        damage: u32,
    ) -> Self {
        Self {
            id,
            source,
            position: origin,
            target,
            velocity: (target - origin).normalize_or_zero() * speed,
            damage,
        }
    }

    pub(crate) fn damage(&self) -> u32 {
        self.damage
    }

    /// Moves the projectile one tick and reports whether it expired.
    pub(crate) fn advance(&mut self, playfield: &Playfield, arrival_radius: f32) -> bool {
        self.position += self.velocity;
        self.position.distance(self.target) < arrival_radius || !playfield.contains(self.position)
    }

    pub(crate) fn bounds(&self, hitbox: Extent) -> Rect {
        Rect::centered(self.position, hitbox)
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            damage: self.damage,
        }
    }
}
