//! Conversion of world queries into the drawable scene.

use glam::Vec2;
use path_defence_rendering::{
    HoverStats, Hud, RenderingError, Scene, SceneActor, SceneEmplacement, SceneProjectile,
    SlotMarker, TargetLine,
};
use path_defence_system_builder::Builder;
use path_defence_system_tower_targeting::{TowerTarget, TowerTargeting};
use path_defence_world::{query, World};

/// Creates the scene shown before the first frame is simulated.
pub(crate) fn initial(world: &World, builder: &Builder) -> Result<Scene, RenderingError> {
    let config = query::config(world);
    let mut scene = Scene::new(
        config.playfield.width,
        config.playfield.height,
        config.path.clone(),
        hud(world, builder, None),
    )?;
    refresh(world, builder, &TowerTargeting::new(), None, &mut scene);
    Ok(scene)
}

/// Rebuilds every dynamic part of the scene from the world's current state.
pub(crate) fn refresh(
    world: &World,
    builder: &Builder,
    targeting: &TowerTargeting,
    hover: Option<Vec2>,
    scene: &mut Scene,
) {
    let actors = query::actor_view(world);
    let emplacements = query::emplacement_view(world);

    scene.actors = actors
        .iter()
        .map(|actor| SceneActor {
            id: actor.id,
            position: actor.position,
            sprite: actor.sprite.clone(),
            health_fraction: actor.health as f32 / actor.max_health.max(1) as f32,
        })
        .collect();

    scene.emplacements = emplacements
        .iter()
        .map(SceneEmplacement::from_snapshot)
        .collect();

    scene.projectiles = query::projectile_view(world)
        .into_iter()
        .map(|projectile| SceneProjectile {
            id: projectile.id,
            position: projectile.position,
        })
        .collect();

    let mut aims: Vec<TowerTarget> = Vec::new();
    targeting.handle(&emplacements, &actors, &mut aims);
    scene.target_lines = aims
        .into_iter()
        .map(|aim| TargetLine {
            emplacement: aim.emplacement,
            actor: aim.actor,
            from: aim.from,
            to: aim.to,
        })
        .collect();

    scene.slots = builder.overlay_visible().then(|| {
        let size = query::config(world).lattice.cell_size;
        query::slots(world)
            .into_iter()
            .map(|slot| SlotMarker {
                center: slot.center,
                size,
                occupied: slot.occupant.is_some(),
            })
            .collect()
    });

    scene.hud = hud(world, builder, hover);
}

fn hud(world: &World, builder: &Builder, hover: Option<Vec2>) -> Hud {
    let hover = hover
        .and_then(|point| query::emplacement_at(world, point))
        .and_then(|id| query::emplacement(world, id))
        .map(|snapshot| HoverStats::from_snapshot(&snapshot));

    Hud {
        currency: query::currency(world),
        lives: query::lives(world),
        waves_left: query::waves_left(world),
        enemies_left: query::enemies_left(world),
        selected: builder.selected(),
        status: query::status(world),
        hover,
    }
}
