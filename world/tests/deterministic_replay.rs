use std::time::Duration;

use glam::Vec2;
use path_defence_core::{Command, EmplacementKind, Event, GameConfig};
use path_defence_system_tower_targeting::{TowerTarget, TowerTargeting};
use path_defence_world::{self as world, query, World};

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Vec<Event>>,
    aims: Vec<Vec<TowerTarget>>,
    currency: u32,
    lives: u32,
}

fn scripted_commands() -> Vec<Command> {
    let frame = Duration::from_secs(1) / 60;
    let mut commands = vec![
        Command::PlaceEmplacement {
            kind: EmplacementKind::Basic,
            point: Vec2::new(96.0, 352.0),
        },
        Command::PlaceEmplacement {
            kind: EmplacementKind::Sniper,
            point: Vec2::new(352.0, 288.0),
        },
        Command::PlaceEmplacement {
            kind: EmplacementKind::Money,
            point: Vec2::new(800.0, 500.0),
        },
    ];

    for index in 0..1_800 {
        commands.push(Command::Tick { dt: frame });
        if index == 600 {
            commands.push(Command::PlaceEmplacement {
                kind: EmplacementKind::Basic,
                point: Vec2::new(544.0, 288.0),
            });
        }
    }

    commands
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(GameConfig::default()).expect("default config is valid");
    let targeting = TowerTargeting::new();
    let mut events = Vec::new();
    let mut aims = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated);

        let mut current = Vec::new();
        targeting.handle(
            &query::emplacement_view(&world),
            &query::actor_view(&world),
            &mut current,
        );

        for event in &generated {
            if let Event::ProjectileFired {
                emplacement, actor, ..
            } = event
            {
                let aim = current
                    .iter()
                    .find(|aim| aim.emplacement == *emplacement)
                    .expect("firing turret has an aim");
                assert_eq!(aim.actor, *actor, "shot and aim disagree");
            }
        }

        events.push(generated);
        aims.push(current);
    }

    ReplayOutcome {
        events,
        aims,
        currency: query::currency(&world),
        lives: query::lives(&world),
    }
}

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");

    let shots = first
        .events
        .iter()
        .flatten()
        .filter(|event| matches!(event, Event::ProjectileFired { .. }))
        .count();
    assert!(shots > 0, "turrets never fired");

    let payouts = first
        .events
        .iter()
        .flatten()
        .filter(|event| matches!(event, Event::IncomeGenerated { .. }))
        .count();
    assert!(payouts >= 5, "thirty seconds of play pays at least five cycles");

    let placements = first
        .events
        .iter()
        .flatten()
        .filter(|event| matches!(event, Event::EmplacementPlaced { .. }))
        .count();
    assert_eq!(placements, 4);
}
