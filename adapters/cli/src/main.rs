#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Path Defence level without a window.

mod audio;
mod headless;
mod plan;
mod scene;

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use path_defence_core::{Command, Event, GameConfig};
use path_defence_rendering::{
    play_cues, Color, FrameInput, Presentation, RenderingBackend, Scene,
};
use path_defence_system_builder::{Builder, BuilderInput};
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, World};

use crate::{
    audio::LoggingSink,
    headless::HeadlessBackend,
    plan::{Plan, PlanStep},
};

/// Command-line arguments accepted by the headless runner.
#[derive(Debug, Parser)]
#[command(name = "path-defence", version, about = "Runs a Path Defence level headlessly")]
struct Args {
    /// TOML file overriding the default level configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 7_200)]
    frames: u64,
    /// Simulation rate of the fixed-step loop.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
    /// Sleep between frames so the run follows the wall clock.
    #[arg(long)]
    realtime: bool,
    /// Scripted player step such as `sniper@352,288@120`, `upgrade@96,352@600`,
    /// `sell@96,352`, `overlay` or `quit@900`; replaces the opening layout.
    #[arg(long = "step", value_name = "STEP")]
    steps: Vec<PlanStep>,
}

/// Entry point for the Path Defence command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let world = World::new(config).context("level configuration is invalid")?;
    println!("{}", query::welcome_banner(&world));

    let builder = Builder::new();
    let scene = scene::initial(&world, &builder).context("level cannot be presented")?;
    let presentation = Presentation::new("Path Defence", Color::from_rgb_u8(34, 51, 34), scene);

    let plan = if args.steps.is_empty() {
        Plan::opening()
    } else {
        Plan::new(args.steps)
    };
    let frame_duration = Duration::from_secs(1) / args.fps;
    let backend = HeadlessBackend::new(args.frames, frame_duration, args.realtime, plan);

    let sink = Rc::new(RefCell::new(LoggingSink::default()));
    backend.run(presentation, frame_loop(world, builder, Rc::clone(&sink)))?;
    sink.borrow().report();
    Ok(())
}

/// Reads the level configuration, falling back to the built-in level.
fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("failed to parse configuration {}", path.display()))?;
    info!("loaded level configuration from {}", path.display());
    Ok(config)
}

fn parse_config(contents: &str) -> Result<GameConfig> {
    let config: GameConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Builds the per-frame callback: input to commands, one tick, cues, scene.
fn frame_loop(
    mut world: World,
    mut builder: Builder,
    sink: Rc<RefCell<LoggingSink>>,
) -> impl FnMut(Duration, FrameInput, &mut Scene) -> bool {
    let targeting = TowerTargeting::new();
    let mut events: Vec<Event> = Vec::new();
    let mut commands: Vec<Command> = Vec::new();
    let mut status = query::status(&world);

    move |dt, input, scene| {
        commands.clear();
        builder.handle(
            &events,
            BuilderInput {
                select_variant: input.select_variant.as_deref(),
                place_at: input.place_at,
                upgrade_at: input.upgrade_at,
                sell_at: input.sell_at,
                toggle_grid_overlay: input.toggle_grid_overlay,
                quit: input.quit,
            },
            |point| query::emplacement_at(&world, point),
            &mut commands,
        );
        commands.push(Command::Tick { dt });

        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        for event in &events {
            if !matches!(event, Event::TimeAdvanced { .. }) {
                debug!("{event:?}");
            }
        }
        play_cues(&events, &mut *sink.borrow_mut());

        let current = query::status(&world);
        if current != status {
            info!(
                "level ended {current:?} after {:.1}s",
                query::clock(&world).as_secs_f32()
            );
            status = current;
        }

        scene::refresh(&world, &builder, &targeting, input.hover, scene);
        !builder.quit_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::ConfigError;

    #[test]
    fn arguments_parse_steps_and_defaults() {
        let args = Args::try_parse_from([
            "path-defence",
            "--frames",
            "120",
            "--step",
            "money@800,500",
            "--step",
            "quit@60",
        ])
        .expect("arguments parse");

        assert_eq!(args.frames, 120);
        assert_eq!(args.fps, 60);
        assert!(!args.realtime);
        assert!(args.config.is_none());
        assert_eq!(args.steps.len(), 2);
        assert_eq!(args.steps[1].frame, 60);
    }

    #[test]
    fn malformed_steps_and_zero_rates_are_rejected() {
        assert!(Args::try_parse_from(["path-defence", "--step", "basic@1"]).is_err());
        assert!(Args::try_parse_from(["path-defence", "--fps", "0"]).is_err());
    }

    #[test]
    fn partial_configuration_keeps_defaults() {
        let config = parse_config("starting_lives = 3\nspawn_delay_ms = 500\n")
            .expect("partial configuration parses");

        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.spawn_delay(), Duration::from_millis(500));
        assert_eq!(config.path, GameConfig::default().path);
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let error = parse_config("path = []\n").expect_err("an empty path is unusable");
        assert!(error.downcast_ref::<ConfigError>().is_some());

        assert!(parse_config("starting_lives = \"many\"\n").is_err());
    }

    #[test]
    fn missing_configuration_falls_back_to_the_default_level() {
        let config = load_config(None).expect("default configuration");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn frame_loop_places_and_ticks() {
        let world = World::new(GameConfig::default()).expect("default config is valid");
        let builder = Builder::new();
        let mut scene = scene::initial(&world, &builder).expect("default playfield is valid");
        let sink = Rc::new(RefCell::new(LoggingSink::default()));
        let mut update = frame_loop(world, builder, Rc::clone(&sink));

        let mut plan = Plan::opening();
        let frame = Duration::from_secs(1) / 60;
        for index in 0..5 {
            assert!(update(frame, plan.input_for(index), &mut scene));
        }

        assert_eq!(scene.emplacements.len(), 3, "three opening placements landed");
        assert!(scene.slots.is_some(), "the opening plan shows the overlay");
        assert_eq!(scene.actors.len(), 1);
        assert_eq!(scene.hud.currency, 200);
    }
}
