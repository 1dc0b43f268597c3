//! Rendering backend that runs the frame loop without opening a window.

use std::{
    thread,
    time::{Duration, Instant},
};

use anyhow::{ensure, Result};
use log::{info, warn};
use path_defence_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

use crate::plan::Plan;

/// Backend that runs the frame loop without a window.
///
/// Player input is replayed from a [`Plan`]; the final HUD is written to the
/// log once the loop stops.
#[derive(Debug)]
pub(crate) struct HeadlessBackend {
    frames: u64,
    frame_duration: Duration,
    realtime: bool,
    plan: Plan,
}

impl HeadlessBackend {
    /// Creates a backend that renders `frames` frames of `frame_duration` each.
    ///
    /// With `realtime` set, each frame sleeps until its slot has elapsed.
    #[must_use]
    pub(crate) fn new(frames: u64, frame_duration: Duration, realtime: bool, plan: Plan) -> Self {
        Self {
            frames,
            frame_duration,
            realtime,
            plan,
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static,
    {
        let Self {
            frames,
            frame_duration,
            realtime,
            mut plan,
        } = self;
        ensure!(!frame_duration.is_zero(), "frame duration must be positive");

        let Presentation {
            window_title,
            scene,
            ..
        } = presentation;
        let mut scene = scene;
        info!("{window_title}: running {frames} headless frames");

        let mut rendered = 0;
        for frame in 0..frames {
            let started = Instant::now();
            let input = plan.input_for(frame);
            rendered += 1;
            if !update_scene(frame_duration, input, &mut scene) {
                break;
            }

            if realtime {
                if let Some(remaining) = frame_duration.checked_sub(started.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }

        let unreplayed = plan.len();
        if unreplayed > 0 {
            warn!("{unreplayed} plan steps were never replayed");
        }

        let hud = scene.hud;
        info!(
            "after {rendered} frames: currency {}, lives {}, waves left {}, enemies left {}, {} emplacements",
            hud.currency,
            hud.lives,
            hud.waves_left,
            hud.enemies_left,
            scene.emplacements.len(),
        );
        if let Some(banner) = hud.banner() {
            info!("{banner}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{EmplacementKind, GameStatus};
    use path_defence_rendering::{Color, Hud};
    use std::{cell::RefCell, rc::Rc};

    fn presentation() -> Presentation {
        let hud = Hud {
            currency: 0,
            lives: 1,
            waves_left: 1,
            enemies_left: 0,
            selected: Some(EmplacementKind::Basic),
            status: GameStatus::Running,
            hover: None,
        };
        let scene = Scene::new(100.0, 100.0, Vec::new(), hud).expect("valid playfield");
        Presentation::new("test", Color::from_rgb_u8(0, 0, 0), scene)
    }

    #[test]
    fn replays_plan_steps_into_frame_inputs() {
        let seen: Rc<RefCell<Vec<FrameInput>>> = Rc::default();
        let recorder = Rc::clone(&seen);
        let plan = Plan::new(vec![
            "sniper@10,20@1".parse().expect("step parses"),
            "quit@3".parse().expect("step parses"),
        ]);

        HeadlessBackend::new(10, Duration::from_millis(16), false, plan)
            .run(presentation(), move |dt, input, _scene| {
                assert_eq!(dt, Duration::from_millis(16));
                let quit = input.quit;
                recorder.borrow_mut().push(input);
                !quit
            })
            .expect("loop runs");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4, "the loop stops on the frame that quits");
        assert_eq!(seen[1].select_variant.as_deref(), Some("sniper"));
        assert!(seen[3].quit);
    }

    #[test]
    fn zero_frame_duration_is_rejected() {
        let result = HeadlessBackend::new(1, Duration::ZERO, false, Plan::default())
            .run(presentation(), |_, _, _| true);
        assert!(result.is_err());
    }
}
