//! Scripted input plans that drive headless runs frame by frame.

use std::{collections::VecDeque, error::Error, fmt, num::ParseIntError, str::FromStr};

use glam::Vec2;
use path_defence_rendering::FrameInput;

/// Delimiter separating the action, the point and the frame of a step.
const FIELD_DELIMITER: char = '@';

/// Player action replayed by the headless loop.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PlanAction {
    /// Select the variant tag and place it at the point.
    Place {
        /// Variant tag forwarded to the builder untouched.
        variant: String,
        /// Point clicked on the playfield.
        point: Vec2,
    },
    /// Upgrade whatever stands at the point.
    Upgrade(Vec2),
    /// Sell whatever stands at the point.
    Sell(Vec2),
    /// Flip the legal-slot overlay.
    ToggleOverlay,
    /// Leave the loop.
    Quit,
}

/// Single scripted action and the frame it becomes due on.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlanStep {
    /// Frame index on which the step is replayed, counted from zero.
    pub(crate) frame: u64,
    /// Action replayed on that frame.
    pub(crate) action: PlanAction,
}

impl FromStr for PlanStep {
    type Err = PlanError;

    /// Parses `<variant>@<x>,<y>[@<frame>]`, `upgrade@<x>,<y>[@<frame>]`,
    /// `sell@<x>,<y>[@<frame>]`, `overlay[@<frame>]` or `quit[@<frame>]`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut fields = trimmed.split(FIELD_DELIMITER);
        let action = fields.next().unwrap_or_default().trim();
        if action.is_empty() {
            return Err(PlanError::MissingAction(trimmed.to_owned()));
        }

        let (action, frame) = match action.to_ascii_lowercase().as_str() {
            "overlay" => (PlanAction::ToggleOverlay, parse_frame(fields.next())?),
            "quit" => (PlanAction::Quit, parse_frame(fields.next())?),
            keyword => {
                let point = fields
                    .next()
                    .ok_or_else(|| PlanError::MissingPoint(trimmed.to_owned()))
                    .and_then(parse_point)?;
                let frame = parse_frame(fields.next())?;
                let action = match keyword {
                    "upgrade" => PlanAction::Upgrade(point),
                    "sell" => PlanAction::Sell(point),
                    _ => PlanAction::Place {
                        variant: action.to_owned(),
                        point,
                    },
                };
                (action, frame)
            }
        };

        if fields.next().is_some() {
            return Err(PlanError::TrailingFields(trimmed.to_owned()));
        }

        Ok(Self { frame, action })
    }
}

fn parse_point(point: &str) -> Result<Vec2, PlanError> {
    let invalid = || PlanError::InvalidPoint(point.to_owned());
    let (x, y) = point.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<f32>().map_err(|_| invalid())?;
    let y = y.trim().parse::<f32>().map_err(|_| invalid())?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(invalid());
    }
    Ok(Vec2::new(x, y))
}

fn parse_frame(frame: Option<&str>) -> Result<u64, PlanError> {
    match frame {
        None => Ok(0),
        Some(frame) => frame
            .trim()
            .parse::<u64>()
            .map_err(|error| PlanError::InvalidFrame(frame.to_owned(), error)),
    }
}

/// Ordered queue of scripted steps feeding the headless backend.
///
/// At most one step is replayed per frame; steps sharing a frame spill over
/// onto the following frames in the order they were given.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Plan {
    pending: VecDeque<PlanStep>,
}

impl Plan {
    /// Creates a plan from steps in any order.
    #[must_use]
    pub(crate) fn new(mut steps: Vec<PlanStep>) -> Self {
        steps.sort_by_key(|step| step.frame);
        Self {
            pending: steps.into(),
        }
    }

    /// Layout played when no steps are provided on the command line.
    #[must_use]
    pub(crate) fn opening() -> Self {
        let step = |frame, action| PlanStep { frame, action };
        let place = |variant: &str, x, y| PlanAction::Place {
            variant: variant.to_owned(),
            point: Vec2::new(x, y),
        };

        Self::new(vec![
            step(0, place("basic", 96.0, 352.0)),
            step(0, place("sniper", 352.0, 288.0)),
            step(0, place("money", 800.0, 500.0)),
            step(0, PlanAction::ToggleOverlay),
            step(600, place("basic", 544.0, 288.0)),
            step(900, PlanAction::Upgrade(Vec2::new(800.0, 500.0))),
        ])
    }

    /// Number of steps still waiting to be replayed.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Builds the frame input for `frame`, consuming at most one due step.
    pub(crate) fn input_for(&mut self, frame: u64) -> FrameInput {
        let mut input = FrameInput::default();
        let due = self.pending.front().is_some_and(|step| step.frame <= frame);
        if !due {
            return input;
        }
        let Some(step) = self.pending.pop_front() else {
            return input;
        };

        match step.action {
            PlanAction::Place { variant, point } => {
                input.select_variant = Some(variant);
                input.place_at = Some(point);
                input.hover = Some(point);
            }
            PlanAction::Upgrade(point) => {
                input.upgrade_at = Some(point);
                input.hover = Some(point);
            }
            PlanAction::Sell(point) => {
                input.sell_at = Some(point);
                input.hover = Some(point);
            }
            PlanAction::ToggleOverlay => input.toggle_grid_overlay = true,
            PlanAction::Quit => input.quit = true,
        }
        input
    }
}

/// Errors raised while parsing scripted plan steps.
#[derive(Debug, PartialEq)]
pub(crate) enum PlanError {
    /// The step was empty or contained only whitespace.
    Empty,
    /// The step did not start with an action keyword or variant tag.
    MissingAction(String),
    /// A placement, upgrade or sale did not name a point.
    MissingPoint(String),
    /// The point could not be parsed as `<x>,<y>`.
    InvalidPoint(String),
    /// The frame could not be parsed as an unsigned integer.
    InvalidFrame(String, ParseIntError),
    /// The step carried more fields than its action accepts.
    TrailingFields(String),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "plan step was empty"),
            Self::MissingAction(step) => write!(f, "plan step '{step}' is missing an action"),
            Self::MissingPoint(step) => write!(f, "plan step '{step}' is missing a point"),
            Self::InvalidPoint(point) => write!(f, "could not parse point '{point}'"),
            Self::InvalidFrame(frame, error) => {
                write!(f, "could not parse frame '{frame}': {error}")
            }
            Self::TrailingFields(step) => {
                write!(f, "plan step '{step}' has unexpected trailing fields")
            }
        }
    }
}

impl Error for PlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFrame(_, error) => Some(error),
            _ => None,
        }
    }
}
