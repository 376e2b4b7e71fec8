//! Falling "variable" tokens and their spawn cadence.

use serde::{Deserialize, Serialize};

use crate::config::VariableConfig;
use crate::physics::{BodyKind, BodySpec, ColliderShape};
use crate::rng::SceneRng;

/// Label on a variable token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Braces,
    Var,
}

impl VariableKind {
    pub fn label(self) -> &'static str {
        match self {
            VariableKind::Braces => "{}",
            VariableKind::Var => "var",
        }
    }

    /// Even odds between the two tokens.
    pub fn pick(rng: &mut SceneRng) -> Self {
        if rng.coin() {
            VariableKind::Braces
        } else {
            VariableKind::Var
        }
    }
}

impl VariableConfig {
    /// Dynamic circle at the spawn point.
    pub fn body_spec(&self) -> BodySpec {
        BodySpec {
            kind: BodyKind::Dynamic,
            shape: ColliderShape::Circle {
                radius: self.radius,
            },
            x: self.spawn_x,
            y: self.spawn_y,
            rotation: 0.0,
            restitution: self.restitution,
            mass: Some(self.mass),
            velocity: (0.0, 0.0),
        }
    }
}

/// Counts interval boundaries crossed as fixed simulation steps go by.
///
/// Time is derived from the step count rather than summed, so boundaries
/// land on the same step however long the scene runs.
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    interval: f64,
    step: f64,
    steps: u64,
    fired: u64,
}

impl SpawnTimer {
    /// Timer that fires every `interval` seconds of `step`-second ticks,
    /// first at `interval`.
    pub fn new(interval: f64, step: f64) -> Self {
        Self {
            interval,
            step,
            steps: 0,
            fired: 0,
        }
    }

    /// Advance one step; returns how many spawns are now due.
    pub fn advance(&mut self) -> usize {
        self.advance_by(1)
    }

    /// Advance `steps` steps at once; more than one spawn may be due.
    pub fn advance_by(&mut self, steps: u64) -> usize {
        self.steps += steps;
        let elapsed = self.steps as f64 * self.step;
        // 1/60 is inexact; the slack lets 30 steps reach 0.5 s.
        let due = (elapsed / self.interval + 1e-9).floor() as u64;
        let fresh = due.saturating_sub(self.fired);
        self.fired = due.max(self.fired);
        fresh as usize
    }

    /// Total times the timer has fired.
    pub fn fired(&self) -> u64 {
        self.fired
    }
}
