//! Threshold ladders
//!
//! A ladder is an ordered table of `(bound, increment)` steps. The first step whose
//! bound the value crosses wins; a value that crosses none contributes nothing.
//! Steps are listed from the most severe band to the least severe.

use serde::Serialize;

/// How a value is compared against each step's bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    /// Matches when `value > bound`
    Exceeds,
    /// Matches when `value < bound`
    FallsBelow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LadderStep {
    pub bound: f64,
    pub increment: f64,
}

impl LadderStep {
    #[must_use]
    pub const fn new(bound: f64, increment: f64) -> Self {
        Self { bound, increment }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ladder {
    pub comparison: Comparison,
    pub steps: &'static [LadderStep],
}

impl Ladder {
    #[must_use]
    pub const fn exceeds(steps: &'static [LadderStep]) -> Self {
        Self {
            comparison: Comparison::Exceeds,
            steps,
        }
    }

    #[must_use]
    pub const fn falls_below(steps: &'static [LadderStep]) -> Self {
        Self {
            comparison: Comparison::FallsBelow,
            steps,
        }
    }

    /// First step matched by `value`
    #[must_use]
    pub fn matching_step(&self, value: f64) -> Option<&LadderStep> {
        self.steps.iter().find(|step| match self.comparison {
            Comparison::Exceeds => value > step.bound,
            Comparison::FallsBelow => value < step.bound,
        })
    }

    /// Increment for `value`, 0 when no step matches
    #[must_use]
    pub fn evaluate(&self, value: f64) -> f64 {
        self.matching_step(value).map_or(0.0, |step| step.increment)
    }
}
