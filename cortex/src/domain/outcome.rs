// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Values exchanged with the perception/actuation layer on every tick.

use serde::{Deserialize, Serialize};

use super::pattern::PatternId;

/// What the environment reports after an atomic action was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Action symbol that was attempted.
    pub action: String,
    /// Result symbol sensed by the agent.
    pub result: String,
    pub satisfaction: i64,
}

impl Outcome {
    pub fn new(action: impl Into<String>, result: impl Into<String>, satisfaction: i64) -> Self {
        Self {
            action: action.into(),
            result: result.into(),
            satisfaction,
        }
    }
}

/// Returned to the actuation layer at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Action symbol to drive the effectors with.
    pub action: String,
    /// Primitive pattern the agent expects to enact.
    pub primitive: PatternId,
    /// Top-level intention this primitive belongs to.
    pub intention: PatternId,
    /// Set when a decision cycle closed during this tick.
    pub completed_cycle: Option<CycleReport>,
}

/// Summary of a closed decision cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub intended: PatternId,
    pub enacted: PatternId,
    pub performed: PatternId,
    /// Patterns created or reinforced by the cycle's learning passes.
    pub reinforced: usize,
}

impl CycleReport {
    pub fn succeeded(&self) -> bool {
        self.enacted == self.intended
    }
}
