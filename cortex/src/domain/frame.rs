// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use super::pattern::PatternId;

/// Which half of a composite is being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Context,
    Intention,
}

/// Transient record of one in-flight prescription.
///
/// Frames live on the prescription stack, never on the interned pattern, so
/// the same pattern can appear at several depths of one hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFrame {
    pub pattern: PatternId,
    pub step: Step,
    /// Composite that requested this pattern, `None` at the top.
    pub prescriber: Option<PatternId>,
    pub activation: i64,
}

impl ExecutionFrame {
    pub fn new(pattern: PatternId, prescriber: Option<PatternId>, activation: i64) -> Self {
        Self {
            pattern,
            step: Step::Context,
            prescriber,
            activation,
        }
    }
}

/// A pattern to prescribe together with the activation driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub pattern: PatternId,
    pub activation: i64,
}

impl Prescription {
    pub fn new(pattern: PatternId, activation: i64) -> Self {
        Self { pattern, activation }
    }
}
