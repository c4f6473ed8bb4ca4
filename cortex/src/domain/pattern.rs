// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Interned sensorimotor patterns ("acts") and their learned schema state.
//!
//! A [`Pattern`] is immutable once interned: its kind, label, enaction value
//! and length never change. Everything the agent learns about a pattern lives
//! in the companion [`Schema`] record held by the registry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Arena index of a pattern inside a [`PatternRegistry`](super::PatternRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternId(pub usize);

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternKind {
    /// An atomic action-outcome exchange with the environment.
    Primitive { action: String, result: String },

    /// Context pattern attempted first, intention pattern second.
    Composite { context: PatternId, intention: PatternId },

    /// "The intended pattern did not complete as expected."
    Failure { intended: PatternId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    pub kind: PatternKind,
    pub label: String,
    pub value: i64,
    pub length: usize,
}

impl Pattern {
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, PatternKind::Primitive { .. })
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, PatternKind::Composite { .. })
    }

    /// Action symbol sent to the effectors, primitives only.
    pub fn action(&self) -> Option<&str> {
        match &self.kind {
            PatternKind::Primitive { action, .. } => Some(action),
            _ => None,
        }
    }

    /// `(context, intention)` pair, composites only.
    pub fn parts(&self) -> Option<(PatternId, PatternId)> {
        match self.kind {
            PatternKind::Composite { context, intention } => Some((context, intention)),
            _ => None,
        }
    }

    /// The behavior this pattern is an enaction of.
    ///
    /// Two primitives sharing an action symbol are the same behavior with
    /// different outcomes. A failure pattern stands for the behavior it failed.
    pub fn behavior(&self) -> Behavior {
        match &self.kind {
            PatternKind::Primitive { action, .. } => Behavior::Action(action.clone()),
            PatternKind::Composite { .. } => Behavior::Pattern(self.id),
            PatternKind::Failure { intended } => Behavior::Pattern(*intended),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label, self.value)
    }
}

/// What the agent was trying to do, independent of how it turned out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Behavior {
    Action(String),
    Pattern(PatternId),
}

/// Mutable learned state attached to a pattern. Only the learning engine
/// writes to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub weight: i64,
    pub succeeding_act: Option<PatternId>,
    pub failing_act: Option<PatternId>,
}

impl Schema {
    pub fn new(weight: i64) -> Self {
        Self {
            weight,
            succeeding_act: None,
            failing_act: None,
        }
    }

    /// Increment weight (reinforcement)
    pub fn reinforce(&mut self, amount: i64) {
        self.weight += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitive(id: usize, action: &str, result: &str) -> Pattern {
        Pattern {
            id: PatternId(id),
            kind: PatternKind::Primitive {
                action: action.to_string(),
                result: result.to_string(),
            },
            label: format!("{action}{result}"),
            value: 2,
            length: 1,
        }
    }

    #[test]
    fn test_primitives_with_same_action_share_behavior() {
        let moved = primitive(0, ">", "t");
        let bumped = primitive(1, ">", "f");

        assert_eq!(moved.behavior(), bumped.behavior());
        assert_eq!(moved.action(), Some(">"));
        assert!(moved.parts().is_none());
    }

    #[test]
    fn test_failure_behavior_is_intended_pattern() {
        let failure = Pattern {
            id: PatternId(7),
            kind: PatternKind::Failure { intended: PatternId(3) },
            label: "!(>t>t)".to_string(),
            value: -4,
            length: 2,
        };

        assert_eq!(failure.behavior(), Behavior::Pattern(PatternId(3)));
        assert!(!failure.is_primitive());
        assert!(failure.action().is_none());
    }

    #[test]
    fn test_schema_reinforcement() {
        let mut schema = Schema::new(0);
        schema.reinforce(1);
        schema.reinforce(1);

        assert_eq!(schema.weight, 2);
        assert!(schema.succeeding_act.is_none());
    }
}
