// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the Cortex bounded context
//! Published on the EventBus for tracing and observers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pattern::PatternId;

/// Identifier of one agent run. Events from concurrent agents sharing a bus
/// are told apart by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Cortex domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CortexEvent {
    /// A primitive interaction entered the registry
    PrimitiveDefined {
        session_id: SessionId,
        pattern_id: PatternId,
        label: String,
        value: i64,
        timestamp: DateTime<Utc>,
    },

    /// A composite pattern was learned for the first time
    CompositeLearned {
        session_id: SessionId,
        pattern_id: PatternId,
        label: String,
        value: i64,
        timestamp: DateTime<Utc>,
    },

    /// An existing composite was reinforced
    PatternReinforced {
        session_id: SessionId,
        pattern_id: PatternId,
        old_weight: i64,
        new_weight: i64,
        timestamp: DateTime<Utc>,
    },

    /// A failing interaction was attached to an intended pattern
    FailureSynthesized {
        session_id: SessionId,
        intended: PatternId,
        failure: PatternId,
        value: i64,
        timestamp: DateTime<Utc>,
    },

    /// A new top-level intention was selected
    IntentionSelected {
        session_id: SessionId,
        cycle: u64,
        pattern_id: PatternId,
        label: String,
        activation: i64,
        candidates: usize,
        timestamp: DateTime<Utc>,
    },

    /// A decision cycle closed and its learning passes ran
    DecisionCycleCompleted {
        session_id: SessionId,
        cycle: u64,
        intended: String,
        enacted: String,
        performed: String,
        succeeded: bool,
        reinforced: usize,
        timestamp: DateTime<Utc>,
    },

    /// An in-flight intention was aborted without learning
    IntentionCancelled {
        session_id: SessionId,
        pattern_id: PatternId,
        depth: usize,
        timestamp: DateTime<Utc>,
    },
}

impl CortexEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CortexEvent::PrimitiveDefined { timestamp, .. } => *timestamp,
            CortexEvent::CompositeLearned { timestamp, .. } => *timestamp,
            CortexEvent::PatternReinforced { timestamp, .. } => *timestamp,
            CortexEvent::FailureSynthesized { timestamp, .. } => *timestamp,
            CortexEvent::IntentionSelected { timestamp, .. } => *timestamp,
            CortexEvent::DecisionCycleCompleted { timestamp, .. } => *timestamp,
            CortexEvent::IntentionCancelled { timestamp, .. } => *timestamp,
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            CortexEvent::PrimitiveDefined { session_id, .. } => *session_id,
            CortexEvent::CompositeLearned { session_id, .. } => *session_id,
            CortexEvent::PatternReinforced { session_id, .. } => *session_id,
            CortexEvent::FailureSynthesized { session_id, .. } => *session_id,
            CortexEvent::IntentionSelected { session_id, .. } => *session_id,
            CortexEvent::DecisionCycleCompleted { session_id, .. } => *session_id,
            CortexEvent::IntentionCancelled { session_id, .. } => *session_id,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            CortexEvent::PrimitiveDefined { .. } => "primitive_defined",
            CortexEvent::CompositeLearned { .. } => "composite_learned",
            CortexEvent::PatternReinforced { .. } => "pattern_reinforced",
            CortexEvent::FailureSynthesized { .. } => "failure_synthesized",
            CortexEvent::IntentionSelected { .. } => "intention_selected",
            CortexEvent::DecisionCycleCompleted { .. } => "decision_cycle_completed",
            CortexEvent::IntentionCancelled { .. } => "intention_cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = CortexEvent::CompositeLearned {
            session_id: SessionId::new(),
            pattern_id: PatternId(4),
            label: "(>t>t)".to_string(),
            value: 4,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"composite_learned\""));

        let deserialized: CortexEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.event_type(), deserialized.event_type());
        assert_eq!(event.session_id(), deserialized.session_id());
    }

    #[test]
    fn test_reinforcement_event_type() {
        let event = CortexEvent::PatternReinforced {
            session_id: SessionId::new(),
            pattern_id: PatternId(4),
            old_weight: 1,
            new_weight: 2,
            timestamp: Utc::now(),
        };

        assert_eq!(event.event_type(), "pattern_reinforced");
    }
}
