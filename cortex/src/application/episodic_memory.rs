// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Episodic Memory
//!
//! Default [`LearningEngine`]: Hebbian reinforcement of "X is usually
//! followed by Y" composites.
//!
//! ## Reinforcement
//!
//! Recording a terminal act against a context list interns the composite
//! `(context item, terminal)` for every context item and increments its weight
//! by `reinforcement_increment`. Composites that would be longer than
//! `max_pattern_length` are not learned, which bounds registry growth.
//!
//! ## Proposals
//!
//! Every sufficiently reinforced composite whose context sub-pattern is active
//! votes for its intention sub-pattern with `weight × value(intention)`.
//! Failures vote for the behavior they failed, with the failure's (negative)
//! value, so that behaviors that tend to go wrong in this context are avoided.

use chrono::Utc;
use tracing::{debug, trace};

use super::learning::LearningEngine;
use crate::domain::{
    ActProposition, CortexError, CortexEvent, LearningConfig, PatternId, PatternRegistry,
    PropositionSet, SessionId,
};
use crate::infrastructure::event_bus::EventBus;

pub struct EpisodicMemory {
    config: LearningConfig,
    session_id: SessionId,
    event_bus: Option<EventBus>,
    learn_count: usize,
}

impl EpisodicMemory {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            session_id: SessionId::new(),
            event_bus: None,
            learn_count: 0,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus, session_id: SessionId) -> Self {
        self.event_bus = Some(event_bus);
        self.session_id = session_id;
        self
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Number of composites learned for the first time since creation.
    pub fn learn_count(&self) -> usize {
        self.learn_count
    }

    fn publish(&self, event: CortexEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

impl LearningEngine for EpisodicMemory {
    fn reinforce(
        &mut self,
        registry: &mut PatternRegistry,
        context: &[PatternId],
        terminal: PatternId,
    ) -> Result<Vec<PatternId>, CortexError> {
        let terminal_length = registry.pattern(terminal)?.length;
        let mut reinforced = Vec::with_capacity(context.len());

        for &pre in context {
            if registry.pattern(pre)?.length + terminal_length > self.config.max_pattern_length {
                trace!(
                    context = registry.label(pre),
                    terminal = registry.label(terminal),
                    "Composite exceeds max pattern length, not learned"
                );
                continue;
            }

            let id = registry.intern_composite(pre, terminal)?;
            let schema = registry.schema_mut(id)?;
            let old_weight = schema.weight;
            schema.reinforce(self.config.reinforcement_increment);
            let new_weight = schema.weight;

            // Composites interned while reconstructing an enaction exist
            // before they are ever learned; first reinforcement is the birth.
            let first_time = schema.succeeding_act.is_none();
            if first_time {
                schema.succeeding_act = Some(id);
                self.learn_count += 1;
                metrics::counter!("enactor_patterns_learned_total").increment(1);

                let pattern = registry.pattern(id)?;
                debug!(pattern = %pattern, "Learned composite pattern");
                self.publish(CortexEvent::CompositeLearned {
                    session_id: self.session_id,
                    pattern_id: id,
                    label: pattern.label.clone(),
                    value: pattern.value,
                    timestamp: Utc::now(),
                });
            } else {
                trace!(label = registry.label(id), new_weight, "Reinforced composite pattern");
                self.publish(CortexEvent::PatternReinforced {
                    session_id: self.session_id,
                    pattern_id: id,
                    old_weight,
                    new_weight,
                    timestamp: Utc::now(),
                });
            }

            reinforced.push(id);
        }

        Ok(reinforced)
    }

    fn synthesize_failure(
        &mut self,
        registry: &mut PatternRegistry,
        intended: PatternId,
        satisfaction: i64,
    ) -> Result<PatternId, CortexError> {
        let failure = registry.intern_failure(intended, satisfaction)?;
        let schema = registry.schema_mut(intended)?;

        if schema.failing_act != Some(failure) {
            schema.failing_act = Some(failure);
            let value = registry.pattern(failure)?.value;
            debug!(
                intended = registry.label(intended),
                value, "Synthesized failing interaction"
            );
            self.publish(CortexEvent::FailureSynthesized {
                session_id: self.session_id,
                intended,
                failure,
                value,
                timestamp: Utc::now(),
            });
        }

        Ok(failure)
    }

    fn propose_candidates(
        &self,
        registry: &PatternRegistry,
        activation: &[PatternId],
    ) -> Result<Vec<ActProposition>, CortexError> {
        let mut propositions = PropositionSet::new();

        for &active in activation {
            for &composite in registry.composites_with_context(active) {
                let weight = registry.weight(composite);
                if weight <= self.config.activation_threshold {
                    continue;
                }
                let Some((_, intention)) = registry.pattern(composite)?.parts() else {
                    continue;
                };
                let value = registry.pattern(intention)?.value;
                let target = registry.structure(intention)?;
                propositions.propose(target, weight * value);
            }
        }

        Ok(propositions.into_sorted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> EpisodicMemory {
        EpisodicMemory::new(LearningConfig::default())
    }

    #[test]
    fn test_reinforce_creates_then_increments() {
        let mut registry = PatternRegistry::default();
        let mut memory = memory();
        let step = registry.intern_primitive(">", "t", 5).unwrap();
        let turn = registry.intern_primitive("^", "t", -3).unwrap();

        let first = memory.reinforce(&mut registry, &[step, turn], step).unwrap();
        assert_eq!(first.len(), 2);
        let step_step = first[0];
        assert_eq!(registry.label(step_step), "(>t>t)");
        assert_eq!(registry.weight(step_step), 1);
        assert_eq!(registry.schema(step_step).unwrap().succeeding_act, Some(step_step));

        let second = memory.reinforce(&mut registry, &[step], step).unwrap();
        assert_eq!(second, vec![step_step]);
        assert_eq!(registry.weight(step_step), 2);
        assert_eq!(memory.learn_count(), 2);
    }

    #[test]
    fn test_reinforce_respects_max_length() {
        let mut registry = PatternRegistry::default();
        let mut memory = EpisodicMemory::new(LearningConfig {
            max_pattern_length: 2,
            ..LearningConfig::default()
        });
        let a = registry.intern_primitive("a", "t", 1).unwrap();
        let aa = registry.intern_composite(a, a).unwrap();

        let learned = memory.reinforce(&mut registry, &[aa, a], a).unwrap();

        assert_eq!(learned.len(), 1);
        assert_eq!(registry.label(learned[0]), "(atat)");
        assert!(registry.find_composite(aa, a).is_none());
    }

    #[test]
    fn test_reconstructed_composite_counts_as_learned_on_first_reinforcement() {
        let mut registry = PatternRegistry::default();
        let mut memory = memory();
        let a = registry.intern_primitive("a", "t", 1).unwrap();
        let aa = registry.intern_composite(a, a).unwrap();

        memory.reinforce(&mut registry, &[a], a).unwrap();

        assert_eq!(registry.weight(aa), 1);
        assert_eq!(registry.schema(aa).unwrap().succeeding_act, Some(aa));
        assert_eq!(memory.learn_count(), 1);
    }

    #[test]
    fn test_synthesize_failure_attaches_failing_act() {
        let mut registry = PatternRegistry::default();
        let mut memory = memory();
        let a = registry.intern_primitive("a", "t", 1).unwrap();
        let b = registry.intern_primitive("b", "t", 2).unwrap();
        let ab = registry.intern_composite(a, b).unwrap();

        let failure = memory.synthesize_failure(&mut registry, ab, -6).unwrap();

        assert_eq!(registry.schema(ab).unwrap().failing_act, Some(failure));
        assert_eq!(registry.pattern(failure).unwrap().value, -6);
        assert_eq!(memory.synthesize_failure(&mut registry, ab, 9).unwrap(), failure);
    }

    #[test]
    fn test_proposals_weighted_by_value_and_gated() {
        let mut registry = PatternRegistry::default();
        let mut memory = memory();
        let step = registry.intern_primitive(">", "t", 5).unwrap();
        let bump = registry.intern_primitive(">", "f", -10).unwrap();
        let turn = registry.intern_primitive("^", "t", -3).unwrap();

        // (step step) reinforced three times, (step turn) once
        for _ in 0..3 {
            memory.reinforce(&mut registry, &[step], step).unwrap();
        }
        memory.reinforce(&mut registry, &[step], turn).unwrap();
        memory.reinforce(&mut registry, &[bump], turn).unwrap();
        memory.reinforce(&mut registry, &[bump], turn).unwrap();

        let proposals = memory.propose_candidates(&registry, &[step, bump]).unwrap();

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].pattern, step);
        assert_eq!(proposals[0].weight, 15);
        // only (bump turn) clears the threshold of 1
        assert_eq!(proposals[1].pattern, turn);
        assert_eq!(proposals[1].weight, -6);
    }

    #[test]
    fn test_failure_proposes_intended_behavior() {
        let mut registry = PatternRegistry::default();
        let mut memory = memory();
        let a = registry.intern_primitive("a", "t", 1).unwrap();
        let b = registry.intern_primitive("b", "t", 2).unwrap();
        let ab = registry.intern_composite(a, b).unwrap();
        let failure = memory.synthesize_failure(&mut registry, ab, -4).unwrap();

        memory.reinforce(&mut registry, &[a], failure).unwrap();
        memory.reinforce(&mut registry, &[a], failure).unwrap();

        let proposals = memory.propose_candidates(&registry, &[a]).unwrap();
        assert_eq!(proposals, vec![ActProposition::new(ab, 0)]);
        assert_eq!(proposals[0].weight, -8);
    }

    #[tokio::test]
    async fn test_learning_publishes_events() {
        let bus = EventBus::new(16);
        let session_id = SessionId::new();
        let mut receiver = bus.subscribe_session(session_id);
        let mut registry = PatternRegistry::default();
        let mut memory = memory().with_event_bus(bus, session_id);
        let a = registry.intern_primitive("a", "t", 1).unwrap();

        memory.reinforce(&mut registry, &[a], a).unwrap();
        memory.reinforce(&mut registry, &[a], a).unwrap();

        assert_eq!(receiver.recv().await.unwrap().event_type(), "composite_learned");
        match receiver.recv().await.unwrap() {
            CortexEvent::PatternReinforced { old_weight, new_weight, .. } => {
                assert_eq!((old_weight, new_weight), (1, 2));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
