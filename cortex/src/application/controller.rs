// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Decision-Cycle Controller
//!
//! Top-level tick loop of the agent. Every tick takes the atomic outcome the
//! environment just produced and returns the next atomic action to attempt.
//!
//! A **decision cycle** spans the ticks needed for one top-level intention to
//! resolve completely. Learning happens only when a cycle closes:
//!
//! 1. The *performed* pattern is the enacted one when it is an enaction of
//!    the intended behavior, otherwise a failure of the intended pattern.
//! 2. The context is reinforced against the performed pattern. The first
//!    composite of that pass is the *stream act*; when its weight clears the
//!    activation threshold the previous cycle's context is reinforced against
//!    it too.
//! 3. When the enacted pattern differs from the performed one, step 2 runs
//!    again with the enacted pattern.
//! 4. Working memory shifts to the next cycle.
//!
//! The controller is single-threaded and synchronous. The only source of
//! nondeterminism is the injected tie-break generator.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use super::episodic_memory::EpisodicMemory;
use super::learning::LearningEngine;
use super::prescription::{PrescriptionEngine, Resolution};
use super::selector::{select, spread_activation};
use crate::domain::{
    AgentConfigManifest, CortexError, CortexEvent, CycleReport, Decision, LearningConfig, Outcome,
    PatternId, PatternRegistry, Prescription, PrimitiveInteraction, PropositionSet, SessionId,
    WorkingMemory,
};
use crate::infrastructure::event_bus::EventBus;

pub struct DecisionCycleController<L = EpisodicMemory, R = StdRng> {
    registry: PatternRegistry,
    learning: L,
    engine: PrescriptionEngine,
    rng: R,
    config: LearningConfig,
    repertoire: Vec<PatternId>,
    memory: WorkingMemory,
    /// Top-level intention of the cycle in progress
    intention: Option<PatternId>,
    /// Primitive the environment is expected to enact next
    primitive_intention: Option<PatternId>,
    cycle: u64,
    session_id: SessionId,
    event_bus: Option<EventBus>,
}

impl DecisionCycleController<EpisodicMemory, StdRng> {
    /// Build a controller with the default learning engine from a manifest.
    /// The tie-break generator is seeded from `spec.selection.seed` when set.
    pub fn from_manifest(
        manifest: &AgentConfigManifest,
        event_bus: Option<EventBus>,
    ) -> Result<Self, CortexError> {
        let spec = &manifest.spec;
        let rng = match spec.selection.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let session_id = SessionId::new();
        let mut learning = EpisodicMemory::new(spec.learning.clone());
        if let Some(bus) = &event_bus {
            learning = learning.with_event_bus(bus.clone(), session_id);
        }

        let controller = Self::new(spec.learning.clone(), &spec.repertoire, learning, rng)?;
        Ok(match event_bus {
            Some(bus) => controller.with_event_bus(bus, session_id),
            None => controller,
        })
    }
}

impl<L: LearningEngine, R: Rng> DecisionCycleController<L, R> {
    /// Create a controller whose registry holds the innate `repertoire`.
    pub fn new(
        config: LearningConfig,
        repertoire: &[PrimitiveInteraction],
        learning: L,
        rng: R,
    ) -> Result<Self, CortexError> {
        if repertoire.is_empty() {
            return Err(CortexError::EmptyRepertoire);
        }

        let mut registry = PatternRegistry::new(config.primitive_weight);
        let mut innate = Vec::with_capacity(repertoire.len());
        for interaction in repertoire {
            let id = registry.intern_primitive(
                &interaction.action,
                &interaction.result,
                interaction.satisfaction,
            )?;
            if !innate.contains(&id) {
                innate.push(id);
            }
        }

        Ok(Self {
            registry,
            learning,
            engine: PrescriptionEngine::new(),
            rng,
            config,
            repertoire: innate,
            memory: WorkingMemory::new(),
            intention: None,
            primitive_intention: None,
            cycle: 0,
            session_id: SessionId::new(),
            event_bus: None,
        })
    }

    /// Publish events on `event_bus` under `session_id`. The innate
    /// repertoire is announced right away.
    pub fn with_event_bus(mut self, event_bus: EventBus, session_id: SessionId) -> Self {
        self.session_id = session_id;
        for &id in &self.repertoire {
            if let Some(pattern) = self.registry.get(id) {
                event_bus.publish(CortexEvent::PrimitiveDefined {
                    session_id,
                    pattern_id: id,
                    label: pattern.label.clone(),
                    value: pattern.value,
                    timestamp: Utc::now(),
                });
            }
        }
        self.event_bus = Some(event_bus);
        self
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn learning(&self) -> &L {
        &self.learning
    }

    pub fn memory(&self) -> &WorkingMemory {
        &self.memory
    }

    pub fn engine(&self) -> &PrescriptionEngine {
        &self.engine
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn repertoire(&self) -> &[PatternId] {
        &self.repertoire
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Number of decision cycles closed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn intention(&self) -> Option<PatternId> {
        self.intention
    }

    pub fn pending(&self) -> Option<PatternId> {
        self.primitive_intention
    }

    /// Run one tick.
    ///
    /// `outcome` is what the environment did with the previous decision, or
    /// `None` when nothing has been attempted yet. An outcome arriving while
    /// nothing is pending seeds the working memory instead of closing a cycle.
    pub fn step(&mut self, outcome: Option<&Outcome>) -> Result<Decision, CortexError> {
        let Some(outcome) = outcome else {
            if let Some(pending) = self.primitive_intention {
                trace!("No outcome for pending intention, repeating decision");
                return self.decision(pending, None);
            }
            return self.decide(None, None);
        };

        let primitive = self.define_primitive(outcome)?;

        if self.primitive_intention.is_none() {
            debug!(
                primitive = self.registry.label(primitive),
                "Seeding working memory from unsolicited outcome"
            );
            self.memory.add_activation(primitive);
            return self.decide(None, None);
        }

        let enacted = self.engine.enacted_pattern(&mut self.registry, primitive)?;
        match self.engine.resolve_step(&self.registry, primitive)? {
            Resolution::Next(next) => self.decide(Some(next), None),
            Resolution::Completed { intention, reported } => {
                trace!(
                    intention = self.registry.label(intention),
                    reported = reported.map(|r| self.registry.label(r)),
                    "Hierarchy resolved"
                );
                let report = self.close_cycle(enacted)?;
                self.decide(None, Some(report))
            }
        }
    }

    /// Cancel the intention in flight. No success or failure is reported and
    /// nothing is learned. Working memory is kept, so the next outcome joins
    /// the current context and activation instead of closing a cycle.
    pub fn abort(&mut self) -> Option<PatternId> {
        let depth = self.engine.depth();
        let cancelled = self.engine.cancel();
        self.primitive_intention = None;
        self.intention = None;

        if let Some(pattern_id) = cancelled {
            info!(
                intention = self.registry.label(pattern_id),
                depth, "Cancelled intention in flight"
            );
            metrics::counter!("enactor_intentions_cancelled_total").increment(1);
            self.publish(CortexEvent::IntentionCancelled {
                session_id: self.session_id,
                pattern_id,
                depth,
                timestamp: Utc::now(),
            });
        }
        cancelled
    }

    fn define_primitive(&mut self, outcome: &Outcome) -> Result<PatternId, CortexError> {
        let known = self.registry.len();
        let id = self
            .registry
            .intern_primitive(&outcome.action, &outcome.result, outcome.satisfaction)?;

        if self.registry.len() > known {
            let pattern = self.registry.pattern(id)?;
            self.publish(CortexEvent::PrimitiveDefined {
                session_id: self.session_id,
                pattern_id: id,
                label: pattern.label.clone(),
                value: pattern.value,
                timestamp: Utc::now(),
            });
        }
        Ok(id)
    }

    fn close_cycle(&mut self, enacted: PatternId) -> Result<CycleReport, CortexError> {
        let intended = self.intention.take().ok_or(CortexError::NothingPrescribed)?;

        let enacted_pattern = self.registry.pattern(enacted)?;
        let enacted_value = enacted_pattern.value;
        let intended_behavior = self.registry.pattern(intended)?.behavior();
        let performed = if intended_behavior == enacted_pattern.behavior() {
            enacted
        } else {
            self.learning
                .synthesize_failure(&mut self.registry, intended, enacted_value)?
        };

        let context = self.memory.context().to_vec();
        let base_context = self.memory.base_context().to_vec();

        let (streamed, mut reinforced) = self.learn(&context, &base_context, performed)?;
        if enacted != performed {
            let (_, count) = self.learn(&context, &base_context, enacted)?;
            reinforced += count;
        }

        let enacted_intention = self.registry.pattern(enacted)?.parts().map(|(_, i)| i);
        self.memory
            .shift(enacted, performed, enacted_intention, &streamed);

        self.cycle += 1;
        let report = CycleReport {
            cycle: self.cycle,
            intended,
            enacted,
            performed,
            reinforced,
        };

        metrics::counter!("enactor_decision_cycles_total").increment(1);
        debug!(
            cycle = self.cycle,
            intended = self.registry.label(intended),
            enacted = self.registry.label(enacted),
            performed = self.registry.label(performed),
            reinforced,
            "Decision cycle completed"
        );
        self.publish(CortexEvent::DecisionCycleCompleted {
            session_id: self.session_id,
            cycle: self.cycle,
            intended: self.registry.label(intended).to_string(),
            enacted: self.registry.label(enacted).to_string(),
            performed: self.registry.label(performed).to_string(),
            succeeded: report.succeeded(),
            reinforced,
            timestamp: Utc::now(),
        });

        Ok(report)
    }

    /// One learning pass: reinforce `context` against `terminal`, then the
    /// base context against the stream act when it is active enough.
    /// Returns the first reinforcement's composites and the total count of
    /// composites touched.
    fn learn(
        &mut self,
        context: &[PatternId],
        base_context: &[PatternId],
        terminal: PatternId,
    ) -> Result<(Vec<PatternId>, usize), CortexError> {
        let streamed = self
            .learning
            .reinforce(&mut self.registry, context, terminal)?;
        let mut count = streamed.len();

        if let Some(&stream_act) = streamed.first() {
            let weight = self.registry.weight(stream_act);
            if weight > self.config.activation_threshold {
                debug!(
                    stream_act = self.registry.label(stream_act),
                    weight, "Streaming into base context"
                );
                count += self
                    .learning
                    .reinforce(&mut self.registry, base_context, stream_act)?
                    .len();
            }
        }

        Ok((streamed, count))
    }

    /// Select a new top-level intention unless `next` continues the current
    /// hierarchy, then descend to the primitive to attempt.
    fn decide(
        &mut self,
        next: Option<Prescription>,
        completed_cycle: Option<CycleReport>,
    ) -> Result<Decision, CortexError> {
        let prescription = match next {
            Some(prescription) => prescription,
            None => self.select_intention()?,
        };

        let primitive = spread_activation(&mut self.engine, &self.registry, prescription)?;
        self.primitive_intention = Some(primitive);
        self.decision(primitive, completed_cycle)
    }

    fn select_intention(&mut self) -> Result<Prescription, CortexError> {
        let mut propositions = PropositionSet::new();
        propositions.extend(
            self.learning
                .propose_candidates(&self.registry, self.memory.activation())?,
        );
        for &innate in &self.repertoire {
            propositions.propose(innate, 0);
        }

        let candidates = propositions.into_sorted();
        let candidate_count = candidates.len();
        let chosen = select(candidates, &mut self.rng);
        self.intention = Some(chosen.pattern);

        debug!(
            cycle = self.cycle,
            intention = self.registry.label(chosen.pattern),
            activation = chosen.weight,
            candidates = candidate_count,
            "Selected intention"
        );
        self.publish(CortexEvent::IntentionSelected {
            session_id: self.session_id,
            cycle: self.cycle,
            pattern_id: chosen.pattern,
            label: self.registry.label(chosen.pattern).to_string(),
            activation: chosen.weight,
            candidates: candidate_count,
            timestamp: Utc::now(),
        });

        Ok(Prescription::new(chosen.pattern, chosen.weight))
    }

    fn decision(
        &self,
        primitive: PatternId,
        completed_cycle: Option<CycleReport>,
    ) -> Result<Decision, CortexError> {
        let intention = self.intention.unwrap_or(primitive);
        Ok(Decision {
            action: self.registry.action_of(primitive)?.to_string(),
            primitive,
            intention,
            completed_cycle,
        })
    }

    fn publish(&self, event: CortexEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
