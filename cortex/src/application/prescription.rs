// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Prescription Engine
//!
//! Executes a composite pattern by decomposing it into atomic steps and
//! folding the atomic outcomes back up the hierarchy.
//!
//! The chain of "who asked for this" is an explicit stack of
//! [`ExecutionFrame`]s: the bottom frame is the top-level intention, the top
//! frame is the primitive currently expected from the environment, and each
//! frame's prescriber is the frame right below it. Resolving a step pops
//! exactly one frame per level it climbs, so a hierarchy of length `n`
//! resolves after at most `n` successful atomic steps.

use tracing::debug;

use crate::domain::{
    CortexError, ExecutionFrame, PatternId, PatternKind, PatternRegistry, Prescription, Step,
};

/// Result of folding one atomic outcome into the prescription stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The hierarchy continues with this intention sub-pattern. Its
    /// prescriber is already waiting in the intention phase.
    Next(Prescription),

    /// The whole hierarchy resolved: the decision cycle is over.
    Completed {
        /// Top-level pattern that was prescribed.
        intention: PatternId,
        /// What the top level reported: its succeeding act, its failing act
        /// (`None` when not learned yet), or the enacted primitive when the
        /// intention was itself primitive.
        reported: Option<PatternId>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PrescriptionEngine {
    frames: Vec<ExecutionFrame>,
}

impl PrescriptionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[ExecutionFrame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_idle(&self) -> bool {
        self.frames.is_empty()
    }

    /// Primitive currently expected from the environment.
    pub fn pending(&self) -> Option<PatternId> {
        self.frames.last().map(|f| f.pattern)
    }

    /// Top-level intention in flight.
    pub fn root(&self) -> Option<PatternId> {
        self.frames.first().map(|f| f.pattern)
    }

    /// Push `prescription` on top of the stack, prescribed by the frame that
    /// was on top, and descend through context sub-patterns until a primitive
    /// is reached. Returns the frame pattern of that leaf.
    ///
    /// Every frame pushed on the way down carries the same activation. A
    /// failure pattern is executed through the structure of the pattern it
    /// stands for.
    pub fn prescribe(
        &mut self,
        registry: &PatternRegistry,
        prescription: Prescription,
    ) -> Result<PatternId, CortexError> {
        let Prescription { pattern, activation } = prescription;
        let base = self.frames.len();
        let prescriber = self.frames.last().map(|f| f.pattern);
        self.frames.push(ExecutionFrame::new(pattern, prescriber, activation));

        let mut current = pattern;
        loop {
            let structure = match registry.structure(current) {
                Ok(structure) => structure,
                Err(e) => {
                    self.frames.truncate(base);
                    return Err(e);
                }
            };
            match registry.pattern(structure)?.kind {
                PatternKind::Composite { context, .. } => {
                    self.frames
                        .push(ExecutionFrame::new(context, Some(current), activation));
                    current = context;
                }
                PatternKind::Primitive { .. } => return Ok(current),
                PatternKind::Failure { .. } => {
                    self.frames.truncate(base);
                    return Err(CortexError::NotEnactable(current));
                }
            }
        }
    }

    /// Reconstruct what was actually enacted so far in this hierarchy, given
    /// the primitive the environment just produced.
    ///
    /// Every prescriber in its intention phase wraps the enacted-so-far
    /// pattern with its own context sub-pattern. Composites interned on the
    /// way keep their weight untouched.
    pub fn enacted_pattern(
        &self,
        registry: &mut PatternRegistry,
        enacted_primitive: PatternId,
    ) -> Result<PatternId, CortexError> {
        let mut enacted = enacted_primitive;
        for frame in self.frames.iter().rev().skip(1) {
            if frame.step == Step::Intention {
                let (context, _) = parts(registry, frame.pattern)?;
                enacted = registry.intern_composite(context, enacted)?;
            }
        }
        Ok(enacted)
    }

    /// Fold the enacted pattern into the stack.
    ///
    /// The prescribed frame is consumed. A match in the context phase moves
    /// its prescriber to the intention phase; a match in the intention phase
    /// reports the prescriber's succeeding act one level up; a mismatch
    /// reports the prescriber's failing act one level up.
    pub fn resolve_step(
        &mut self,
        registry: &PatternRegistry,
        enacted: PatternId,
    ) -> Result<Resolution, CortexError> {
        let mut enacted = Some(enacted);

        loop {
            let Some(prescribed) = self.frames.pop() else {
                return Err(CortexError::NothingPrescribed);
            };

            let Some(prescriber) = self.frames.last_mut() else {
                return Ok(Resolution::Completed {
                    intention: prescribed.pattern,
                    reported: enacted,
                });
            };

            let structure = registry.structure(prescriber.pattern)?;
            let matched = enacted == Some(prescribed.pattern);
            match (matched, prescriber.step) {
                (true, Step::Context) => {
                    prescriber.step = Step::Intention;
                    let (_, intention) = parts(registry, structure)?;
                    return Ok(Resolution::Next(Prescription::new(
                        intention,
                        prescribed.activation,
                    )));
                }
                (true, Step::Intention) => {
                    let schema = registry.schema(structure)?;
                    enacted = Some(schema.succeeding_act.unwrap_or(structure));
                }
                (false, _) => {
                    debug!(
                        prescribed = registry.label(prescribed.pattern),
                        prescriber = registry.label(prescriber.pattern),
                        "Prescribed pattern not enacted, failing prescriber"
                    );
                    enacted = registry.schema(structure)?.failing_act;
                }
            }
        }
    }

    /// Abort the hierarchy in flight without reporting success or failure.
    /// Returns the top-level intention that was cancelled, if any.
    pub fn cancel(&mut self) -> Option<PatternId> {
        let root = self.root();
        self.frames.clear();
        root
    }
}

/// Context and intention of the composite executed when `id` is enacted.
fn parts(registry: &PatternRegistry, id: PatternId) -> Result<(PatternId, PatternId), CortexError> {
    let structure = registry.structure(id)?;
    registry
        .pattern(structure)?
        .parts()
        .ok_or(CortexError::NotEnactable(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        registry: PatternRegistry,
        a: PatternId,
        b: PatternId,
        c: PatternId,
        d: PatternId,
        ab: PatternId,
        cd: PatternId,
        top: PatternId,
    }

    /// top = ((a b) (c d))
    fn fixture() -> Fixture {
        let mut registry = PatternRegistry::default();
        let a = registry.intern_primitive("a", "t", 1).unwrap();
        let b = registry.intern_primitive("b", "t", 1).unwrap();
        let c = registry.intern_primitive("c", "t", 1).unwrap();
        let d = registry.intern_primitive("d", "t", 1).unwrap();
        let ab = registry.intern_composite(a, b).unwrap();
        let cd = registry.intern_composite(c, d).unwrap();
        let top = registry.intern_composite(ab, cd).unwrap();
        Fixture { registry, a, b, c, d, ab, cd, top }
    }

    fn drive(
        engine: &mut PrescriptionEngine,
        registry: &PatternRegistry,
        mut enacted: impl FnMut(PatternId) -> PatternId,
    ) -> (usize, Resolution) {
        let mut steps = 0;
        loop {
            let expected = engine.pending().unwrap();
            steps += 1;
            match engine.resolve_step(registry, enacted(expected)).unwrap() {
                Resolution::Next(next) => {
                    engine.prescribe(registry, next).unwrap();
                }
                done => return (steps, done),
            }
        }
    }

    #[test]
    fn test_prescribe_primitive_returns_itself() {
        let f = fixture();
        let mut engine = PrescriptionEngine::new();

        let leaf = engine.prescribe(&f.registry, Prescription::new(f.a, 9)).unwrap();
        assert_eq!(leaf, f.a);
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.frames()[0].prescriber, None);
    }

    #[test]
    fn test_prescribe_descends_through_context() {
        let f = fixture();
        let mut engine = PrescriptionEngine::new();

        let leaf = engine.prescribe(&f.registry, Prescription::new(f.top, 12)).unwrap();

        assert_eq!(leaf, f.a);
        let patterns: Vec<_> = engine.frames().iter().map(|fr| fr.pattern).collect();
        assert_eq!(patterns, vec![f.top, f.ab, f.a]);
        assert!(engine.frames().iter().all(|fr| fr.activation == 12));
        assert_eq!(engine.frames()[1].prescriber, Some(f.top));
        assert_eq!(engine.frames()[2].prescriber, Some(f.ab));
        assert_eq!(engine.frames()[0].step, Step::Context);
    }

    #[test]
    fn test_success_path_takes_exactly_length_steps() {
        let f = fixture();
        let mut engine = PrescriptionEngine::new();
        engine.prescribe(&f.registry, Prescription::new(f.top, 3)).unwrap();

        let mut order = Vec::new();
        let (steps, resolution) = drive(&mut engine, &f.registry, |expected| {
            order.push(expected);
            expected
        });

        assert_eq!(steps, f.registry.pattern(f.top).unwrap().length);
        assert_eq!(order, vec![f.a, f.b, f.c, f.d]);
        assert_eq!(
            resolution,
            Resolution::Completed { intention: f.top, reported: Some(f.top) }
        );
        assert!(engine.is_idle());
    }

    #[test]
    fn test_intention_phase_keeps_activation() {
        let f = fixture();
        let mut engine = PrescriptionEngine::new();
        engine.prescribe(&f.registry, Prescription::new(f.ab, 40)).unwrap();

        let resolution = engine.resolve_step(&f.registry, f.a).unwrap();
        assert_eq!(resolution, Resolution::Next(Prescription::new(f.b, 40)));
        assert_eq!(engine.frames()[0].step, Step::Intention);

        // the intention goes on top, prescribed by the frame below it
        engine.prescribe(&f.registry, Prescription::new(f.b, 40)).unwrap();
        assert_eq!(engine.depth(), 2);
        assert_eq!(engine.pending(), Some(f.b));
        assert_eq!(engine.frames()[1].prescriber, Some(f.ab));
        assert_eq!(engine.root(), Some(f.ab));
    }

    #[test]
    fn test_failure_routes_to_nearest_failing_act() {
        let mut f = fixture();
        let top_failure = f.registry.intern_failure(f.top, -8).unwrap();
        let cd_failure = f.registry.intern_failure(f.cd, -4).unwrap();
        f.registry.schema_mut(f.top).unwrap().failing_act = Some(top_failure);
        f.registry.schema_mut(f.cd).unwrap().failing_act = Some(cd_failure);
        let other = f.registry.intern_primitive("c", "f", -1).unwrap();

        let mut engine = PrescriptionEngine::new();
        engine.prescribe(&f.registry, Prescription::new(f.top, 1)).unwrap();

        // third atomic step goes wrong
        let c = f.c;
        let (steps, resolution) = drive(&mut engine, &f.registry, |expected| {
            if expected == c {
                other
            } else {
                expected
            }
        });

        assert_eq!(steps, 3);
        assert_eq!(
            resolution,
            Resolution::Completed { intention: f.top, reported: Some(top_failure) }
        );
        assert!(engine.is_idle());
    }

    #[test]
    fn test_failure_without_learned_failing_act() {
        let mut f = fixture();
        let other = f.registry.intern_primitive("a", "f", -1).unwrap();
        let mut engine = PrescriptionEngine::new();
        engine.prescribe(&f.registry, Prescription::new(f.top, 1)).unwrap();

        let resolution = engine.resolve_step(&f.registry, other).unwrap();
        assert_eq!(resolution, Resolution::Completed { intention: f.top, reported: None });
        assert!(engine.is_idle());
    }

    #[test]
    fn test_primitive_intention_reports_enacted() {
        let f = fixture();
        let mut engine = PrescriptionEngine::new();
        engine.prescribe(&f.registry, Prescription::new(f.b, 0)).unwrap();

        let resolution = engine.resolve_step(&f.registry, f.c).unwrap();
        assert_eq!(resolution, Resolution::Completed { intention: f.b, reported: Some(f.c) });
    }

    #[test]
    fn test_enacted_pattern_reconstruction() {
        let mut f = fixture();
        let mut engine = PrescriptionEngine::new();
        engine.prescribe(&f.registry, Prescription::new(f.top, 1)).unwrap();
        engine.resolve_step(&f.registry, f.a).unwrap();
        engine.prescribe(&f.registry, Prescription::new(f.b, 1)).unwrap();

        // during (a b): top is still in its context phase
        assert_eq!(engine.enacted_pattern(&mut f.registry, f.b).unwrap(), f.ab);

        engine.resolve_step(&f.registry, f.b).unwrap();
        engine.prescribe(&f.registry, Prescription::new(f.cd, 1)).unwrap();

        // c went wrong while top was in its intention phase
        let wrong = f.registry.intern_primitive("c", "f", -1).unwrap();
        let enacted = engine.enacted_pattern(&mut f.registry, wrong).unwrap();
        let pattern = f.registry.pattern(enacted).unwrap();
        assert_eq!(pattern.parts(), Some((f.ab, wrong)));
        assert_eq!(f.registry.weight(enacted), 0);

        // d as intended completes the whole top-level pattern
        engine.resolve_step(&f.registry, f.c).unwrap();
        engine.prescribe(&f.registry, Prescription::new(f.d, 1)).unwrap();
        assert_eq!(engine.enacted_pattern(&mut f.registry, f.d).unwrap(), f.top);
    }

    #[test]
    fn test_cancel_clears_chain() {
        let f = fixture();
        let mut engine = PrescriptionEngine::new();
        engine.prescribe(&f.registry, Prescription::new(f.top, 1)).unwrap();

        assert_eq!(engine.cancel(), Some(f.top));
        assert!(engine.is_idle());
        assert_eq!(engine.cancel(), None);
    }

    #[test]
    fn test_failure_pattern_runs_intended_structure() {
        let mut f = fixture();
        let failure = f.registry.intern_failure(f.ab, -2).unwrap();
        let mut engine = PrescriptionEngine::new();

        let leaf = engine.prescribe(&f.registry, Prescription::new(failure, 0)).unwrap();
        assert_eq!(leaf, f.a);
        assert_eq!(engine.root(), Some(failure));

        let (steps, resolution) = drive(&mut engine, &f.registry, |expected| expected);
        assert_eq!(steps, 2);
        // the intended structure succeeded, which is not what the failure expected
        assert_eq!(
            resolution,
            Resolution::Completed { intention: failure, reported: Some(f.ab) }
        );
    }

    #[test]
    fn test_expected_failure_matches() {
        let mut f = fixture();
        let failure = f.registry.intern_failure(f.ab, -2).unwrap();
        f.registry.schema_mut(f.ab).unwrap().failing_act = Some(failure);
        let expects_failure = f.registry.intern_composite(f.c, failure).unwrap();
        let wrong = f.registry.intern_primitive("b", "f", -1).unwrap();

        let mut engine = PrescriptionEngine::new();
        engine
            .prescribe(&f.registry, Prescription::new(expects_failure, 5))
            .unwrap();

        let b = f.b;
        let (steps, resolution) = drive(&mut engine, &f.registry, |expected| {
            if expected == b {
                wrong
            } else {
                expected
            }
        });

        assert_eq!(steps, 3);
        assert_eq!(
            resolution,
            Resolution::Completed { intention: expects_failure, reported: Some(expects_failure) }
        );
    }

    #[test]
    fn test_resolve_with_nothing_prescribed_is_an_error() {
        let f = fixture();
        let mut engine = PrescriptionEngine::new();
        assert!(engine.resolve_step(&f.registry, f.a).is_err());
    }
}
