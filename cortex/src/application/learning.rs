// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Contract between the decision loop and the component that learns
//! composite patterns.
//!
//! The decision loop owns the [`PatternRegistry`] and lends it to the learning
//! engine for the duration of each call. Only a learning engine writes to the
//! learned state of patterns ([`Schema`](crate::domain::Schema)).

use crate::domain::{ActProposition, CortexError, PatternId, PatternRegistry};

pub trait LearningEngine {
    /// Create or reinforce the composite `(c, terminal)` for every `c` in
    /// `context`, in context order.
    ///
    /// Returns the composites that were created or reinforced. The first one
    /// is the stream act of the cycle.
    fn reinforce(
        &mut self,
        registry: &mut PatternRegistry,
        context: &[PatternId],
        terminal: PatternId,
    ) -> Result<Vec<PatternId>, CortexError>;

    /// Record that `intended` did not complete as expected, worth
    /// `satisfaction`. Returns the failure pattern now attached to
    /// `intended` as its failing act.
    fn synthesize_failure(
        &mut self,
        registry: &mut PatternRegistry,
        intended: PatternId,
        satisfaction: i64,
    ) -> Result<PatternId, CortexError>;

    /// Vote for the next intention from the patterns in `activation`.
    fn propose_candidates(
        &self,
        registry: &PatternRegistry,
        activation: &[PatternId],
    ) -> Result<Vec<ActProposition>, CortexError>;
}
