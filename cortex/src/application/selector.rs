// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Weighted-vote intention selection and top-down activation spreading.

use rand::Rng;
use tracing::trace;

use super::prescription::PrescriptionEngine;
use crate::domain::{ActProposition, CortexError, PatternId, PatternRegistry, Prescription};

/// Pick the winning proposition: the highest weight, ties broken uniformly at
/// random.
///
/// # Panics
///
/// Panics if `candidates` is empty. Callers always append the innate
/// repertoire, so an empty list is a programming error.
pub fn select<R: Rng>(mut candidates: Vec<ActProposition>, rng: &mut R) -> ActProposition {
    assert!(!candidates.is_empty(), "select called with no candidates");

    candidates.sort_by(|a, b| b.weight.cmp(&a.weight));
    let best = candidates[0].weight;
    let tied = candidates.iter().take_while(|c| c.weight == best).count();
    let pick = if tied > 1 { rng.random_range(0..tied) } else { 0 };

    trace!(tied, pick, weight = best, "Selected among top candidates");
    candidates.swap_remove(pick)
}

/// Descend from `prescription` to the primitive to attempt next. Every frame
/// on the way down carries the same activation.
pub fn spread_activation(
    engine: &mut PrescriptionEngine,
    registry: &PatternRegistry,
    prescription: Prescription,
) -> Result<PatternId, CortexError> {
    let leaf = engine.prescribe(registry, prescription)?;
    trace!(
        intention = registry.label(prescription.pattern),
        leaf = registry.label(leaf),
        activation = prescription.activation,
        "Spread activation"
    );
    Ok(leaf)
}
