// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use super::pattern::PatternId;

/// A proposal to enact `pattern`, backed by `weight`.
///
/// Two propositions are the same proposition when they propose the same
/// pattern, whatever their weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActProposition {
    pub pattern: PatternId,
    pub weight: i64,
}

impl ActProposition {
    pub fn new(pattern: PatternId, weight: i64) -> Self {
        Self { pattern, weight }
    }
}

impl PartialEq for ActProposition {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for ActProposition {}

/// Vote aggregation: one entry per proposed pattern, weights summed,
/// first-proposal order preserved.
#[derive(Debug, Clone, Default)]
pub struct PropositionSet {
    propositions: Vec<ActProposition>,
}

impl PropositionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn propose(&mut self, pattern: PatternId, weight: i64) {
        match self.propositions.iter_mut().find(|p| p.pattern == pattern) {
            Some(existing) => existing.weight += weight,
            None => self.propositions.push(ActProposition::new(pattern, weight)),
        }
    }

    pub fn extend(&mut self, propositions: impl IntoIterator<Item = ActProposition>) {
        for p in propositions {
            self.propose(p.pattern, p.weight);
        }
    }

    /// Propositions ordered by descending weight. Ties keep proposal order.
    pub fn into_sorted(mut self) -> Vec<ActProposition> {
        self.propositions.sort_by(|a, b| b.weight.cmp(&a.weight));
        self.propositions
    }
}
