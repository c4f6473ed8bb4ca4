// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Working memory of the decision loop.
//!
//! - **context**: every pattern relevant to the cycle in progress; the input
//!   of the first learning pass.
//! - **activation**: the part of the context allowed to propose the next
//!   intention.
//! - **base context**: the previous cycle's context, the input of the delayed
//!   (streamed) learning pass.
//!
//! All three lists keep insertion order and hold no duplicates.

use serde::{Deserialize, Serialize};

use super::pattern::PatternId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkingMemory {
    context: Vec<PatternId>,
    activation: Vec<PatternId>,
    base_context: Vec<PatternId>,
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &[PatternId] {
        &self.context
    }

    pub fn activation(&self) -> &[PatternId] {
        &self.activation
    }

    pub fn base_context(&self) -> &[PatternId] {
        &self.base_context
    }

    /// Add to the context only.
    pub fn add_context(&mut self, patterns: &[PatternId]) {
        for &p in patterns {
            push_unique(&mut self.context, p);
        }
    }

    /// Add to both the context and the activation list.
    pub fn add_activation(&mut self, pattern: PatternId) {
        push_unique(&mut self.context, pattern);
        push_unique(&mut self.activation, pattern);
    }

    /// Close a decision cycle and open the next one.
    ///
    /// The context becomes the base context. The activation list is rebuilt
    /// from the enacted pattern, the performed pattern when it differs, and
    /// the enacted pattern's intention when it is a composite. `streamed` is
    /// what the first learning pass produced.
    pub fn shift(
        &mut self,
        enacted: PatternId,
        performed: PatternId,
        enacted_intention: Option<PatternId>,
        streamed: &[PatternId],
    ) {
        self.base_context = std::mem::take(&mut self.context);
        self.activation.clear();

        self.add_activation(enacted);
        if performed != enacted {
            self.add_activation(performed);
        }
        if let Some(intention) = enacted_intention {
            self.add_activation(intention);
        }
        self.add_context(streamed);
    }
}

fn push_unique(list: &mut Vec<PatternId>, pattern: PatternId) {
    if !list.contains(&pattern) {
        list.push(pattern);
    }
}
