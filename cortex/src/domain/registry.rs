// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Pattern Registry
//!
//! Canonical, deduplicated store of every pattern the agent has ever
//! encountered. Patterns are interned by label and never removed; the
//! registry hands out [`PatternId`] arena indices so that equal structures
//! always resolve to the very same entry.
//!
//! ## Labels
//!
//! | Kind | Label |
//! |------|-------|
//! | Primitive | `action + result`, e.g. `>t` |
//! | Composite | `(` + context label + intention label + `)` |
//! | Failure | `!` + intended label |
//!
//! The registry is owned by a single decision loop and is not synchronized.

use std::collections::HashMap;

use tracing::debug;

use super::error::CortexError;
use super::pattern::{Pattern, PatternId, PatternKind, Schema};

/// Default weight of primitive interactions.
pub const DEFAULT_PRIMITIVE_WEIGHT: i64 = 100;

#[derive(Debug, Clone)]
pub struct PatternRegistry {
    patterns: Vec<Pattern>,
    schemas: Vec<Schema>,
    by_label: HashMap<String, PatternId>,
    by_context: HashMap<PatternId, Vec<PatternId>>,
    primitive_weight: i64,
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMITIVE_WEIGHT)
    }
}

impl PatternRegistry {
    pub fn new(primitive_weight: i64) -> Self {
        Self {
            patterns: Vec::new(),
            schemas: Vec::new(),
            by_label: HashMap::new(),
            by_context: HashMap::new(),
            primitive_weight,
        }
    }

    /// Return the canonical primitive for `action + result`, creating it with
    /// `value` on first request. Later calls ignore `value`.
    pub fn intern_primitive(
        &mut self,
        action: &str,
        result: &str,
        value: i64,
    ) -> Result<PatternId, CortexError> {
        validate_symbol(action)?;
        validate_symbol(result)?;

        let label = format!("{action}{result}");
        let kind = PatternKind::Primitive {
            action: action.to_string(),
            result: result.to_string(),
        };
        let weight = self.primitive_weight;
        let (id, created) = self.insert(kind, label, value, 1, weight)?;
        if created {
            debug!(pattern = %self.patterns[id.0], "Defined primitive pattern");
        } else if self.patterns[id.0].value != value {
            debug!(
                label = %self.patterns[id.0].label,
                interned_value = self.patterns[id.0].value,
                observed_value = value,
                "Observed value differs from interned primitive value"
            );
        }
        Ok(id)
    }

    /// Return the canonical composite `(context, intention)`, creating it on
    /// first request with summed value and length.
    pub fn intern_composite(
        &mut self,
        context: PatternId,
        intention: PatternId,
    ) -> Result<PatternId, CortexError> {
        let (label, value, length) = {
            let pre = self.pattern(context)?;
            let post = self.pattern(intention)?;
            (
                composite_label(&pre.label, &post.label),
                pre.value + post.value,
                pre.length + post.length,
            )
        };

        let (id, created) =
            self.insert(PatternKind::Composite { context, intention }, label, value, length, 0)?;
        if created {
            self.by_context.entry(context).or_default().push(id);
        }
        Ok(id)
    }

    /// Return the canonical failure pattern standing for "`intended` did not
    /// complete as expected", carrying `value` from its first synthesis.
    pub fn intern_failure(
        &mut self,
        intended: PatternId,
        value: i64,
    ) -> Result<PatternId, CortexError> {
        let (label, length) = {
            let pattern = self.pattern(intended)?;
            (failure_label(&pattern.label), pattern.length)
        };
        let (id, _) = self.insert(PatternKind::Failure { intended }, label, value, length, 0)?;
        Ok(id)
    }

    fn insert(
        &mut self,
        kind: PatternKind,
        label: String,
        value: i64,
        length: usize,
        weight: i64,
    ) -> Result<(PatternId, bool), CortexError> {
        if let Some(&existing) = self.by_label.get(&label) {
            if self.patterns[existing.0].kind != kind {
                return Err(CortexError::LabelCollision { label, existing });
            }
            return Ok((existing, false));
        }

        let id = PatternId(self.patterns.len());
        self.by_label.insert(label.clone(), id);
        self.patterns.push(Pattern {
            id,
            kind,
            label,
            value,
            length,
        });
        self.schemas.push(Schema::new(weight));
        Ok((id, true))
    }

    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(id.0)
    }

    pub fn pattern(&self, id: PatternId) -> Result<&Pattern, CortexError> {
        self.patterns.get(id.0).ok_or(CortexError::UnknownPattern(id))
    }

    pub fn schema(&self, id: PatternId) -> Result<&Schema, CortexError> {
        self.schemas.get(id.0).ok_or(CortexError::UnknownPattern(id))
    }

    /// Learned state of a pattern. Reserved for learning engines.
    pub fn schema_mut(&mut self, id: PatternId) -> Result<&mut Schema, CortexError> {
        self.schemas.get_mut(id.0).ok_or(CortexError::UnknownPattern(id))
    }

    pub fn weight(&self, id: PatternId) -> i64 {
        self.schemas.get(id.0).map(|s| s.weight).unwrap_or(0)
    }

    pub fn label(&self, id: PatternId) -> &str {
        self.patterns.get(id.0).map(|p| p.label.as_str()).unwrap_or("?")
    }

    /// Pattern whose structure is executed when `id` is enacted. A failure is
    /// enacted by attempting the pattern it stands for.
    pub fn structure(&self, id: PatternId) -> Result<PatternId, CortexError> {
        let mut current = id;
        while let PatternKind::Failure { intended } = self.pattern(current)?.kind {
            current = intended;
        }
        Ok(current)
    }

    /// Action symbol sent to the effectors when `id` is the pending primitive.
    pub fn action_of(&self, id: PatternId) -> Result<&str, CortexError> {
        let structure = self.structure(id)?;
        self.pattern(structure)?
            .action()
            .ok_or(CortexError::NotEnactable(id))
    }

    pub fn find(&self, label: &str) -> Option<PatternId> {
        self.by_label.get(label).copied()
    }

    /// Look up a composite without creating it.
    pub fn find_composite(&self, context: PatternId, intention: PatternId) -> Option<PatternId> {
        let pre = self.get(context)?;
        let post = self.get(intention)?;
        self.find(&composite_label(&pre.label, &post.label))
    }

    /// Composites whose context sub-pattern is `context`, in creation order.
    pub fn composites_with_context(&self, context: PatternId) -> &[PatternId] {
        self.by_context.get(&context).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &Schema)> {
        self.patterns.iter().zip(self.schemas.iter())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn primitive_count(&self) -> usize {
        self.patterns.iter().filter(|p| p.is_primitive()).count()
    }

    pub fn composite_count(&self) -> usize {
        self.patterns.iter().filter(|p| p.is_composite()).count()
    }
}

/// Interaction symbols must be non-empty and free of label delimiters.
pub(crate) fn validate_symbol(symbol: &str) -> Result<(), CortexError> {
    if symbol.is_empty() || symbol.contains(['(', ')', '!']) {
        return Err(CortexError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}

fn composite_label(context: &str, intention: &str) -> String {
    format!("({context}{intention})")
}

fn failure_label(intended: &str) -> String {
    format!("!{intended}")
}
