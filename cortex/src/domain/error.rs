// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use super::pattern::PatternId;

/// Errors raised by the cortex engine.
///
/// An enaction that does not go as intended is never an error: it is routed
/// through the failing branch of the prescription chain. These variants cover
/// malformed input and internal consistency faults only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CortexError {
    #[error("Invalid interaction symbol {0:?}: symbols must be non-empty and may not contain '(', ')' or '!'")]
    InvalidSymbol(String),

    #[error("Label {label:?} is already bound to pattern {existing:?} with a different structure")]
    LabelCollision { label: String, existing: PatternId },

    #[error("Unknown pattern {0:?}")]
    UnknownPattern(PatternId),

    #[error("Pattern {0:?} cannot be enacted at this point of the hierarchy")]
    NotEnactable(PatternId),

    #[error("No prescription is in flight")]
    NothingPrescribed,

    #[error("The innate repertoire is empty: at least one primitive interaction is required")]
    EmptyRepertoire,

    #[error("Invalid configuration: {0}")]
    Config(String),
}
