// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Cortex Domain Layer
//!
//! Pure domain types of the decision core. No I/O apart from configuration
//! file loading.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`pattern`] | `Pattern`, `PatternId`, `PatternKind`, `Schema` |
//! | [`registry`] | `PatternRegistry` |
//! | [`frame`] | `ExecutionFrame`, `Prescription`, `Step` |
//! | [`proposition`] | `ActProposition`, `PropositionSet` |
//! | [`working_memory`] | `WorkingMemory` |
//! | [`outcome`] | `Outcome`, `Decision`, `CycleReport` |
//! | [`events`] | `CortexEvent`, `SessionId` |
//! | [`config`] | `AgentConfigManifest` |

pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod outcome;
pub mod pattern;
pub mod proposition;
pub mod registry;
pub mod working_memory;

pub use config::*;
pub use error::*;
pub use events::*;
pub use frame::*;
pub use outcome::*;
pub use pattern::*;
pub use proposition::*;
pub use registry::*;
pub use working_memory::*;
