// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Cortex Application Layer
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`prescription`] | Execute a pattern one atomic step at a time |
//! | [`selector`] | Weighted vote with random tie-break, activation spreading |
//! | [`learning`] | `LearningEngine` contract |
//! | [`episodic_memory`] | Default `LearningEngine` |
//! | [`controller`] | Decision-cycle tick loop |

pub mod controller;
pub mod episodic_memory;
pub mod learning;
pub mod prescription;
pub mod selector;

pub use controller::DecisionCycleController;
pub use episodic_memory::EpisodicMemory;
pub use learning::LearningEngine;
pub use prescription::{PrescriptionEngine, Resolution};
pub use selector::{select, spread_activation};
