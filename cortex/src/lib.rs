// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Enactive decision core
//!
//! Interns sensorimotor patterns, executes them one atomic step at a time,
//! selects intentions by weighted vote and learns composite patterns at the
//! end of every decision cycle.
//!
//! # Architecture
//!
//! - **Layer:** Learning & Memory Layer
//! - **Purpose:** Implements the agent's decision-learning loop
//!
//! ```text
//! outcome ──▶ PrescriptionEngine ──▶ (cycle closed?) LearningEngine
//!                                          │
//! action ◀── spread_activation ◀── select ◀┘
//! ```

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
pub use application::*;
pub use infrastructure::*;
