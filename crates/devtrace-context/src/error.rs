// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for context operations
//!
//! Hot-path operations never fail. A broken ring invariant is an internal defect and panics
//! instead of surfacing here.

/// Errors returned by context setup and calibration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    /// Clock frequency must be finite and positive
    #[error("Invalid device clock frequency: {0} (must be finite and > 0)")]
    InvalidFrequency(f64),

    /// Context names travel with a 16-bit length
    #[error("Context name is {len} bytes, the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    /// The ring needs two slots to keep head and tail apart
    #[error("Ring capacity {0} is too small, at least 2 slots are required")]
    CapacityTooSmall(usize),

    /// Handles are 32-bit
    #[error("Ring capacity {0} does not fit the handle range")]
    CapacityTooLarge(usize),
}

pub type ContextResult<T> = Result<T, ContextError>;
