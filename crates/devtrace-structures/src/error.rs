// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while interpreting device trace data.
///
/// Encoding overflow is deliberately absent: packing an out-of-range field aliases silently
/// and is never reported.
///
/// # Examples
/// ```
/// use devtrace_structures::address::execution_unit_index;
/// use devtrace_structures::StructuresError;
///
/// assert_eq!(execution_unit_index("TRISC_1").unwrap(), 3);
/// assert!(matches!(
///     execution_unit_index("DSP"),
///     Err(StructuresError::UnknownExecutionUnit(_))
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuresError {
    /// Name does not match any known execution unit
    #[error("Unknown execution unit: {0}")]
    UnknownExecutionUnit(String),

    /// Name does not match any marker phase
    #[error("Unknown marker phase: {0}")]
    UnknownPhase(String),
}

pub type StructuresResult<T> = Result<T, StructuresError>;
