// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for type-erased storage.

use thiserror::Error;

/// Violations of the [`ErasedSlot`](super::ErasedSlot) contract.
///
/// A slot is filled exactly once and emptied exactly once; each error names
/// the types involved so a broken invoker can be traced back to its function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// `put` on a slot that already holds a value.
    #[error("slot already holds a value of type {held}")]
    SlotOccupied { held: &'static str },

    /// `take` on a slot that holds nothing.
    #[error("slot is empty, expected a value of type {expected}")]
    SlotEmpty { expected: &'static str },

    /// `take` asked for a different type than the one stored.
    #[error("slot holds a value of type {found}, expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
