//! Fatal simulation failures.

use thiserror::Error;

/// Conditions that indicate corrupted static data and end the simulation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// A spawn request named a type beyond the end of the type table.
    #[error("actor type {kind} is outside the type table ({count} entries)")]
    UnknownActorType {
        /// Offending type index.
        kind: u16,
        /// Number of entries in the type table.
        count: usize,
    },
    /// A chain of zero-duration states did not settle.
    #[error("actor type {kind} exceeded {limit} state transitions while entering state {state}")]
    StateRecursion {
        /// Type of the actor being advanced.
        kind: u16,
        /// State that would have been entered next.
        state: u16,
        /// Maximum number of transitions in one advance.
        limit: u32,
    },
    /// A state link pointed beyond the end of the state table.
    #[error("actor type {kind} referenced state {state} outside the state table")]
    UnknownState {
        /// Type of the actor being advanced.
        kind: u16,
        /// Offending state index.
        state: u16,
    },
}
