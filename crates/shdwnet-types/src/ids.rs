//! The cycle identifier.
//!
//! Cycle ids are UUID v7 (time-ordered) so snapshots sort in the order they
//! were produced.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for one poll cycle and the snapshot it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct CycleId(Uuid);

impl CycleId {
    /// Mint a fresh time-ordered id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The inner UUID.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_ids_are_time_ordered() {
        let first = CycleId::new();
        let second = CycleId::new();
        assert!(first <= second);
        assert_ne!(first, second);
    }

    #[test]
    fn display_is_hyphenated_uuid() {
        let id = CycleId::new();
        assert_eq!(id.to_string(), id.into_inner().hyphenated().to_string());
    }
}
