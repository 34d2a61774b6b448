//! Book activity counters.

use std::fmt;

use serde::Serialize;

/// Counters describing what a book has processed since construction.
///
/// Plain integers: the book is mutated from one owner at a time, so no
/// atomics are needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BookStats {
    pub snapshots_applied: u64,
    pub deltas_applied: u64,
    pub deltas_rejected: u64,
    pub levels_upserted: u64,
    pub levels_deleted: u64,
    pub levels_trimmed: u64,
}

impl fmt::Display for BookStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "snapshots={} deltas={} rejected={} upserted={} deleted={} trimmed={}",
            self.snapshots_applied,
            self.deltas_applied,
            self.deltas_rejected,
            self.levels_upserted,
            self.levels_deleted,
            self.levels_trimmed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let stats = BookStats {
            snapshots_applied: 1,
            deltas_applied: 2,
            deltas_rejected: 1,
            levels_upserted: 14,
            levels_deleted: 0,
            levels_trimmed: 15,
        };
        assert_eq!(
            stats.to_string(),
            "snapshots=1 deltas=2 rejected=1 upserted=14 deleted=0 trimmed=15"
        );
    }
}
