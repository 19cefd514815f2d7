//! Buffered interval conflict predicate.
//!
//! This is the sole definition of "same-gate incompatible". It is used both
//! for scanning a schedule for pre-existing conflicts and for building the
//! pairwise exclusion constraints of the assignment model.

use crate::domain::GateWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The windows overlap in time.
    Overlap,
    /// The windows are disjoint but the gap between them is below the
    /// required buffer.
    InsufficientGap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConflict {
    pub kind: ConflictKind,
    /// Overlap length for `Overlap`, actual gap for `InsufficientGap`,
    /// in minutes.
    pub magnitude: i32,
}

/// Test whether two occupation windows may share a gate.
///
/// Returns `None` when the windows are separated by at least `buffer`
/// minutes. Symmetric in its window arguments.
pub fn gate_conflict(a: GateWindow, b: GateWindow, buffer: i32) -> Option<GateConflict> {
    if a.end <= b.start {
        let gap = b.start - a.end;
        if gap < buffer {
            return Some(GateConflict {
                kind: ConflictKind::InsufficientGap,
                magnitude: gap,
            });
        }
        return None;
    }
    if b.end <= a.start {
        let gap = a.start - b.end;
        if gap < buffer {
            return Some(GateConflict {
                kind: ConflictKind::InsufficientGap,
                magnitude: gap,
            });
        }
        return None;
    }
    Some(GateConflict {
        kind: ConflictKind::Overlap,
        magnitude: a.end.min(b.end) - a.start.max(b.start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(start: i32, end: i32) -> GateWindow {
        GateWindow { start, end }
    }

    #[test]
    fn detects_overlap_with_magnitude() {
        let c = gate_conflict(w(600, 660), w(630, 690), 30).unwrap();
        assert_eq!(c.kind, ConflictKind::Overlap);
        assert_eq!(c.magnitude, 30);
    }

    #[test]
    fn detects_short_gap() {
        let c = gate_conflict(w(600, 660), w(670, 730), 30).unwrap();
        assert_eq!(c.kind, ConflictKind::InsufficientGap);
        assert_eq!(c.magnitude, 10);
    }

    #[test]
    fn gap_at_buffer_is_clear() {
        assert!(gate_conflict(w(600, 660), w(690, 750), 30).is_none());
        // One minute short of the buffer still conflicts.
        assert!(gate_conflict(w(600, 660), w(689, 749), 30).is_some());
    }

    #[test]
    fn touching_windows_conflict_under_buffer() {
        let c = gate_conflict(w(600, 660), w(660, 720), 30).unwrap();
        assert_eq!(c.kind, ConflictKind::InsufficientGap);
        assert_eq!(c.magnitude, 0);
    }

    #[test]
    fn predicate_is_symmetric() {
        let a = w(600, 660);
        let b = w(630, 690);
        assert_eq!(gate_conflict(a, b, 30), gate_conflict(b, a, 30));
        let c = w(700, 760);
        assert_eq!(gate_conflict(a, c, 30), gate_conflict(c, a, 30));
    }

    #[test]
    fn containment_counts_full_inner_window() {
        let c = gate_conflict(w(600, 720), w(630, 660), 30).unwrap();
        assert_eq!(c.kind, ConflictKind::Overlap);
        assert_eq!(c.magnitude, 30);
    }
}
