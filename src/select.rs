//! Deterministic representative selection for a cluster group (C9).

use crate::record::Record;

/// Rank a candidate against the current best: support (missing → 0), QUAL
/// (missing → -inf), |SVLEN| (missing → 0), then lexicographically smallest
/// source and record id as a final tie-break.
fn is_better(candidate: &Record, current_best: &Record) -> bool {
    use std::cmp::Ordering;

    let by_support = candidate
        .support()
        .unwrap_or(0)
        .cmp(&current_best.support().unwrap_or(0));
    if by_support != Ordering::Equal {
        return by_support == Ordering::Greater;
    }

    let by_qual = candidate
        .qual
        .unwrap_or(f64::NEG_INFINITY)
        .total_cmp(&current_best.qual.unwrap_or(f64::NEG_INFINITY));
    if by_qual != Ordering::Equal {
        return by_qual == Ordering::Greater;
    }

    let by_svlen = candidate
        .svlen()
        .unwrap_or(0)
        .cmp(&current_best.svlen().unwrap_or(0));
    if by_svlen != Ordering::Equal {
        return by_svlen == Ordering::Greater;
    }

    let by_source = candidate.source.cmp(&current_best.source);
    if by_source != Ordering::Equal {
        return by_source == Ordering::Less;
    }

    candidate.id < current_best.id
}

/// Pick the group's representative by linear scan, each candidate compared
/// against the best seen so far.
pub fn select_representative(group: &[Record]) -> &Record {
    let mut best = &group[0];
    for candidate in &group[1..] {
        if is_better(candidate, best) {
            best = candidate;
        }
    }
    best
}
