//! Generic BND pairing primitive, parameterized by key direction and
//! collision policy (C4).
//!
//! Two named instantiations cover every use in the correction engine:
//! [`find_mate_pairs`] (mate BND, at-most-one, reverse/swapped key) and
//! [`find_same_direction_pairs`] (forward key, at-most-one).

use indexmap::IndexMap;

use crate::record::Record;

type Key = (String, i64, String, i64);

fn own_key(chrom: &str, pos: i64, mate_chrom: &str, mate_pos: i64) -> Key {
    (chrom.to_string(), pos, mate_chrom.to_string(), mate_pos)
}

/// Candidate reverse keys: `(mate_chrom, mate_pos + i, chrom, pos + j)` for
/// `(i, j)` in `[-t, t]^2`, row-major, `i`/`j` ascending.
fn swap_candidates(chrom: &str, pos: i64, mate_chrom: &str, mate_pos: i64, tol: i64) -> Vec<Key> {
    let mut out = Vec::with_capacity(((2 * tol + 1) * (2 * tol + 1)) as usize);
    for i in -tol..=tol {
        for j in -tol..=tol {
            out.push((mate_chrom.to_string(), mate_pos + i, chrom.to_string(), pos + j));
        }
    }
    out
}

/// Candidate forward keys: `(chrom, pos + i, mate_chrom, mate_pos + j)` for
/// `(i, j)` in `[-t, t]^2`, row-major, `i`/`j` ascending.
fn forward_candidates(
    chrom: &str,
    pos: i64,
    mate_chrom: &str,
    mate_pos: i64,
    tol: i64,
) -> Vec<Key> {
    let mut out = Vec::with_capacity(((2 * tol + 1) * (2 * tol + 1)) as usize);
    for i in -tol..=tol {
        for j in -tol..=tol {
            out.push((chrom.to_string(), pos + i, mate_chrom.to_string(), mate_pos + j));
        }
    }
    out
}

fn skip_unparseable(r: &Record) {
    tracing::info!(
        "record {} on {}:{} has unparseable BND ALT {:?}; skipped from pairing",
        r.id,
        r.chrom,
        r.pos,
        r.alt
    );
}

/// Shared at-most-one engine: a key maps to at most one stored record index;
/// a reverse- (or forward-) key hit pops the stored record and emits a pair;
/// a miss inserts the current record at its own forward key, replacing
/// whatever was previously stored there.
fn pair_at_most_one(
    records: Vec<Record>,
    tol: i64,
    candidates_of: impl Fn(&str, i64, &str, i64, i64) -> Vec<Key>,
) -> (Vec<(Record, Record)>, Vec<Record>) {
    let mut map: IndexMap<Key, usize> = IndexMap::new();
    let mut consumed = vec![false; records.len()];
    let mut pairs = Vec::new();

    for (idx, r) in records.iter().enumerate() {
        let mate = match r.mate() {
            Some(m) => m,
            None => {
                skip_unparseable(r);
                continue;
            }
        };
        let candidates = candidates_of(&r.chrom, r.pos, &mate.mate_chrom, mate.mate_pos, tol);
        let found = candidates.into_iter().find_map(|key| {
            map.get(&key)
                .copied()
                .filter(|&stored_idx| !consumed[stored_idx])
                .map(|stored_idx| (key, stored_idx))
        });

        if let Some((key, stored_idx)) = found {
            consumed[stored_idx] = true;
            consumed[idx] = true;
            map.shift_remove(&key);
            pairs.push((records[stored_idx].clone(), records[idx].clone()));
        } else {
            let key = own_key(&r.chrom, r.pos, &mate.mate_chrom, mate.mate_pos);
            map.insert(key, idx);
        }
    }

    let leftovers = records
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !consumed[*i])
        .map(|(_, r)| r)
        .collect();
    (pairs, leftovers)
}

/// Mate BND: at-most-one collision policy over the reverse (swapped) key.
/// Used for cross-chromosome mate discovery (§4.6 step 1).
pub fn find_mate_pairs(records: Vec<Record>, tol: i64) -> (Vec<(Record, Record)>, Vec<Record>) {
    pair_at_most_one(records, tol, swap_candidates)
}

/// Same-direction pairing: at-most-one collision policy over the forward
/// key, so two records whose source and target coordinates both fall within
/// tolerance are paired (§4.6 step 2 "special_no_mate_diff_bnd_pair").
pub fn find_same_direction_pairs(
    records: Vec<Record>,
    tol: i64,
) -> (Vec<(Record, Record)>, Vec<Record>) {
    pair_at_most_one(records, tol, forward_candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn bnd(chrom: &str, pos: i64, id: &str, alt: &str) -> Record {
        Record {
            chrom: chrom.into(),
            pos,
            id: id.into(),
            reference: "N".into(),
            alt: alt.into(),
            qual: None,
            filter: "PASS".into(),
            info: IndexMap::new(),
            format: vec![],
            sample: IndexMap::new(),
            source: "a.vcf".into(),
        }
    }

    #[test]
    fn mate_pairs_exact_match() {
        let a = bnd("chr1", 1000, "a", "N[chr2:500[");
        let b = bnd("chr2", 500, "b", "N[chr1:1000[");
        let (pairs, leftover) = find_mate_pairs(vec![a.clone(), b.clone()], 3);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.id, "a");
        assert_eq!(pairs[0].1.id, "b");
        assert!(leftover.is_empty());
    }

    #[test]
    fn mate_pairs_within_tolerance() {
        let a = bnd("chr1", 1000, "a", "N[chr2:500[");
        let b = bnd("chr2", 502, "b", "N[chr1:998[");
        let (pairs, leftover) = find_mate_pairs(vec![a, b], 3);
        assert_eq!(pairs.len(), 1);
        assert!(leftover.is_empty());
    }

    #[test]
    fn mate_pairs_singleton_leftover() {
        let a = bnd("chr1", 1000, "a", "N[chr2:500[");
        let (pairs, leftover) = find_mate_pairs(vec![a], 3);
        assert!(pairs.is_empty());
        assert_eq!(leftover.len(), 1);
    }

    #[test]
    fn unparseable_records_are_skipped_not_fatal() {
        let bad = bnd("chr1", 1000, "bad", "not-a-bnd");
        let (pairs, leftover) = find_mate_pairs(vec![bad], 3);
        assert!(pairs.is_empty());
        // Skipped from pairing, but never dropped from the record set (§4.3/§4.4):
        // it surfaces as a leftover so the caller can still retain it in output.
        assert_eq!(leftover.len(), 1);
    }
}
