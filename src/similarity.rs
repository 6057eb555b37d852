//! Type-specific "should merge" predicates (C7).

use crate::record::Record;

/// A record's genomic interval, used by the intra-chromosomal predicate.
/// `end` falls back to `pos` when INFO/END is absent (e.g. a residual
/// single-point breakend slipping through as non-BND would not reach here,
/// but INS records commonly carry no END).
fn interval(record: &Record) -> (i64, i64) {
    let start = record.pos;
    let end = record.end().unwrap_or(start);
    if start <= end {
        (start, end)
    } else {
        (end, start)
    }
}

/// Jaccard index of two closed integer intervals: `|A ∩ B| / |A ∪ B|`.
pub fn interval_jaccard(a: (i64, i64), b: (i64, i64)) -> f64 {
    let inter_start = a.0.max(b.0);
    let inter_end = a.1.min(b.1);
    let inter = if inter_end >= inter_start {
        (inter_end - inter_start + 1) as f64
    } else {
        0.0
    };
    let union_start = a.0.min(b.0);
    let union_end = a.1.max(b.1);
    let union = (union_end - union_start + 1) as f64;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Reciprocal overlap of two half-open ranges: `min(ovl/len1, ovl/len2)`.
fn reciprocal_overlap(lhs: (i64, i64), rhs: (i64, i64)) -> f64 {
    let ovl_b = lhs.0.max(rhs.0);
    let ovl_e = lhs.1.min(rhs.1);
    if ovl_b >= ovl_e {
        0.0
    } else {
        let ovl_len = (ovl_e - ovl_b) as f64;
        let l1 = (lhs.1 - lhs.0) as f64;
        let l2 = (rhs.1 - rhs.0) as f64;
        (ovl_len / l1).min(ovl_len / l2)
    }
}

fn window(pos: i64, delta: i64) -> (i64, i64) {
    (pos - delta, pos + delta + 1)
}

/// Parameters for the intra-chromosomal (DEL/DUP/INV/INS) predicate.
#[derive(Debug, Clone, Copy)]
pub struct IntraChromParams {
    pub max_distance: i64,
    pub max_length_ratio: f64,
    pub min_jaccard: f64,
}

/// Same svtype, start/end within `max_distance`, length ratio within
/// `max_length_ratio`, interval Jaccard at least `min_jaccard`. The first
/// mismatch short-circuits to `false`.
pub fn intra_chromosomal_match(a: &Record, b: &Record, p: &IntraChromParams) -> bool {
    if a.svtype() != b.svtype() {
        return false;
    }
    let (sa, ea) = interval(a);
    let (sb, eb) = interval(b);
    if (sa - sb).abs() > p.max_distance || (ea - eb).abs() > p.max_distance {
        return false;
    }
    let len_or_one = |s: i64, e: i64| {
        let len = (e - s) as f64;
        if len == 0.0 {
            1.0
        } else {
            len
        }
    };
    let la = len_or_one(sa, ea);
    let lb = len_or_one(sb, eb);
    let ratio = la.max(lb) / la.min(lb);
    if ratio > p.max_length_ratio {
        return false;
    }
    interval_jaccard((sa, ea), (sb, eb)) >= p.min_jaccard
}

/// Parameters for the TRA predicate.
#[derive(Debug, Clone, Copy)]
pub struct TraParams {
    pub tra_delta: i64,
    pub tra_min_overlap_ratio: f64,
    pub tra_strand_consistency: bool,
}

/// Same unordered chromosome pair, both breakend positions within
/// `tra_delta`, normalized mate-pair overlap at least
/// `tra_min_overlap_ratio`, and (if required) matching INFO/STRAND.
pub fn tra_match(a: &Record, b: &Record, p: &TraParams) -> bool {
    let (Some(a_chr2), Some(b_chr2)) = (a.chr2(), b.chr2()) else {
        return false;
    };
    let (Some(a_end), Some(b_end)) = (a.end(), b.end()) else {
        return false;
    };

    let same_pair = (a.chrom.as_str(), a_chr2) == (b.chrom.as_str(), b_chr2)
        || (a.chrom.as_str(), a_chr2) == (b_chr2, b.chrom.as_str());
    if !same_pair {
        return false;
    }

    let (pos_a, pos_a2, pos_b, pos_b2) = if a.chrom == b.chrom {
        (a.pos, b.pos, a_end, b_end)
    } else {
        (a.pos, b_end, a_end, b.pos)
    };

    if (pos_a - pos_a2).abs() > p.tra_delta || (pos_b - pos_b2).abs() > p.tra_delta {
        return false;
    }

    let overlap_a = reciprocal_overlap(window(pos_a, p.tra_delta), window(pos_a2, p.tra_delta));
    let overlap_b = reciprocal_overlap(window(pos_b, p.tra_delta), window(pos_b2, p.tra_delta));
    if overlap_a.min(overlap_b) < p.tra_min_overlap_ratio {
        return false;
    }

    if p.tra_strand_consistency && a.info.get("STRAND") != b.info.get("STRAND") {
        return false;
    }

    true
}

/// Parameters for the residual-BND predicate.
#[derive(Debug, Clone, Copy)]
pub struct BndParams {
    pub bnd_delta: i64,
}

/// Identical orientation pattern (no reciprocal equivalence), same source
/// and mate chromosome, both positions within `bnd_delta`.
pub fn bnd_match(a: &Record, b: &Record, p: &BndParams) -> bool {
    let (Some(ma), Some(mb)) = (a.mate(), b.mate()) else {
        return false;
    };
    if ma.pattern != mb.pattern {
        return false;
    }
    if a.chrom != b.chrom || ma.mate_chrom != mb.mate_chrom {
        return false;
    }
    (a.pos - b.pos).abs() <= p.bnd_delta && (ma.mate_pos - mb.mate_pos).abs() <= p.bnd_delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn del_record(pos: i64, end: i64, source: &str) -> Record {
        let mut info = IndexMap::new();
        info.insert("SVTYPE".into(), "DEL".into());
        info.insert("END".into(), end.to_string());
        info.insert("SVLEN".into(), (end - pos).to_string());
        Record {
            chrom: "chr1".into(),
            pos,
            id: format!("{source}:{pos}"),
            reference: "N".into(),
            alt: "<DEL>".into(),
            qual: None,
            filter: "PASS".into(),
            info,
            format: vec![],
            sample: IndexMap::new(),
            source: source.into(),
        }
    }

    #[test]
    fn jaccard_self_is_one() {
        assert!(approx_eq!(f64, interval_jaccard((100, 300), (100, 300)), 1.0));
    }

    #[test]
    fn intra_chromosomal_self_match_with_defaults() {
        let p = IntraChromParams {
            max_distance: 50,
            max_length_ratio: 1.3,
            min_jaccard: 0.7,
        };
        let a = del_record(100, 300, "a.vcf");
        assert!(intra_chromosomal_match(&a, &a, &p));
    }

    #[test]
    fn scenario_1_two_near_identical_dels_merge() {
        let p = IntraChromParams {
            max_distance: 50,
            max_length_ratio: 1.3,
            min_jaccard: 0.7,
        };
        let a = del_record(100, 300, "a.vcf");
        let b = del_record(110, 305, "b.vcf");
        assert!(intra_chromosomal_match(&a, &b, &p));
    }

    #[test]
    fn intra_chromosomal_rejects_different_svtype() {
        let p = IntraChromParams {
            max_distance: 50,
            max_length_ratio: 1.3,
            min_jaccard: 0.7,
        };
        let a = del_record(100, 300, "a.vcf");
        let mut b = del_record(100, 300, "b.vcf");
        b.info.insert("SVTYPE".into(), "DUP".into());
        assert!(!intra_chromosomal_match(&a, &b, &p));
    }

    #[test]
    fn bnd_match_requires_identical_pattern() {
        let p = BndParams { bnd_delta: 50 };
        let mut info = IndexMap::new();
        info.insert("SVTYPE".into(), "BND".into());
        let a = Record {
            chrom: "chr1".into(),
            pos: 100,
            id: "a".into(),
            reference: "N".into(),
            alt: "N[chr2:500[".into(),
            qual: None,
            filter: "PASS".into(),
            info: info.clone(),
            format: vec![],
            sample: IndexMap::new(),
            source: "a.vcf".into(),
        };
        let mut b = a.clone();
        b.alt = "]chr2:500]N".into();
        assert!(!bnd_match(&a, &b, &p));
        let mut c = a.clone();
        c.pos = 110;
        assert!(bnd_match(&a, &c, &p));
    }
}
