//! Rewrite paired different-chromosome BND records as TRA (C6).

use crate::bnd::BndPattern;
use crate::pair::{find_mate_pairs, find_same_direction_pairs};
use crate::record::Record;

/// `t[p[`/`[p[t` join on their own 5' side, `]p]t`/`t]p]` on their 3' side.
/// Used only to populate an informational INFO/STRAND field on TRA records;
/// it does not affect pairing or classification.
fn orientation_side(pattern: BndPattern) -> &'static str {
    match pattern {
        BndPattern::TBracketPBracket | BndPattern::BracketPBracketOpenT => "5",
        BndPattern::BracketPBracketT | BndPattern::TBracketPBracketClose => "3",
    }
}

/// Rewrite a pair of cross-chromosome BND records into one TRA record.
/// `pos` is the lower-sorted-chromosome member's position; `end` and
/// `chr2` come from the other member.
fn build_tra_pair(x: &Record, y: &Record) -> Record {
    let (first, second) = if x.chrom <= y.chrom { (x, y) } else { (y, x) };
    let mut tra = first.clone();
    tra.alt = "<TRA>".into();
    tra.info.insert("SVTYPE".into(), "TRA".into());
    tra.info.insert("END".into(), second.pos.to_string());
    tra.info.insert("CHR2".into(), second.chrom.clone());
    tra.info.insert("SVLEN".into(), ".".into());
    tra.info.insert("SVMETHOD".into(), "OctopuSV".into());
    if let (Some(mf), Some(ms)) = (first.mate(), second.mate()) {
        tra.info.insert(
            "STRAND".into(),
            format!("{}to{}", orientation_side(mf.pattern), orientation_side(ms.pattern)),
        );
    }
    tra
}

/// Rewrite a single leftover cross-chromosome BND into a TRA record using
/// its own ALT-encoded mate chromosome/position.
fn build_tra_single(record: &Record) -> Record {
    let mut tra = record.clone();
    tra.alt = "<TRA>".into();
    tra.info.insert("SVTYPE".into(), "TRA".into());
    tra.info.insert("SVLEN".into(), ".".into());
    tra.info.insert("SVMETHOD".into(), "OctopuSV".into());
    match record.mate() {
        Some(mate) => {
            tra.info.insert("END".into(), mate.mate_pos.to_string());
            tra.info.insert("CHR2".into(), mate.mate_chrom.clone());
            tra.info
                .insert("STRAND".into(), format!("{}toNA", orientation_side(mate.pattern)));
        }
        None => {
            tra.info.insert("END".into(), ".".into());
            tra.info.insert("CHR2".into(), ".".into());
        }
    }
    tra
}

/// Apply C6 in full: mate discovery, then same-direction pairing of
/// leftovers, then single-leg fallback. Every input record ends up
/// represented in exactly one output TRA record.
pub fn rewrite_cross_chrom(records: Vec<Record>, pos_tolerance: i64) -> Vec<Record> {
    let (mate_pairs, no_mate) = find_mate_pairs(records, pos_tolerance);
    let (special_pairs, other_singles) = find_same_direction_pairs(no_mate, pos_tolerance);

    let mut out = Vec::with_capacity(mate_pairs.len() + special_pairs.len() + other_singles.len());
    out.extend(mate_pairs.iter().map(|(a, b)| build_tra_pair(a, b)));
    out.extend(special_pairs.iter().map(|(a, b)| build_tra_pair(a, b)));
    out.extend(other_singles.iter().map(build_tra_single));
    out
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
    fn scenario_tra_from_spec_section_8() {
        // N[chr2:500[ at chr1:1000 and N[chr1:1000[ at chr2:500, tolerance 3
        // -> TRA chrom=chr1 pos=1000 chr2=chr2 end=500
        let a = bnd("chr1", 1000, "a", "N[chr2:500[");
        let b = bnd("chr2", 500, "b", "N[chr1:1000[");
        let out = rewrite_cross_chrom(vec![a, b], 3);
        assert_eq!(out.len(), 1);
        let tra = &out[0];
        assert_eq!(tra.svtype().to_string(), "TRA");
        assert_eq!(tra.chrom, "chr1");
        assert_eq!(tra.pos, 1000);
        assert_eq!(tra.chr2(), Some("chr2"));
        assert_eq!(tra.end(), Some(500));
        assert_eq!(tra.svlen(), None);
    }

    #[test]
    fn lone_cross_chrom_bnd_becomes_single_tra() {
        let a = bnd("chr1", 1000, "a", "N[chr2:500[");
        let out = rewrite_cross_chrom(vec![a], 3);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].svtype().to_string(), "TRA");
        assert_eq!(out[0].chr2(), Some("chr2"));
        assert_eq!(out[0].end(), Some(500));
    }
}
