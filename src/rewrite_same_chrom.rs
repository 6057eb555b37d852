//! Rewrite paired same-chromosome BND records as DEL/DUP/INV; normalize
//! residual BNDs (C5).

use crate::bnd::BndPattern;
use crate::record::Record;

/// Apply the three pass filters in fixed order — DEL, then DUP, then INV —
/// each an O(n²) pairwise scan over the records surviving the previous
/// pass. Residual (unpaired or unmatched) records are normalized and kept
/// as BND. Output order is residual-BND, then DEL, then DUP, then INV.
pub fn rewrite_same_chrom(records: Vec<Record>) -> Vec<Record> {
    let (remaining, dels) = find_and_convert_pairs(records, |a, b| check_del_pair(a, b));
    let (remaining, dups) = find_and_convert_pairs(remaining, |a, b| check_dup_pair(a, b));
    let (remaining, invs) = find_and_convert_pairs(remaining, |a, b| check_inv_pair(a, b));

    let residual = remaining.into_iter().map(normalize_residual_bnd);

    residual.chain(dels).chain(dups).chain(invs).collect()
}

fn find_and_convert_pairs(
    records: Vec<Record>,
    check: impl Fn(&Record, &Record) -> Option<Record>,
) -> (Vec<Record>, Vec<Record>) {
    let mut processed = vec![false; records.len()];
    let mut converted = Vec::new();

    for i in 0..records.len() {
        if processed[i] {
            continue;
        }
        for j in (i + 1)..records.len() {
            if processed[j] {
                continue;
            }
            if let Some(rewritten) = check(&records[i], &records[j]) {
                converted.push(rewritten);
                processed[i] = true;
                processed[j] = true;
                break;
            }
        }
    }

    let remaining = records
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !processed[*i])
        .map(|(_, r)| r)
        .collect();
    (remaining, converted)
}

/// `a.chrom = mate_b.mate_chrom ∧ b.chrom = mate_a.mate_chrom ∧
///  a.pos = mate_b.mate_pos ∧ b.pos = mate_a.mate_pos` (no tolerance; any
/// tolerance was already applied upstream during pair discovery).
fn mutual_reference(a: &Record, b: &Record) -> bool {
    let (Some(ma), Some(mb)) = (a.mate(), b.mate()) else {
        return false;
    };
    a.chrom == mb.mate_chrom && b.chrom == ma.mate_chrom && a.pos == mb.mate_pos && b.pos == ma.mate_pos
}

fn lower_position_base<'a>(a: &'a Record, b: &'a Record) -> (&'a Record, i64, i64) {
    let start = a.pos.min(b.pos);
    let end = a.pos.max(b.pos);
    let base = if a.pos <= b.pos { a } else { b };
    (base, start, end)
}

fn build_rewritten(base: &Record, start_pos: i64, end_pos: i64, svtype: &str) -> Record {
    let mut rewritten = base.clone();
    rewritten.pos = start_pos;
    rewritten.alt = format!("<{svtype}>");
    rewritten.info.insert("SVTYPE".into(), svtype.into());
    rewritten.info.insert("END".into(), end_pos.to_string());
    rewritten
        .info
        .insert("SVLEN".into(), (end_pos - start_pos).to_string());
    rewritten.info.insert("CHR2".into(), rewritten.chrom.clone());
    rewritten.info.insert("SVMETHOD".into(), "OctopuSV".into());
    rewritten
}

fn check_del_pair(a: &Record, b: &Record) -> Option<Record> {
    let (ma, mb) = (a.mate()?, b.mate()?);
    if a.chrom != b.chrom || !mutual_reference(a, b) {
        return None;
    }
    let t_bracket_side = if ma.pattern == BndPattern::TBracketPBracket
        && mb.pattern == BndPattern::BracketPBracketT
    {
        Some((ma.mate_pos, a.pos))
    } else if mb.pattern == BndPattern::TBracketPBracket && ma.pattern == BndPattern::BracketPBracketT
    {
        Some((mb.mate_pos, b.pos))
    } else {
        None
    }?;
    let (t_bracket_mate_pos, t_bracket_pos) = t_bracket_side;
    if t_bracket_mate_pos <= t_bracket_pos {
        return None;
    }
    let (base, start, end) = lower_position_base(a, b);
    Some(build_rewritten(base, start, end, "DEL"))
}

fn check_dup_pair(a: &Record, b: &Record) -> Option<Record> {
    let (ma, mb) = (a.mate()?, b.mate()?);
    if a.chrom != b.chrom || !mutual_reference(a, b) {
        return None;
    }
    let t_bracket_side = if ma.pattern == BndPattern::TBracketPBracket
        && mb.pattern == BndPattern::BracketPBracketT
    {
        Some((ma.mate_pos, a.pos))
    } else if mb.pattern == BndPattern::TBracketPBracket && ma.pattern == BndPattern::BracketPBracketT
    {
        Some((mb.mate_pos, b.pos))
    } else {
        None
    }?;
    let (t_bracket_mate_pos, t_bracket_pos) = t_bracket_side;
    if t_bracket_mate_pos >= t_bracket_pos {
        return None;
    }
    let (base, start, end) = lower_position_base(a, b);
    Some(build_rewritten(base, start, end, "DUP"))
}

fn check_inv_pair(a: &Record, b: &Record) -> Option<Record> {
    let (ma, mb) = (a.mate()?, b.mate()?);
    if a.chrom != b.chrom || !mutual_reference(a, b) {
        return None;
    }
    let same_pattern = matches!(
        (ma.pattern, mb.pattern),
        (BndPattern::TBracketPBracketClose, BndPattern::TBracketPBracketClose)
            | (BndPattern::BracketPBracketOpenT, BndPattern::BracketPBracketOpenT)
    );
    if !same_pattern {
        return None;
    }
    let (base, start, end) = lower_position_base(a, b);
    Some(build_rewritten(base, start, end, "INV"))
}

fn normalize_residual_bnd(mut record: Record) -> Record {
    match record.mate() {
        Some(mate) => {
            record.info.insert("END".into(), mate.mate_pos.to_string());
            record.info.insert("CHR2".into(), mate.mate_chrom);
        }
        None => {
            record.info.insert("END".into(), ".".into());
            record.info.insert("CHR2".into(), record.chrom.clone());
        }
    }
    record.info.insert("SVTYPE".into(), "BND".into());
    record.info.insert("SVLEN".into(), ".".into());
    record.info.insert("SVMETHOD".into(), "OctopuSV".into());
    record
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
    fn scenario_del_from_spec_section_8() {
        // N[chr1:500[ at pos 200, and ]chr1:200]N at pos 500 -> DEL pos=200 end=500 svlen=300
        let a = bnd("chr1", 200, "a", "N[chr1:500[");
        let b = bnd("chr1", 500, "b", "]chr1:200]N");
        let out = rewrite_same_chrom(vec![a, b]);
        assert_eq!(out.len(), 1);
        let del = &out[0];
        assert_eq!(del.svtype().to_string(), "DEL");
        assert_eq!(del.pos, 200);
        assert_eq!(del.end(), Some(500));
        assert_eq!(del.svlen(), Some(300));
        assert_eq!(del.alt, "<DEL>");
    }

    #[test]
    fn scenario_dup_from_spec_section_8() {
        // C[chr1:10004[ at pos 10574, ]chr1:10574]C at pos 10004 -> DUP pos=10004 end=10574 svlen=570
        let a = bnd("chr1", 10574, "a", "C[chr1:10004[");
        let b = bnd("chr1", 10004, "b", "]chr1:10574]C");
        let out = rewrite_same_chrom(vec![a, b]);
        assert_eq!(out.len(), 1);
        let dup = &out[0];
        assert_eq!(dup.svtype().to_string(), "DUP");
        assert_eq!(dup.pos, 10004);
        assert_eq!(dup.end(), Some(10574));
        assert_eq!(dup.svlen(), Some(570));
    }

    #[test]
    fn inv_pair_both_t_bracket_p_bracket_close() {
        let a = bnd("chr1", 100, "a", "A]chr1:300]");
        let b = bnd("chr1", 300, "b", "T]chr1:100]");
        let out = rewrite_same_chrom(vec![a, b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].svtype().to_string(), "INV");
        assert_eq!(out[0].pos, 100);
        assert_eq!(out[0].end(), Some(300));
    }

    #[test]
    fn unpaired_bnd_is_normalized_not_dropped() {
        let a = bnd("chr1", 100, "a", "N[chr1:500[");
        let out = rewrite_same_chrom(vec![a]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].svtype().to_string(), "BND");
        assert_eq!(out[0].alt, "N[chr1:500[");
        assert_eq!(out[0].end(), Some(500));
        assert_eq!(out[0].chr2(), Some("chr1"));
    }
}
