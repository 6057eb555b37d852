//! Partition raw records into non-BND, same-chromosome BND, and
//! different-chromosome BND groups (C3).

use crate::record::Record;

#[derive(Debug, Default)]
pub struct Classified {
    pub non_bnd: Vec<Record>,
    pub same_chrom_bnd: Vec<Record>,
    pub diff_chrom_bnd: Vec<Record>,
    /// Nominally BND, but the ALT string doesn't parse as one of the four
    /// orientation patterns. Dropped from pairing (never reach C4-C6), but
    /// retained verbatim so the caller can still emit them (§4.3, §7: a
    /// single record's parse failure is never fatal and never silently
    /// drops the record from output).
    pub unparseable_bnd: Vec<Record>,
}

/// Classify a batch of records in one pass.
///
/// Records whose ALT does not parse as a BND pattern, but are nominally BND
/// (by SVTYPE or by falling through C2's `Bnd` default), are logged at info
/// level and routed to `unparseable_bnd` instead of pairing.
pub fn classify(records: Vec<Record>) -> Classified {
    let mut out = Classified::default();
    for record in records {
        if !record.is_bnd() {
            out.non_bnd.push(record);
            continue;
        }
        match record.mate() {
            Some(mate) if mate.mate_chrom == record.chrom => {
                out.same_chrom_bnd.push(record);
            }
            Some(_) => {
                out.diff_chrom_bnd.push(record);
            }
            None => {
                tracing::info!(
                    "record {} on {}:{} has unparseable BND ALT {:?}; dropped from pairing",
                    record.id,
                    record.chrom,
                    record.pos,
                    record.alt
                );
                out.unparseable_bnd.push(record);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn bnd(chrom: &str, pos: i64, alt: &str) -> Record {
        Record {
            chrom: chrom.into(),
            pos,
            id: format!("{chrom}:{pos}"),
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
    fn partitions_by_chromosome() {
        let same = bnd("chr1", 100, "N[chr1:500[");
        let diff = bnd("chr1", 100, "N[chr2:500[");
        let unparseable = bnd("chr1", 100, "N");

        let classified = classify(vec![same.clone(), diff.clone(), unparseable.clone()]);
        assert_eq!(classified.same_chrom_bnd, vec![same]);
        assert_eq!(classified.diff_chrom_bnd, vec![diff]);
        assert_eq!(classified.unparseable_bnd, vec![unparseable]);
        assert!(classified.non_bnd.is_empty());
    }

    #[test]
    fn non_bnd_records_pass_through() {
        let mut r = bnd("chr1", 100, "<DEL>");
        r.info.insert("SVTYPE".into(), "DEL".into());
        let classified = classify(vec![r.clone()]);
        assert_eq!(classified.non_bnd, vec![r]);
    }
}
