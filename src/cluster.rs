//! Cluster store: groups records that should merge, testing every new
//! record only against the first member of each existing cluster so that
//! similarity never chains transitively through an intermediate member (C8).

use indexmap::IndexMap;

use crate::record::{Record, SvType};
use crate::similarity::{bnd_match, intra_chromosomal_match, tra_match, BndParams, IntraChromParams, TraParams};

/// The three similarity-predicate parameter sets, one per svtype family.
#[derive(Debug, Clone)]
pub struct ClusterParams {
    pub intra: IntraChromParams,
    pub tra: TraParams,
    pub bnd: BndParams,
}

#[derive(Debug, Clone)]
pub struct Cluster {
    pub members: Vec<Record>,
}

impl Cluster {
    pub fn first(&self) -> &Record {
        &self.members[0]
    }
}

type GroupKey = (&'static str, String, String);

/// Records only ever cluster with others sharing an svtype family and
/// chromosome (or unordered chromosome pair, for TRA/BND); this is a cheap
/// pre-partition, not part of the similarity predicate itself.
fn group_key(record: &Record) -> GroupKey {
    match record.svtype() {
        SvType::Tra | SvType::Bnd => {
            let label = if record.svtype() == SvType::Tra {
                "TRA"
            } else {
                "BND"
            };
            let chr2 = record.chr2().unwrap_or(record.chrom.as_str()).to_string();
            let mut pair = [record.chrom.clone(), chr2];
            pair.sort();
            let [a, b] = pair;
            (label, a, b)
        }
        SvType::Del => ("DEL", record.chrom.clone(), record.chrom.clone()),
        SvType::Dup => ("DUP", record.chrom.clone(), record.chrom.clone()),
        SvType::Inv => ("INV", record.chrom.clone(), record.chrom.clone()),
        SvType::Ins => ("INS", record.chrom.clone(), record.chrom.clone()),
    }
}

fn matches(first: &Record, candidate: &Record, params: &ClusterParams) -> bool {
    match first.svtype() {
        SvType::Tra => tra_match(first, candidate, &params.tra),
        SvType::Bnd => bnd_match(first, candidate, &params.bnd),
        _ => intra_chromosomal_match(first, candidate, &params.intra),
    }
}

/// Cluster every input record. Each record is compared only against
/// `cluster.first()` of every existing cluster in its group, in cluster
/// creation order; the first match wins. A record matching no existing
/// cluster starts a new one. This first-member-only rule is deliberate: it
/// keeps clusters from chaining together through a borderline intermediate
/// record that would otherwise bridge two dissimilar ones.
pub fn cluster_records(records: Vec<Record>, params: &ClusterParams) -> Vec<Cluster> {
    let mut groups: IndexMap<GroupKey, Vec<Cluster>> = IndexMap::new();

    for record in records {
        let key = group_key(&record);
        let clusters = groups.entry(key).or_default();
        let target = clusters
            .iter()
            .position(|cluster| matches(cluster.first(), &record, params));
        match target {
            Some(i) => clusters[i].members.push(record),
            None => clusters.push(Cluster {
                members: vec![record],
            }),
        }
    }

    groups.into_values().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn del_record(start: i64, end: i64, id: &str) -> Record {
        let mut info = IndexMap::new();
        info.insert("SVTYPE".into(), "DEL".into());
        info.insert("END".into(), end.to_string());
        Record {
            chrom: "chr1".into(),
            pos: start,
            id: id.into(),
            reference: "N".into(),
            alt: "<DEL>".into(),
            qual: None,
            filter: "PASS".into(),
            info,
            format: vec![],
            sample: IndexMap::new(),
            source: format!("{id}.vcf"),
        }
    }

    fn params(min_jaccard: f64) -> ClusterParams {
        ClusterParams {
            intra: IntraChromParams {
                max_distance: 1000,
                max_length_ratio: 10.0,
                min_jaccard,
            },
            tra: TraParams {
                tra_delta: 50,
                tra_min_overlap_ratio: 0.5,
                tra_strand_consistency: true,
            },
            bnd: BndParams { bnd_delta: 50 },
        }
    }

    #[test]
    fn first_member_only_prevents_transitive_chaining() {
        // A-B similar (0.605), B-C similar (0.605), A-C dissimilar (0.341).
        let a = del_record(0, 60, "a");
        let b = del_record(15, 75, "b");
        let c = del_record(30, 90, "c");

        let clusters = cluster_records(vec![a, b, c], &params(0.5));

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[0].members[0].id, "a");
        assert_eq!(clusters[0].members[1].id, "b");
        assert_eq!(clusters[1].members.len(), 1);
        assert_eq!(clusters[1].members[0].id, "c");
    }

    #[test]
    fn single_record_forms_singleton_cluster() {
        let a = del_record(0, 100, "a");
        let clusters = cluster_records(vec![a], &params(0.7));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 1);
    }

    #[test]
    fn different_chromosomes_never_cluster_together() {
        let a = del_record(0, 100, "a");
        let mut b = del_record(0, 100, "b");
        b.chrom = "chr2".into();
        let clusters = cluster_records(vec![a, b], &params(0.0));
        assert_eq!(clusters.len(), 2);
    }
}
