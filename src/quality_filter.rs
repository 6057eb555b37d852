//! Record-level quality filtering, applied before correction (§9 design
//! note iii; out-of-core collaborator, fully specified here as ambient
//! plumbing rather than a Non-goal).

use crate::record::Record;

/// Quality filter thresholds. Every field is optional; an absent threshold
/// never rejects a record, and a present threshold whose underlying field
/// is missing from the record also passes (missing-safe, matching C2's own
/// getter semantics).
#[derive(Debug, Clone, Default)]
pub struct QualityFilter {
    pub min_qual: Option<f64>,
    pub max_qual: Option<f64>,
    pub min_support: Option<i64>,
    pub max_support: Option<i64>,
    pub min_depth: Option<i64>,
    pub max_depth: Option<i64>,
    pub min_gq: Option<i64>,
    pub min_svlen: Option<i64>,
    pub max_svlen: Option<i64>,
    pub filter_pass: bool,
    pub exclude_nocall: bool,
}

/// Reason a record was rejected; used to accumulate per-reason statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    Qual,
    FilterField,
    Support,
    Depth,
    Gq,
    Svlen,
    NoCall,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FilterStats {
    pub total: u64,
    pub passed: u64,
    pub filtered_qual: u64,
    pub filtered_filter_field: u64,
    pub filtered_support: u64,
    pub filtered_depth: u64,
    pub filtered_gq: u64,
    pub filtered_svlen: u64,
    pub filtered_nocall: u64,
}

impl FilterStats {
    fn record(&mut self, reason: FilterReason) {
        match reason {
            FilterReason::Qual => self.filtered_qual += 1,
            FilterReason::FilterField => self.filtered_filter_field += 1,
            FilterReason::Support => self.filtered_support += 1,
            FilterReason::Depth => self.filtered_depth += 1,
            FilterReason::Gq => self.filtered_gq += 1,
            FilterReason::Svlen => self.filtered_svlen += 1,
            FilterReason::NoCall => self.filtered_nocall += 1,
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "quality filtering: {} passed / {} total ({:.1}%)",
            self.passed,
            self.total,
            if self.total > 0 {
                100.0 * self.passed as f64 / self.total as f64
            } else {
                0.0
            }
        );
        for (label, n) in [
            ("QUAL", self.filtered_qual),
            ("FILTER", self.filtered_filter_field),
            ("support", self.filtered_support),
            ("depth", self.filtered_depth),
            ("GQ", self.filtered_gq),
            ("SVLEN", self.filtered_svlen),
            ("no-call GT", self.filtered_nocall),
        ] {
            if n > 0 {
                tracing::info!("  filtered by {}: {}", label, n);
            }
        }
    }
}

impl QualityFilter {
    /// Evaluate every sub-check in order; returns the first failing reason,
    /// or `None` if the record passes.
    fn reason_to_reject(&self, record: &Record) -> Option<FilterReason> {
        if self.min_qual.is_some() || self.max_qual.is_some() {
            if let Some(qual) = record.qual {
                if self.min_qual.is_some_and(|min| qual < min)
                    || self.max_qual.is_some_and(|max| qual > max)
                {
                    return Some(FilterReason::Qual);
                }
            }
        }

        if self.filter_pass && !record.filter.eq_ignore_ascii_case("PASS") {
            return Some(FilterReason::FilterField);
        }

        if self.min_support.is_some() || self.max_support.is_some() {
            if let Some(support) = record.support() {
                if self.min_support.is_some_and(|min| support < min)
                    || self.max_support.is_some_and(|max| support > max)
                {
                    return Some(FilterReason::Support);
                }
            }
        }

        if self.min_depth.is_some() || self.max_depth.is_some() {
            if let Some(depth) = record.depth() {
                if self.min_depth.is_some_and(|min| depth < min)
                    || self.max_depth.is_some_and(|max| depth > max)
                {
                    return Some(FilterReason::Depth);
                }
            }
        }

        if let Some(min_gq) = self.min_gq {
            if let Some(gq) = record.gq() {
                if gq < min_gq {
                    return Some(FilterReason::Gq);
                }
            }
        }

        if self.min_svlen.is_some() || self.max_svlen.is_some() {
            if let Some(svlen) = record.svlen() {
                if self.min_svlen.is_some_and(|min| svlen < min)
                    || self.max_svlen.is_some_and(|max| svlen > max)
                {
                    return Some(FilterReason::Svlen);
                }
            }
        }

        if self.exclude_nocall && record.is_nocall() {
            return Some(FilterReason::NoCall);
        }

        None
    }

    /// `true` if the record passes every configured sub-check.
    pub fn passes(&self, record: &Record, stats: &mut FilterStats) -> bool {
        stats.total += 1;
        match self.reason_to_reject(record) {
            Some(reason) => {
                stats.record(reason);
                false
            }
            None => {
                stats.passed += 1;
                true
            }
        }
    }

    /// Filter a batch, returning the surviving records and accumulated stats.
    pub fn filter(&self, records: Vec<Record>) -> (Vec<Record>, FilterStats) {
        let mut stats = FilterStats::default();
        let kept = records
            .into_iter()
            .filter(|r| self.passes(r, &mut stats))
            .collect();
        (kept, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn record(qual: Option<f64>, filter: &str) -> Record {
        Record {
            chrom: "chr1".into(),
            pos: 100,
            id: "id".into(),
            reference: "N".into(),
            alt: "<DEL>".into(),
            qual,
            filter: filter.into(),
            info: IndexMap::new(),
            format: vec![],
            sample: IndexMap::new(),
            source: "a.vcf".into(),
        }
    }

    #[test]
    fn missing_qual_passes_despite_threshold() {
        let qf = QualityFilter {
            min_qual: Some(10.0),
            ..Default::default()
        };
        let mut stats = FilterStats::default();
        assert!(qf.passes(&record(None, "PASS"), &mut stats));
    }

    #[test]
    fn qual_below_minimum_is_rejected() {
        let qf = QualityFilter {
            min_qual: Some(10.0),
            ..Default::default()
        };
        let mut stats = FilterStats::default();
        assert!(!qf.passes(&record(Some(5.0), "PASS"), &mut stats));
        assert_eq!(stats.filtered_qual, 1);
    }

    #[test]
    fn filter_pass_rejects_non_pass() {
        let qf = QualityFilter {
            filter_pass: true,
            ..Default::default()
        };
        let mut stats = FilterStats::default();
        assert!(!qf.passes(&record(None, "LowQual"), &mut stats));
        assert_eq!(stats.filtered_filter_field, 1);
    }

    #[test]
    fn exclude_nocall_rejects_dot_slash_dot() {
        let qf = QualityFilter {
            exclude_nocall: true,
            ..Default::default()
        };
        let mut r = record(None, "PASS");
        r.sample.insert("GT".into(), "./.".into());
        let mut stats = FilterStats::default();
        assert!(!qf.passes(&r, &mut stats));
        assert_eq!(stats.filtered_nocall, 1);
    }
}
