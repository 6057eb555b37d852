//! Typed representation of one SV record and its missing-safe accessors (C2).

use indexmap::IndexMap;

use crate::bnd::parse_bnd_alt;

/// The structural variant type carried by a record's INFO/SVTYPE (or, for
/// unrewritten BND records, implied by the ALT string shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum SvType {
    #[strum(serialize = "DEL")]
    Del,
    #[strum(serialize = "DUP")]
    Dup,
    #[strum(serialize = "INV")]
    Inv,
    #[strum(serialize = "INS")]
    Ins,
    #[strum(serialize = "TRA")]
    Tra,
    #[strum(serialize = "BND")]
    Bnd,
}

impl SvType {
    /// Non-BND, non-TRA types correctable/mergeable via intra-chromosomal overlap.
    pub fn is_intra_chromosomal(self) -> bool {
        matches!(self, SvType::Del | SvType::Dup | SvType::Inv | SvType::Ins)
    }
}

/// One structural-variant record.
///
/// Mirrors the fields of a VCF-shaped tabular line (§3); `source` is
/// additive bookkeeping populated at ingest time, not part of the original
/// tabular encoding, and is threaded through correction and merge so that
/// C7-C11 can group and re-project by input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub chrom: String,
    pub pos: i64,
    pub id: String,
    pub reference: String,
    pub alt: String,
    pub qual: Option<f64>,
    pub filter: String,
    pub info: IndexMap<String, String>,
    pub format: Vec<String>,
    pub sample: IndexMap<String, String>,
    /// Display name or path of the input file this record was read from.
    pub source: String,
}

impl Record {
    /// The record's declared SV type, from INFO/SVTYPE.
    ///
    /// Falls back to `Bnd` when SVTYPE is absent or unrecognized but the ALT
    /// string parses as a breakend; records with neither are treated as BND
    /// too (the most permissive default, never causing a parse failure).
    pub fn svtype(&self) -> SvType {
        if let Some(raw) = self.info.get("SVTYPE") {
            if let Ok(svtype) = raw.parse::<SvType>() {
                return svtype;
            }
        }
        SvType::Bnd
    }

    pub fn is_bnd(&self) -> bool {
        self.svtype() == SvType::Bnd
    }

    /// Whether the ALT field decodes as one of the four BND orientation patterns.
    pub fn mate(&self) -> Option<crate::bnd::BndMate> {
        parse_bnd_alt(&self.alt)
    }

    /// INFO/END, when present and integral.
    pub fn end(&self) -> Option<i64> {
        self.info.get("END").and_then(|v| v.parse().ok())
    }

    /// INFO/SVLEN, as an absolute value (missing if absent or non-integral).
    pub fn svlen(&self) -> Option<i64> {
        self.info
            .get("SVLEN")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|v| v.abs())
    }

    /// INFO/CHR2, when present.
    pub fn chr2(&self) -> Option<&str> {
        self.info.get("CHR2").map(String::as_str)
    }

    /// Supporting read count: INFO keys SUPPORT, SUPPREAD, RE, DV in order,
    /// then sample keys DV, DR, then the second field of AD.
    pub fn support(&self) -> Option<i64> {
        for key in ["SUPPORT", "SUPPREAD", "RE", "DV"] {
            if let Some(v) = self.info.get(key) {
                if let Some(parsed) = parse_flexible_int(v) {
                    return Some(parsed);
                }
            }
        }
        if let Some(v) = self.sample.get("DV") {
            if let Some(parsed) = parse_flexible_int(v) {
                return Some(parsed);
            }
        }
        if let Some(v) = self.sample.get("DR") {
            if let Some(parsed) = parse_flexible_int(v) {
                return Some(parsed);
            }
        }
        if let Some(v) = self.sample.get("AD") {
            let parts: Vec<&str> = v.split(',').collect();
            if parts.len() >= 2 {
                if let Some(parsed) = parse_flexible_int(parts[1]) {
                    return Some(parsed);
                }
            }
        }
        None
    }

    /// Read depth: sample key DP, else AD ref+alt.
    pub fn depth(&self) -> Option<i64> {
        if let Some(v) = self.sample.get("DP") {
            if let Some(parsed) = parse_flexible_int(v) {
                return Some(parsed);
            }
        }
        if let Some(v) = self.sample.get("AD") {
            let parts: Vec<&str> = v.split(',').collect();
            if parts.len() >= 2 {
                let (r, a) = (parse_flexible_int(parts[0]), parse_flexible_int(parts[1]));
                if let (Some(r), Some(a)) = (r, a) {
                    return Some(r + a);
                }
            }
        }
        None
    }

    /// Sample-level genotype quality.
    pub fn gq(&self) -> Option<i64> {
        self.sample.get("GQ").and_then(|v| parse_flexible_int(v))
    }

    /// Sample-level genotype string.
    pub fn gt(&self) -> Option<&str> {
        self.sample.get("GT").map(String::as_str)
    }

    /// Whether the genotype looks like a no-call (`./.`, `.|.`, `.`).
    pub fn is_nocall(&self) -> bool {
        matches!(self.gt(), Some("./.") | Some(".|.") | Some("."))
    }
}

/// Parse a value that may be an integer or a float-formatted integer (`"3.0"`).
fn parse_flexible_int(v: &str) -> Option<i64> {
    if v == "." || v.is_empty() {
        return None;
    }
    v.parse::<i64>()
        .ok()
        .or_else(|| v.parse::<f64>().ok().map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_record() -> Record {
        Record {
            chrom: "chr1".into(),
            pos: 100,
            id: "id1".into(),
            reference: "N".into(),
            alt: "N[chr2:500[".into(),
            qual: None,
            filter: "PASS".into(),
            info: IndexMap::new(),
            format: vec!["GT".into()],
            sample: IndexMap::new(),
            source: "a.vcf".into(),
        }
    }

    #[test]
    fn svtype_defaults_to_bnd() {
        let r = base_record();
        assert_eq!(r.svtype(), SvType::Bnd);
        assert!(r.is_bnd());
    }

    #[test]
    fn svtype_from_info() {
        let mut r = base_record();
        r.info.insert("SVTYPE".into(), "DEL".into());
        assert_eq!(r.svtype(), SvType::Del);
        assert!(!r.is_bnd());
    }

    #[test]
    fn support_precedence_info_before_sample() {
        let mut r = base_record();
        r.info.insert("RE".into(), "7".into());
        r.sample.insert("DV".into(), "3".into());
        assert_eq!(r.support(), Some(7));
    }

    #[test]
    fn support_falls_back_to_ad_alt_field() {
        let mut r = base_record();
        r.sample.insert("AD".into(), "10,4".into());
        assert_eq!(r.support(), Some(4));
    }

    #[test]
    fn support_missing_is_none() {
        let r = base_record();
        assert_eq!(r.support(), None);
    }

    #[test]
    fn depth_from_ad_sum() {
        let mut r = base_record();
        r.sample.insert("AD".into(), "10,4".into());
        assert_eq!(r.depth(), Some(14));
    }

    #[test]
    fn nocall_detection() {
        let mut r = base_record();
        r.sample.insert("GT".into(), "./.".into());
        assert!(r.is_nocall());
        r.sample.insert("GT".into(), "0/1".into());
        assert!(!r.is_nocall());
    }

    #[test]
    fn svlen_is_absolute() {
        let mut r = base_record();
        r.info.insert("SVLEN".into(), "-200".into());
        assert_eq!(r.svlen(), Some(200));
    }
}
