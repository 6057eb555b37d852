//! Decoding of breakend (BND) ALT strings (C1).
//!
//! A BND ALT string encodes a join between the record's own position and a
//! mate position on (possibly) another chromosome, using one of four VCF
//! orientation patterns:
//!
//! - `t[p[` — sequence prefix, then `[chrom:pos[`
//! - `]p]t` — `]chrom:pos]`, then sequence suffix
//! - `t]p]` — sequence prefix, then `]chrom:pos]`
//! - `[p[t` — `[chrom:pos[`, then sequence suffix

use regex::Regex;
use std::sync::OnceLock;

/// One of the four BND orientation patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum BndPattern {
    #[strum(serialize = "t[p[")]
    TBracketPBracket,
    #[strum(serialize = "]p]t")]
    BracketPBracketT,
    #[strum(serialize = "t]p]")]
    TBracketPBracketClose,
    #[strum(serialize = "[p[t")]
    BracketPBracketOpenT,
}

/// Result of parsing a BND ALT string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BndMate {
    pub pattern: BndPattern,
    pub mate_chrom: String,
    pub mate_pos: i64,
}

fn bnd_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^\[\]]*)([\[\]])([^:\[\]]+):(\d+)([\[\]])([^\[\]]*)$")
            .expect("static BND regex is valid")
    })
}

/// Decode an ALT string into `(pattern, mate_chrom, mate_pos)`.
///
/// Accepts exactly one `[chrom:pos[` or `]chrom:pos]` group; whether a
/// sequence token precedes or follows the bracketed group selects among the
/// four patterns. Returns `None` if no bracketed group is found, the group
/// does not parse, or the bracket/prefix/suffix combination does not
/// correspond to any of the four patterns (e.g. `[chrom:pos]`, mismatched
/// brackets).
pub fn parse_bnd_alt(alt: &str) -> Option<BndMate> {
    let caps = bnd_regex().captures(alt)?;
    let prefix = &caps[1];
    let bracket1 = &caps[2];
    let mate_chrom = caps[3].to_string();
    let mate_pos: i64 = caps[4].parse().ok()?;
    let bracket2 = &caps[5];
    let suffix = &caps[6];

    let pattern = if !prefix.is_empty() && suffix.is_empty() {
        match (bracket1, bracket2) {
            ("]", "]") => BndPattern::TBracketPBracketClose,
            ("[", "[") => BndPattern::TBracketPBracket,
            _ => return None,
        }
    } else if prefix.is_empty() && !suffix.is_empty() {
        match (bracket1, bracket2) {
            ("]", "]") => BndPattern::BracketPBracketT,
            ("[", "[") => BndPattern::BracketPBracketOpenT,
            _ => return None,
        }
    } else {
        return None;
    };

    Some(BndMate {
        pattern,
        mate_chrom,
        mate_pos,
    })
}
