//! Low-level reader/writer for the VCF-shaped tab-delimited format (A5).
//!
//! Column layout per data line: CHROM POS ID REF ALT QUAL FILTER INFO
//! FORMAT SAMPLE. Only the first sample column is read; this crate's
//! `Record` (§3) carries one `sample` map per record, matching the
//! single-SAMPLE-column caller-mode output this corpus emits.

use std::io::{BufRead, Write};
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::common::io::open_read_maybe_gz;
use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub id: String,
    pub length: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedInput {
    pub records: Vec<Record>,
    pub contigs: Vec<Contig>,
}

/// `##contig=<ID=chr1,length=249250621>` -> `Contig { id: "chr1", length: Some(249250621) }`.
fn parse_contig_line(line: &str) -> Option<Contig> {
    let inner = line.strip_prefix("##contig=<")?.strip_suffix('>')?;
    let mut id = None;
    let mut length = None;
    for kv in inner.split(',') {
        let (key, value) = kv.split_once('=')?;
        match key {
            "ID" => id = Some(value.to_string()),
            "length" => length = value.parse().ok(),
            _ => {}
        }
    }
    Some(Contig { id: id?, length })
}

fn parse_info(field: &str) -> IndexMap<String, String> {
    let mut info = IndexMap::new();
    if field == "." || field.is_empty() {
        return info;
    }
    for entry in field.split(';') {
        match entry.split_once('=') {
            Some((k, v)) => {
                info.insert(k.to_string(), v.to_string());
            }
            None => {
                info.insert(entry.to_string(), String::new());
            }
        }
    }
    info
}

fn parse_sample(format: &[String], sample_field: &str) -> IndexMap<String, String> {
    let values: Vec<&str> = sample_field.split(':').collect();
    format
        .iter()
        .zip(values.iter())
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect()
}

/// Read every data line of a tab-delimited input, tagging each record with
/// `source`, and accumulate its `##contig` header entries.
pub fn read_records<P: AsRef<Path>>(path: P, source: &str) -> Result<ParsedInput, anyhow::Error> {
    let reader = open_read_maybe_gz(path.as_ref())?;
    let mut parsed = ParsedInput::default();

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if let Some(contig) = line.strip_prefix("##").and_then(|_| parse_contig_line(&line)) {
            parsed.contigs.push(contig);
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            tracing::info!("skipping malformed line in {source} (expected >= 9 tab fields): {line:?}");
            continue;
        }

        let format: Vec<String> = fields[8].split(':').map(str::to_string).collect();
        let sample = fields
            .get(9)
            .map(|s| parse_sample(&format, s))
            .unwrap_or_default();

        parsed.records.push(Record {
            chrom: fields[0].to_string(),
            pos: fields[1].parse().unwrap_or(0),
            id: fields[2].to_string(),
            reference: fields[3].to_string(),
            alt: fields[4].to_string(),
            qual: (fields[5] != ".").then(|| fields[5].parse().ok()).flatten(),
            filter: fields[6].to_string(),
            info: parse_info(fields[7]),
            format,
            sample,
            source: source.to_string(),
        });
    }

    Ok(parsed)
}

fn format_info(info: &IndexMap<String, String>) -> String {
    if info.is_empty() {
        return ".".to_string();
    }
    info.iter()
        .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{k}={v}") })
        .collect::<Vec<_>>()
        .join(";")
}

/// Render a record's CHROM..FORMAT columns (everything but the sample
/// column(s), which the emitter assembles per column layout mode).
pub fn format_fixed_columns(record: &Record) -> String {
    let qual = record.qual.map(|q| q.to_string()).unwrap_or_else(|| ".".to_string());
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        record.chrom,
        record.pos,
        record.id,
        record.reference,
        record.alt,
        qual,
        record.filter,
        format_info(&record.info),
        record.format.join(":"),
    )
}

/// Render a sample map against a FORMAT key order, missing keys as `.`.
pub fn format_sample_column(format: &[String], sample: &IndexMap<String, String>) -> String {
    format
        .iter()
        .map(|k| sample.get(k).cloned().unwrap_or_else(|| ".".to_string()))
        .collect::<Vec<_>>()
        .join(":")
}

/// Accumulate `##contig` entries across every input file, deduplicated by
/// ID and keeping first-seen order — the header a `merge` run writes
/// reflects the union of contigs named by its inputs, not any one of them.
pub fn merge_contigs(lists: impl IntoIterator<Item = Vec<Contig>>) -> Vec<Contig> {
    lists.into_iter().flatten().unique_by(|c| c.id.clone()).collect()
}

/// Write a single-source VCF-shaped file: header, then one line per record
/// using that record's own sample column. Used by the `correct` subcommand,
/// which (unlike `merge`) never combines records from more than one source.
pub fn write_records<W: Write>(
    w: &mut W,
    records: &[Record],
    contigs: &[Contig],
    now: chrono::DateTime<chrono::Local>,
) -> std::io::Result<()> {
    writeln!(w, "##fileformat=VCFv4.2")?;
    writeln!(w, "##fileDate={}", now.format("%Y%m%d"))?;
    writeln!(w, "##source=OctopuSV")?;
    for contig in contigs {
        match contig.length {
            Some(len) => writeln!(w, "##contig=<ID={},length={}>", contig.id, len)?,
            None => writeln!(w, "##contig=<ID={}>", contig.id)?,
        }
    }
    writeln!(w, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE")?;
    for record in records {
        writeln!(
            w,
            "{}\t{}",
            format_fixed_columns(record),
            format_sample_column(&record.format, &record.sample)
        )?;
    }
    Ok(())
}
