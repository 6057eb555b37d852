//! VCF-shaped emitter with fixed per-source column order (C11).

use std::io::Write;

use crate::cluster::Cluster;
use crate::name_map::NameMap;
use crate::recordio::{format_fixed_columns, format_sample_column, Contig};
use crate::select::select_representative;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Caller,
    Sample,
}

pub struct EmitContext<'a> {
    pub mode: Mode,
    /// Input file paths, in the order given on the command line — the
    /// single source of truth for SOURCES and sample-column ordering.
    pub all_files: &'a [String],
    pub name_map: &'a NameMap,
    pub contigs: &'a [Contig],
}

fn write_header<W: Write>(w: &mut W, ctx: &EmitContext, now: chrono::DateTime<chrono::Local>) -> std::io::Result<()> {
    writeln!(w, "##fileformat=VCFv4.2")?;
    writeln!(w, "##fileDate={}", now.format("%Y%m%d"))?;
    writeln!(w, "##source=OctopuSV")?;
    for contig in ctx.contigs {
        match contig.length {
            Some(len) => writeln!(w, "##contig=<ID={},length={}>", contig.id, len)?,
            None => writeln!(w, "##contig=<ID={}>", contig.id)?,
        }
    }
    let fixed = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT";
    match ctx.mode {
        Mode::Caller => writeln!(w, "{fixed}\tSAMPLE"),
        Mode::Sample => writeln!(w, "{fixed}\t{}", ctx.name_map.display_names().join("\t")),
    }
}

/// `all_files`, filtered to those present in the cluster's source set,
/// preserving input-file order — the reprojection the emitter invariant
/// requires before every write.
fn projected_file_indices(cluster: &Cluster, all_files: &[String]) -> Vec<usize> {
    all_files
        .iter()
        .enumerate()
        .filter(|(_, path)| cluster.members.iter().any(|r| &r.source == *path))
        .map(|(i, _)| i)
        .collect()
}

fn missing_genotype(format: &[String]) -> String {
    if format.is_empty() {
        return ".".to_string();
    }
    std::iter::once("0/0".to_string())
        .chain(std::iter::repeat(".".to_string()).take(format.len() - 1))
        .collect::<Vec<_>>()
        .join(":")
}

fn write_cluster<W: Write>(w: &mut W, cluster: &Cluster, ctx: &EmitContext) -> std::io::Result<()> {
    let representative = select_representative(&cluster.members);
    let indices = projected_file_indices(cluster, ctx.all_files);

    let mut info = representative.info.clone();
    let sources_csv = indices
        .iter()
        .map(|&i| ctx.name_map.display_name(i).to_string())
        .collect::<Vec<_>>()
        .join(",");
    info.insert("SOURCES".to_string(), sources_csv);

    let mut rewritten = representative.clone();
    rewritten.info = info;
    write!(w, "{}", format_fixed_columns(&rewritten))?;

    match ctx.mode {
        Mode::Caller => {
            let columns: Vec<String> = indices
                .iter()
                .map(|&i| {
                    let path = &ctx.all_files[i];
                    cluster
                        .members
                        .iter()
                        .find(|r| &r.source == path)
                        .map(|r| format_sample_column(&representative.format, &r.sample))
                        .unwrap_or_else(|| missing_genotype(&representative.format))
                })
                .collect();
            writeln!(w, "\t{}", columns.join("\t"))
        }
        Mode::Sample => {
            let columns: Vec<String> = ctx
                .all_files
                .iter()
                .map(|path| {
                    cluster
                        .members
                        .iter()
                        .find(|r| &r.source == path)
                        .map(|r| format_sample_column(&representative.format, &r.sample))
                        .unwrap_or_else(|| missing_genotype(&representative.format))
                })
                .collect();
            writeln!(w, "\t{}", columns.join("\t"))
        }
    }
}

/// Write the full header, then one line per cluster in input order. This
/// preserves the invariant that the k-th SOURCES entry matches the k-th
/// non-missing sample column, both reprojected onto `ctx.all_files`.
pub fn write_output<W: Write>(
    w: &mut W,
    clusters: &[&Cluster],
    ctx: &EmitContext,
    now: chrono::DateTime<chrono::Local>,
) -> std::io::Result<()> {
    write_header(w, ctx, now)?;
    for cluster in clusters {
        write_cluster(w, cluster, ctx)?;
    }
    Ok(())
}
