//! `correct` subcommand: classify, pair, and rewrite BND records from a
//! single input file (A1/A4 orchestration over C1-C6).

use std::path::PathBuf;

use thousands::Separable;

use crate::classify::classify;
use crate::common::{self, trace_rss_now};
use crate::err::{AppError, ArgError};
use crate::quality_filter::QualityFilter;
use crate::recordio::{read_records, write_records};
use crate::rewrite_cross_chrom::rewrite_cross_chrom;
use crate::rewrite_same_chrom::rewrite_same_chrom;

/// Command line arguments for `svcorrect correct`.
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Input file, positional form (mutually exclusive with `--input-file`).
    pub input_pos: Option<PathBuf>,

    /// Output file, positional form (mutually exclusive with `--output-file`).
    pub output_pos: Option<PathBuf>,

    /// Input file, flag form.
    #[arg(short = 'i', long = "input-file")]
    pub input_file: Option<PathBuf>,

    /// Output file, flag form.
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// BND pair discovery position tolerance (C4).
    #[arg(long = "pos-tolerance", alias = "pt", default_value_t = 3)]
    pub pos_tolerance: i64,

    /// Minimum QUAL to keep a record.
    #[arg(long)]
    pub min_qual: Option<f64>,
    /// Maximum QUAL to keep a record.
    #[arg(long)]
    pub max_qual: Option<f64>,
    /// Minimum supporting-read count to keep a record.
    #[arg(long)]
    pub min_support: Option<i64>,
    /// Maximum supporting-read count to keep a record.
    #[arg(long)]
    pub max_support: Option<i64>,
    /// Minimum read depth to keep a record.
    #[arg(long)]
    pub min_depth: Option<i64>,
    /// Maximum read depth to keep a record.
    #[arg(long)]
    pub max_depth: Option<i64>,
    /// Minimum genotype quality to keep a record.
    #[arg(long)]
    pub min_gq: Option<i64>,
    /// Minimum |SVLEN| to keep a record.
    #[arg(long)]
    pub min_svlen: Option<i64>,
    /// Maximum |SVLEN| to keep a record.
    #[arg(long)]
    pub max_svlen: Option<i64>,
    /// Reject records whose FILTER is not PASS.
    #[arg(long)]
    pub filter_pass: bool,
    /// Reject records with a no-call genotype (`./.`, `.|.`, `.`).
    #[arg(long)]
    pub exclude_nocall: bool,

    /// Optional path to write quality-filter statistics as JSON.
    #[arg(long)]
    pub stats_json: Option<PathBuf>,
}

fn resolve_path(positional: &Option<PathBuf>, flag: &Option<PathBuf>) -> Result<PathBuf, AppError> {
    match (positional, flag) {
        (Some(p), None) => Ok(p.clone()),
        (None, Some(p)) => Ok(p.clone()),
        _ => Err(AppError::UserInput(ArgError::InputOutputConflict)),
    }
}

fn quality_filter_from_args(args: &Args) -> QualityFilter {
    QualityFilter {
        min_qual: args.min_qual,
        max_qual: args.max_qual,
        min_support: args.min_support,
        max_support: args.max_support,
        min_depth: args.min_depth,
        max_depth: args.max_depth,
        min_gq: args.min_gq,
        min_svlen: args.min_svlen,
        max_svlen: args.max_svlen,
        filter_pass: args.filter_pass,
        exclude_nocall: args.exclude_nocall,
    }
}

/// Run the `correct` subcommand end to end: read, quality-filter, classify,
/// pair/rewrite BND records, write. Mirrors the data flow of §2: A4 → C1-C3
/// → C4 → C5/C6 → corrected records.
pub fn run(_common: &common::Args, args: &Args) -> Result<(), AppError> {
    let input_path = resolve_path(&args.input_pos, &args.input_file)?;
    let output_path = resolve_path(&args.output_pos, &args.output_file)?;

    let source = input_path.to_string_lossy().into_owned();
    tracing::info!("reading {}", source);
    let parsed = read_records(&input_path, &source).map_err(AppError::Internal)?;
    trace_rss_now();

    let quality_filter = quality_filter_from_args(args);
    let (records, stats) = quality_filter.filter(parsed.records);
    stats.log_summary();
    if let Some(stats_path) = &args.stats_json {
        let file = std::fs::File::create(stats_path).map_err(anyhow::Error::from)?;
        serde_json::to_writer_pretty(file, &stats).map_err(anyhow::Error::from)?;
    }

    let classified = classify(records);
    tracing::info!(
        "classified: {} non-BND, {} same-chromosome BND, {} cross-chromosome BND, {} unparseable BND",
        classified.non_bnd.len().separate_with_commas(),
        classified.same_chrom_bnd.len().separate_with_commas(),
        classified.diff_chrom_bnd.len().separate_with_commas(),
        classified.unparseable_bnd.len().separate_with_commas(),
    );
    trace_rss_now();

    let same_chrom_corrected = rewrite_same_chrom(classified.same_chrom_bnd);
    let cross_chrom_corrected = rewrite_cross_chrom(classified.diff_chrom_bnd, args.pos_tolerance);
    trace_rss_now();

    let mut out_records = classified.non_bnd;
    out_records.extend(same_chrom_corrected);
    out_records.extend(cross_chrom_corrected);
    out_records.extend(classified.unparseable_bnd);

    tracing::info!(
        "writing {} corrected records to {}",
        out_records.len().separate_with_commas(),
        output_path.display()
    );
    let mut writer = crate::common::io::open_write_maybe_gz(&output_path).map_err(AppError::Internal)?;
    write_records(&mut writer, &out_records, &parsed.contigs, chrono::Local::now())
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_rejects_both_positional_and_flag() {
        let err = resolve_path(&Some(PathBuf::from("a")), &Some(PathBuf::from("b"))).unwrap_err();
        assert!(matches!(err, AppError::UserInput(ArgError::InputOutputConflict)));
    }

    #[test]
    fn resolve_path_rejects_neither() {
        let err = resolve_path(&None, &None).unwrap_err();
        assert!(matches!(err, AppError::UserInput(ArgError::InputOutputConflict)));
    }

    #[test]
    fn resolve_path_accepts_either_form() {
        assert_eq!(resolve_path(&Some(PathBuf::from("a")), &None).unwrap(), PathBuf::from("a"));
        assert_eq!(resolve_path(&None, &Some(PathBuf::from("b"))).unwrap(), PathBuf::from("b"));
    }

    #[tracing_test::traced_test]
    #[test]
    fn smoke_test_pairs_dels_and_keeps_unparseable_bnd() -> Result<(), anyhow::Error> {
        let tmpdir = temp_testdir::TempDir::default();
        let input_path = tmpdir.join("in.vcf");
        let output_path = tmpdir.join("out.vcf");

        std::fs::write(
            &input_path,
            "##fileformat=VCFv4.2\n\
             ##contig=<ID=chr1,length=1000000>\n\
             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE\n\
             chr1\t200\ta\tN\tN[chr1:500[\t.\tPASS\tSVTYPE=BND\tGT\t0/1\n\
             chr1\t500\tb\tN\t]chr1:200]N\t.\tPASS\tSVTYPE=BND\tGT\t0/1\n\
             chr1\t50\tc\tN\tN\t.\tPASS\tSVTYPE=BND\tGT\t0/1\n",
        )?;

        let args = Args {
            input_pos: Some(input_path.clone()),
            output_pos: Some(output_path.clone()),
            input_file: None,
            output_file: None,
            pos_tolerance: 3,
            min_qual: None,
            max_qual: None,
            min_support: None,
            max_support: None,
            min_depth: None,
            max_depth: None,
            min_gq: None,
            min_svlen: None,
            max_svlen: None,
            filter_pass: false,
            exclude_nocall: false,
            stats_json: None,
        };
        run(&common::Args::default(), &args)?;

        assert!(tracing_test::logs_contain("unparseable BND ALT"));
        let text = std::fs::read_to_string(&output_path)?;
        let data_lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data_lines.len(), 2, "expected one rewritten DEL and one retained BND");
        let del_line = data_lines.iter().find(|l| l.contains("SVTYPE=DEL")).expect("DEL line");
        assert!(del_line.starts_with("chr1\t200\t"));
        assert!(del_line.contains("END=500") && del_line.contains("SVLEN=300"));
        let bnd_line = data_lines.iter().find(|l| l.contains("SVTYPE=BND")).expect("BND line");
        assert!(bnd_line.starts_with("chr1\t50\tc\t"));

        Ok(())
    }
}
