//! `merge` subcommand: cluster corrected records from many input files and
//! emit a consistent, per-source tabular output (A1 orchestration over
//! C7-C12).

use thousands::Separable;

use crate::cluster::{cluster_records, ClusterParams, Cluster};
use crate::common::{self, trace_rss_now};
use crate::emit::{write_output, EmitContext, Mode};
use crate::err::{AppError, ArgError};
use crate::filter_algebra::{select_clusters, Strategy};
use crate::name_map::NameMap;
use crate::record::SvType;
use crate::recordio::{merge_contigs, read_records};
use crate::similarity::{BndParams, IntraChromParams, TraParams};

/// Column layout mode, CLI-facing mirror of [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum ModeArg {
    #[default]
    Caller,
    Sample,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Caller => Mode::Caller,
            ModeArg::Sample => Mode::Sample,
        }
    }
}

/// Command line arguments for `svcorrect merge`.
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Input files, positional form; concatenated before any `--input-file`
    /// values (§6: "positional first").
    pub input_pos: Vec<String>,

    /// Input files, flag form; repeatable.
    #[arg(short = 'i', long = "input-file")]
    pub input_file: Vec<String>,

    /// Output file.
    #[arg(short = 'o', long = "output-file")]
    pub output_file: String,

    /// Column layout: `caller` (one SAMPLE column) or `sample` (one column
    /// per input file).
    #[arg(long, value_enum, default_value_t = ModeArg::Caller)]
    pub mode: ModeArg,

    /// Comma-separated display names, one per input, used in `caller` mode.
    #[arg(long)]
    pub caller_names: Option<String>,

    /// Comma-separated display names, one per input, used in `sample` mode.
    #[arg(long)]
    pub sample_names: Option<String>,

    /// Select clusters whose source set equals the full input-file set.
    #[arg(long)]
    pub intersect: bool,
    /// Select clusters with at least one source in the input-file set.
    #[arg(long)]
    pub union: bool,
    /// Select clusters whose source set is exactly one of the given files.
    #[arg(long, num_args = 1..)]
    pub specific: Vec<String>,
    /// Select clusters with exactly this many sources.
    #[arg(long)]
    pub exact_support: Option<i64>,
    /// Select clusters with at least this many sources (combinable with `--max-support`).
    #[arg(long)]
    pub min_support: Option<i64>,
    /// Select clusters with at most this many sources (combinable with `--min-support`).
    #[arg(long)]
    pub max_support: Option<i64>,
    /// Select clusters matching a boolean expression over input-file identifiers.
    #[arg(long)]
    pub expression: Option<String>,

    /// Max start/end distance for intra-chromosomal merging.
    #[arg(long, default_value_t = 50)]
    pub max_distance: i64,
    /// Max length ratio for intra-chromosomal merging.
    #[arg(long, default_value_t = 1.3)]
    pub max_length_ratio: f64,
    /// Min interval Jaccard for intra-chromosomal merging.
    #[arg(long, default_value_t = 0.7)]
    pub min_jaccard: f64,
    /// Max breakend-position delta for TRA merging.
    #[arg(long, default_value_t = 50)]
    pub tra_delta: i64,
    /// Min mate-pair overlap ratio for TRA merging.
    #[arg(long, default_value_t = 0.5)]
    pub tra_min_overlap: f64,
    /// Require matching STRAND for TRA merging.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    pub tra_strand_consistency: bool,
    /// Max breakend-position delta for residual BND merging.
    #[arg(long, default_value_t = 50)]
    pub bnd_delta: i64,
}

/// Positional values first, then `--input-file` values, in CLI order.
fn all_input_files(args: &Args) -> Vec<String> {
    args.input_pos.iter().cloned().chain(args.input_file.iter().cloned()).collect()
}

fn cluster_params(args: &Args) -> ClusterParams {
    ClusterParams {
        intra: IntraChromParams {
            max_distance: args.max_distance,
            max_length_ratio: args.max_length_ratio,
            min_jaccard: args.min_jaccard,
        },
        tra: TraParams {
            tra_delta: args.tra_delta,
            tra_min_overlap_ratio: args.tra_min_overlap,
            tra_strand_consistency: args.tra_strand_consistency,
        },
        bnd: BndParams { bnd_delta: args.bnd_delta },
    }
}

/// Exactly one merge strategy is required; `--min-support`/`--max-support`
/// are the only pair allowed to combine (§4.10, §6, §7).
fn resolve_strategy(args: &Args) -> Result<Strategy, AppError> {
    let has_range = args.min_support.is_some() || args.max_support.is_some();
    let given = [
        args.intersect,
        args.union,
        !args.specific.is_empty(),
        args.exact_support.is_some(),
        has_range,
        args.expression.is_some(),
    ];
    let count = given.iter().filter(|x| **x).count();

    if count == 0 {
        return Err(AppError::UserInput(ArgError::NoMergeStrategy));
    }
    if count > 1 {
        return Err(AppError::UserInput(ArgError::ConflictingMergeStrategies));
    }

    if args.intersect {
        return Ok(Strategy::Intersect);
    }
    if args.union {
        return Ok(Strategy::Union);
    }
    if !args.specific.is_empty() {
        return Ok(Strategy::Specific(args.specific.clone()));
    }
    if let Some(k) = args.exact_support {
        if k <= 0 {
            return Err(AppError::UserInput(ArgError::NonPositiveSupportBound));
        }
        return Ok(Strategy::ExactSupport(k));
    }
    if has_range {
        if args.min_support.is_some_and(|v| v <= 0) || args.max_support.is_some_and(|v| v <= 0) {
            return Err(AppError::UserInput(ArgError::NonPositiveSupportBound));
        }
        return Ok(Strategy::SupportRange {
            min: args.min_support,
            max: args.max_support,
        });
    }
    if let Some(expr) = &args.expression {
        return Ok(Strategy::Expression(expr.clone()));
    }
    unreachable!("every strategy branch above is covered by `given`")
}

fn validate_names(args: &Args) -> Result<(), AppError> {
    if args.caller_names.is_some() && args.mode != ModeArg::Caller {
        return Err(AppError::UserInput(ArgError::CallerNamesNeedCallerMode));
    }
    if args.sample_names.is_some() && args.mode != ModeArg::Sample {
        return Err(AppError::UserInput(ArgError::SampleNamesNeedSampleMode));
    }
    Ok(())
}

/// §4.10's required concatenation order for the final emitted set: every
/// non-TRA/non-BND cluster, then TRA clusters, then residual BND clusters.
fn partition_emission_order<'a>(clusters: Vec<&'a Cluster>) -> Vec<&'a Cluster> {
    let (tra, rest): (Vec<_>, Vec<_>) = clusters.into_iter().partition(|c| c.first().svtype() == SvType::Tra);
    let (bnd, other): (Vec<_>, Vec<_>) = rest.into_iter().partition(|c| c.first().svtype() == SvType::Bnd);
    other.into_iter().chain(tra).chain(bnd).collect()
}

/// Run the `merge` subcommand: read every input (already corrected, or
/// produced directly in DEL/DUP/INV/INS/TRA/BND form by a caller), cluster
/// by type-specific similarity, apply the selected strategy, and emit.
pub fn run(_common: &common::Args, args: &Args) -> Result<(), AppError> {
    let all_files = all_input_files(args);
    if all_files.is_empty() {
        return Err(AppError::UserInput(ArgError::NoInputFiles));
    }
    validate_names(args)?;
    let strategy = resolve_strategy(args)?;

    let custom_names: Vec<String> = match args.mode {
        ModeArg::Caller => args.caller_names.clone(),
        ModeArg::Sample => args.sample_names.clone(),
    }
    .map(|csv| csv.split(',').map(|s| s.trim().to_string()).collect())
    .unwrap_or_default();
    let name_map = NameMap::new(&all_files, &custom_names)?;

    let mut all_records = Vec::new();
    let mut contig_lists = Vec::new();
    for path in &all_files {
        tracing::info!("reading {}", path);
        let parsed = read_records(path, path).map_err(AppError::Internal)?;
        all_records.extend(parsed.records);
        contig_lists.push(parsed.contigs);
    }
    let contigs = merge_contigs(contig_lists);
    tracing::info!("read {} records total", all_records.len().separate_with_commas());
    trace_rss_now();

    let params = cluster_params(args);
    let clusters = cluster_records(all_records, &params);
    tracing::info!("formed {} clusters", clusters.len().separate_with_commas());
    trace_rss_now();

    let selected = select_clusters(&clusters, &all_files, &strategy)?;
    let ordered = partition_emission_order(selected);
    tracing::info!("selected {} clusters for output", ordered.len().separate_with_commas());

    let mut writer = crate::common::io::open_write_maybe_gz(&args.output_file).map_err(AppError::Internal)?;
    let ctx = EmitContext {
        mode: args.mode.into(),
        all_files: &all_files,
        name_map: &name_map,
        contigs: &contigs,
    };
    write_output(&mut writer, &ordered, &ctx, chrono::Local::now()).map_err(|e| AppError::Internal(e.into()))?;

    Ok(())
}
