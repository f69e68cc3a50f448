use crate::infra::build_pipeline;
use clap::Args;
use risk_engine::config::{AppConfig, PipelineConfig};
use risk_engine::error::AppError;
use risk_engine::telemetry;
use risk_engine::workflows::intake::{
    stream_records_from_path, write_outputs, write_records, OutputPaths,
};
use risk_engine::workflows::synthetic::SyntheticApplicantSource;
use risk_engine::workflows::underwriting::{PartitionedRecords, RuleTable, ScoredRecord};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Number of synthetic applicants to generate (defaults to RISK_RECORD_COUNT or 1000)
    #[arg(long)]
    pub(crate) records: Option<usize>,
    /// Seed for reproducible batches
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Directory receiving valid_applicants.csv and rejected_applicants.csv
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Risk rule table: extended (default) or base
    #[arg(long)]
    pub(crate) rules: Option<RuleTable>,
    /// Number of scored rows to print after the run
    #[arg(long, default_value_t = 5)]
    pub(crate) preview: usize,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            records: None,
            seed: None,
            output_dir: None,
            rules: None,
            preview: 5,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Destination CSV file
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Number of synthetic applicants to generate (defaults to RISK_RECORD_COUNT or 1000)
    #[arg(long)]
    pub(crate) records: Option<usize>,
    /// Seed for reproducible batches
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Keep every generated row valid instead of corrupting the first two
    #[arg(long)]
    pub(crate) no_invalid: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Applicant CSV with a header row
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Directory receiving valid_applicants.csv and rejected_applicants.csv
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Risk rule table: extended (default) or base
    #[arg(long)]
    pub(crate) rules: Option<RuleTable>,
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_pipeline(args: RunArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let pipeline_config = apply_run_overrides(config.pipeline, &args);

    info!(
        records = pipeline_config.record_count,
        "generating synthetic applicants"
    );
    let records =
        SyntheticApplicantSource::new(pipeline_config.seed).generate(pipeline_config.record_count);

    let partitioned = build_pipeline(&pipeline_config)?.process(records);
    let paths = write_outputs(&pipeline_config.output_dir, &partitioned)?;

    info!(
        valid = partitioned.valid.len(),
        "successfully processed valid records"
    );
    render_summary(&partitioned, &paths, args.preview);
    Ok(())
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let count = args.records.unwrap_or(config.pipeline.record_count);
    let seed = args.seed.or(config.pipeline.seed);

    info!(records = count, output = %args.output.display(), "generating synthetic applicants");
    let records = SyntheticApplicantSource::new(seed)
        .inject_invalid(!args.no_invalid)
        .generate(count);

    if let Some(parent) = args
        .output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&args.output)?;
    write_records(BufWriter::new(file), &records)?;

    println!("Wrote {} applicants to {}", records.len(), args.output.display());
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let mut pipeline_config = config.pipeline;
    if let Some(dir) = args.output_dir {
        pipeline_config.output_dir = dir;
    }
    if let Some(rules) = args.rules {
        pipeline_config.rule_table = rules;
    }

    info!(input = %args.input.display(), "scoring applicant table");
    let rows = stream_records_from_path(&args.input)?;
    let partitioned = build_pipeline(&pipeline_config)?.try_process(rows)?;
    let paths = write_outputs(&pipeline_config.output_dir, &partitioned)?;

    render_summary(&partitioned, &paths, 0);
    Ok(())
}

fn apply_run_overrides(mut config: PipelineConfig, args: &RunArgs) -> PipelineConfig {
    if let Some(records) = args.records {
        config.record_count = records;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(rules) = args.rules {
        config.rule_table = rules;
    }
    config
}

fn render_summary(partitioned: &PartitionedRecords, paths: &OutputPaths, preview: usize) {
    let summary = partitioned.summary();

    println!("Applicant risk run");
    println!(
        "Processed {} records: {} valid, {} rejected",
        summary.total, summary.valid, summary.rejected
    );
    println!("Valid table: {}", paths.valid.display());
    println!("Rejected table: {}", paths.rejected.display());

    if preview > 0 && !partitioned.valid.is_empty() {
        println!("\nFirst {} scored applicants", preview.min(partitioned.valid.len()));
        for line in preview_lines(&partitioned.valid, preview) {
            println!("{line}");
        }
    }

    if !partitioned.rejected.is_empty() {
        println!("\nRejected applicants");
        for rejected in &partitioned.rejected {
            println!(
                "- {}: {}",
                rejected.record.applicant_id_label(),
                rejected.error_reason()
            );
        }
    }
}

fn preview_lines(valid: &[ScoredRecord], limit: usize) -> Vec<String> {
    valid
        .iter()
        .take(limit)
        .map(|scored| {
            let fields = scored
                .record
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("- {fields} risk_score={}", scored.risk_score)
        })
        .collect()
}
