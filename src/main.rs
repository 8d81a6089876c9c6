use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use hof_longevity::models::IndexBoundary;
use hof_longevity::pipeline::{self, Pipeline};
use hof_longevity::source::{InputPaths, load_inputs_async};
use hof_longevity::utils::io::{TableFormat, write_json};
use hof_longevity::utils::logging::console;
use hof_longevity::{PipelineConfig, UnknownDeathPolicy};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run every stage and write survival rows, cohort tables and the audit
    Run(#[clap(flatten)] RunArgs),
    /// Normalize the biographical table only
    Normalize(#[clap(flatten)] RunArgs),
    /// Build the matched cohort and write its views
    Match(#[clap(flatten)] RunArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Biographical table (Retrosheet biofile or Lahman People)
    people: PathBuf,

    /// Lahman HallOfFame table
    #[arg(long)]
    hall_of_fame: Option<PathBuf>,

    /// Correction table (subject_id, field, value, note)
    #[arg(long)]
    corrections: Option<PathBuf>,

    /// Source layout; detected from the file when omitted
    #[arg(long)]
    source: Option<String>,

    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Output table format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Snapshot date used for censoring (YYYY-MM-DD)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Alive-at-index comparison
    #[arg(long, value_enum)]
    index_boundary: Option<BoundaryArg>,

    /// Treat subjects with unknown survival to the index year as alive
    #[arg(long)]
    assume_alive: bool,

    /// Remove every inductee from the control pool
    #[arg(long)]
    exclude_all_inductees: bool,

    /// Cap on controls per treatment subject
    #[arg(long)]
    max_controls: Option<usize>,

    /// Seed for the control draw
    #[arg(long)]
    seed: Option<u64>,

    /// Only count Hall of Fame rows of this category
    #[arg(long)]
    category: Option<String>,

    /// Worker threads; defaults to the number of CPUs
    #[arg(long)]
    threads: Option<usize>,

    /// Run every stage on one thread
    #[arg(long)]
    no_parallel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Parquet,
}

impl From<OutputFormat> for TableFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => Self::Csv,
            OutputFormat::Parquet => Self::Parquet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BoundaryArg {
    Strict,
    Inclusive,
}

impl RunArgs {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("Failed to read configuration {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(date) = self.as_of {
            config.as_of_date = date;
        }
        if let Some(category) = &self.category {
            config.hall_of_fame_category = Some(category.clone());
        }
        if self.no_parallel {
            config.parallel = false;
            config.matching.use_parallel = false;
        }

        let criteria = &mut config.matching.criteria;
        match self.index_boundary {
            Some(BoundaryArg::Strict) => criteria.index_boundary = IndexBoundary::Strict,
            Some(BoundaryArg::Inclusive) => criteria.index_boundary = IndexBoundary::Inclusive,
            None => {}
        }
        if self.assume_alive {
            criteria.unknown_death_policy = UnknownDeathPolicy::AssumeAlive;
        }
        if self.exclude_all_inductees {
            criteria.exclude_all_inductees = true;
        }
        if let Some(max) = self.max_controls {
            config.matching.max_controls_per_treatment = Some(max);
        }
        if let Some(seed) = self.seed {
            config.matching.random_seed = Some(seed);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn inputs(&self) -> InputPaths {
        let mut inputs = InputPaths::new(&self.people);
        if let Some(path) = &self.hall_of_fame {
            inputs = inputs.with_hall_of_fame(path);
        }
        if let Some(path) = &self.corrections {
            inputs = inputs.with_corrections(path);
        }
        if let Some(name) = &self.source {
            inputs = inputs.with_source(name);
        }
        inputs
    }
}

fn init_thread_pool(threads: Option<usize>) -> anyhow::Result<()> {
    let threads = threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to build the rayon thread pool")?;
    info!("Using {threads} worker threads");
    Ok(())
}

async fn run(args: &RunArgs) -> anyhow::Result<()> {
    let config = args.pipeline_config()?;
    info!("{config}");
    let pipeline = Pipeline::new(config)?;
    let output = pipeline
        .run_async(&args.inputs())
        .await
        .context("Pipeline run failed")?;

    let written = output.write_all(&args.out_dir, args.format.into())?;
    console::print_run_summary(&output.audit);
    console::print_written_files(&written);
    Ok(())
}

async fn normalize(args: &RunArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = args.pipeline_config()?;
    let pipeline = Pipeline::new(config)?;
    let loaded = load_inputs_async(&args.inputs(), pipeline.config())
        .await
        .context("Failed to load inputs")?;
    let outcome = pipeline.normalize(loaded.extract.records, loaded.corrections);

    let format = args.format.into();
    let issues = pipeline::NormalizationIssues {
        field_issues: outcome.issues,
        order_violations: outcome.violations,
    };
    let mut written = vec![
        pipeline::write_normalized(&args.out_dir, format, &outcome.records)?,
        pipeline::write_issues(&args.out_dir, &issues)?,
    ];
    let audit_path = args.out_dir.join("normalization_audit.json");
    write_json(&audit_path, &outcome.audit)?;
    written.push(audit_path);

    console::print_normalization_summary(&outcome.audit);
    console::print_written_files(&written);
    info!("Normalization finished in {:?}", start.elapsed());
    Ok(())
}

async fn match_cohort(args: &RunArgs) -> anyhow::Result<()> {
    let config = args.pipeline_config()?;
    let pipeline = Pipeline::new(config)?;
    let output = pipeline
        .run_async(&args.inputs())
        .await
        .context("Pipeline run failed")?;

    let mut written = pipeline::write_cohort(&args.out_dir, args.format.into(), &output.cohort)?;
    let audit_path = args.out_dir.join("matching_audit.json");
    write_json(&audit_path, output.cohort.stats())?;
    written.push(audit_path);

    console::print_matching_summary(output.cohort.stats());
    console::print_written_files(&written);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let args = match &cli.command {
        Command::Run(args) | Command::Normalize(args) | Command::Match(args) => args,
    };
    init_thread_pool(if args.no_parallel { Some(1) } else { args.threads })?;

    match &cli.command {
        Command::Run(args) => run(args).await,
        Command::Normalize(args) => normalize(args).await,
        Command::Match(args) => match_cohort(args).await,
    }
}
