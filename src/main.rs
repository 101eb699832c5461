use anyhow::{Context, Result};
use buildprof::{
    cli::{Cli, OutputFormat},
    config::IngestConfig,
    csv_output::CsvOutput,
    ingest::{IngestOutcome, Ingester},
    json_output::JsonOutput,
    summary::TextSummary,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` raises the level to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge config file, environment and CLI flags (later wins)
fn load_config(args: &Cli) -> Result<IngestConfig> {
    let config = match &args.config {
        Some(path) => IngestConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => IngestConfig::default(),
    };

    let mut config = config.with_env_overrides();
    if let Some(nesting) = args.nesting {
        config.nesting = nesting;
    }
    if let Some(job) = &args.job {
        config.job_name = Some(job.clone());
    }
    if args.enforce_path {
        config.enforce_path_pattern = true;
    }
    Ok(config)
}

fn render(format: OutputFormat, output: JsonOutput) -> Result<String> {
    match format {
        OutputFormat::Json => output.to_json(),
        OutputFormat::Ndjson => output.to_ndjson(),
        OutputFormat::Csv => {
            let mut csv = CsvOutput::new();
            for record in output.records {
                csv.add_record(record);
            }
            Ok(csv.to_csv())
        }
        OutputFormat::Text => {
            let mut summary = TextSummary::new();
            for record in output.records {
                summary.add_record(record);
            }
            Ok(summary.render())
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let ingester = Ingester::new(config, date).context("Invalid configuration")?;

    let mut output = JsonOutput::new();
    for path in &args.files {
        let outcome = ingester
            .ingest_file(path)
            .with_context(|| format!("Failed to ingest {}", path.display()))?;

        if let IngestOutcome::Skipped { reason } = &outcome {
            eprintln!("Skipped {}: {}", path.display(), reason);
        }
        output.add_outcome(outcome);
    }

    let rendered = render(args.format, output)?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
