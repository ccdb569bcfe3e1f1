use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use factory_lint::{collect_ruby_files, load_config, FileReport, Linter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Lint FactoryBot definitions in Ruby files
#[derive(Debug, Parser)]
#[command(name = "factory-lint", version, about)]
struct Cli {
    /// Configuration file (defaults to $FACTORY_LINT_CONFIG, then .factory-lint.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rewrite files with every available correction
    #[arg(short = 'a', long)]
    autocorrect: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Files or directories to inspect
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    offense_count: usize,
    errors: Vec<String>,
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;
    let root = std::env::current_dir().context("failed to resolve working directory")?;
    let linter = Linter::for_project(&config, &root)?;

    let exclude = config.exclude_set()?;
    let files = collect_ruby_files(&cli.paths, exclude.as_ref())?;
    tracing::debug!(files = files.len(), "collected files");

    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for (path, result) in linter.lint_files(&files, cli.autocorrect) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %format!("{:#}", e), "file skipped");
                errors.push(format!("{}: {:#}", path.display(), e));
            }
        }
    }

    let offense_count: usize = reports.iter().map(|r| r.offenses.len()).sum();
    match cli.format {
        OutputFormat::Json => {
            let report = JsonReport {
                files: &reports,
                offense_count,
                errors,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for report in &reports {
                for o in &report.offenses {
                    println!("{}:{}:{}: {}: {}", report.path.display(), o.line, o.column, o.rule, o.message);
                }
            }
            for e in &errors {
                eprintln!("error: {}", e);
            }
            let corrected = reports.iter().filter(|r| r.corrected).count();
            println!(
                "\n{} file(s) inspected, {} offense(s){}",
                reports.len(),
                offense_count,
                if cli.autocorrect {
                    format!(", {} file(s) corrected", corrected)
                } else {
                    String::new()
                }
            );
        }
    }

    Ok(offense_count == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("factory-lint: {:#}", e);
            ExitCode::from(2)
        }
    }
}
