use crate::cli::{Args, Command, OutputFormat};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error};
use unlocked::app::{App, Snapshot};
use unlocked::config::Config;
use unlocked::json::decode_with_context;
use unlocked::logging::setup_logging;
use unlocked::models::{CompletedInfo, CourseRecord, UnlockedCourseList};
use unlocked::render::render_text;
use unlocked::report::{CompletedCourseSource, CompletedInfoFile, GradeReportFile};

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config and setup logging before anything else so no logs are dropped
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        catalog_dir = %config.catalog_dir.display(),
        cache = %config.cache_path.display(),
        retake_policy = ?config.retake_policy,
        "configuration loaded"
    );

    match run(args.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = format!("{e:#}"), "command failed");
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let app = App::new(config)?;

    match command {
        Command::Resolve {
            program,
            completed,
            credits,
            format,
        } => {
            let records: Vec<CourseRecord> = read_json(&completed).await?;
            let info = CompletedInfo {
                completed: records,
                program,
                credits_completed: credits,
            };
            let unlocked = app.resolve(&info).await?;
            print_unlocked(&unlocked, &info.program, format)
        }
        Command::Courses {
            reload,
            report,
            completed,
            format,
        } => {
            let snapshot = if reload {
                let source: Box<dyn CompletedCourseSource> = match (report, completed) {
                    (Some(path), _) => Box::new(GradeReportFile::new(path)),
                    (None, Some(path)) => Box::new(CompletedInfoFile::new(path)),
                    (None, None) => {
                        anyhow::bail!("--reload needs a grade report (--report) or --completed file")
                    }
                };
                app.reload(source.as_ref()).await?
            } else {
                match app.cached().await? {
                    Some(snapshot) => snapshot,
                    None => anyhow::bail!("No data found! Please reload."),
                }
            };
            let Snapshot { info, unlocked } = snapshot;
            print_unlocked(&unlocked, &info.program, format)
        }
        Command::Report { path } => {
            let info = GradeReportFile::new(path).completed_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    decode_with_context(&body).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_unlocked(unlocked: &UnlockedCourseList, program: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(unlocked, Some(program))),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(unlocked)?),
    }
    Ok(())
}
