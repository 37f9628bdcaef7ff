use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use unlocked::logging::TracingFormat;

/// Work out which courses a student can take next.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = TracingFormat::Pretty, global = true)]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve unlocked courses from a completed-course list
    Resolve {
        /// Program whose catalog to use
        #[arg(long)]
        program: String,
        /// JSON array of `{code, name, status}` records
        #[arg(long)]
        completed: PathBuf,
        /// Credits completed so far
        #[arg(long, default_value_t = 0)]
        credits: u32,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show unlocked courses, from cache unless --reload is given
    Courses {
        /// Re-read the grade report and resolve again
        #[arg(long)]
        reload: bool,
        /// Saved grade report page
        #[arg(long, conflicts_with = "completed")]
        report: Option<PathBuf>,
        /// Completed-course info JSON, as printed by `report`
        #[arg(long)]
        completed: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print what a saved grade report page contains, as JSON
    Report {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolve() {
        let args = Args::parse_from([
            "unlocked", "resolve", "--program", "CSE", "--completed", "done.json", "--credits", "42",
        ]);
        match args.command {
            Command::Resolve { program, credits, format, .. } => {
                assert_eq!(program, "CSE");
                assert_eq!(credits, 42);
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn report_and_completed_conflict() {
        let res = Args::try_parse_from([
            "unlocked", "courses", "--reload", "--report", "a.html", "--completed", "b.json",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn tracing_flag_is_global() {
        let args = Args::parse_from(["unlocked", "report", "page.html", "--tracing", "json"]);
        assert_eq!(args.tracing, TracingFormat::Json);
    }

    #[test]
    fn clap_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
