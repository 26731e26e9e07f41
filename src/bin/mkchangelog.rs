use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use oddjobs::changelog;
use oddjobs::git::LogRange;
use oddjobs::log_status;
use oddjobs::report;
use oddjobs::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "mkchangelog")]
#[command(version = VERSION)]
#[command(about = "Generate CHANGELOG.md from the current repository's git history")]
struct Cli {
    /// Oldest tag to include (exclusive)
    #[arg(long)]
    from: Option<String>,

    /// Newest ref to include; HEAD when omitted
    #[arg(long)]
    to: Option<String>,

    /// Destination file; CHANGELOG.md in the current directory when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the grouped releases as JSON to stdout instead of writing a file
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report::fail(&err),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let dir = std::env::current_dir().map_err(|e| {
        Error::internal_io(e.to_string(), Some("resolve current directory".to_string()))
    })?;

    let range = LogRange {
        from: cli.from.clone(),
        to: cli.to.clone(),
    };
    let releases = changelog::collect(&dir, &range)?;

    if cli.json {
        let payload = serde_json::to_string_pretty(&releases).map_err(|e| {
            Error::internal_io(e.to_string(), Some("serialize releases".to_string()))
        })?;
        report::write_stdout(&payload)?;
        report::write_stdout("\n")?;
        return Ok(());
    }

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| dir.join(changelog::DEFAULT_OUTPUT_FILE));
    let result = changelog::write(&path, &releases)?;

    if result.changed {
        log_status!(
            "mkchangelog",
            "Wrote {} ({} releases)",
            result.path.display(),
            result.releases
        );
    } else {
        log_status!(
            "mkchangelog",
            "{} already up to date ({} releases)",
            result.path.display(),
            result.releases
        );
    }

    Ok(())
}
