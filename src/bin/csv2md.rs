use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use oddjobs::log_status;
use oddjobs::report;
use oddjobs::table::{self, Table};
use oddjobs::Result;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "csv2md")]
#[command(version = VERSION)]
#[command(about = "Convert a CSV file to a Markdown table")]
struct Cli {
    /// Path to the input CSV file (first row is the header)
    input: PathBuf,

    /// Destination file; stdout when omitted
    output: Option<PathBuf>,

    /// Overwrite the destination if it already exists
    #[arg(long)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report::fail(&err),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let table = Table::from_csv_path(&cli.input)?;

    match &cli.output {
        Some(dest) => {
            table::write_markdown(&table, dest, cli.force)?;
            log_status!(
                "csv2md",
                "Wrote {} ({} rows)",
                dest.display(),
                table.rows.len()
            );
        }
        None => report::write_stdout(&table.render_markdown())?,
    }

    Ok(())
}
