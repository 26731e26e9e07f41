use std::process::ExitCode;

use clap::Parser;

use oddjobs::report;
use oddjobs::title;
use oddjobs::Error;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable CI systems use to expose the PR title.
const TITLE_ENV_VAR: &str = "PR_TITLE";

#[derive(Parser)]
#[command(name = "check-pr-title")]
#[command(version = VERSION)]
#[command(about = "Check that a pull-request title contains only ASCII characters")]
struct Cli {
    /// The title to check; falls back to the PR_TITLE environment variable
    title: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let title = match cli.title.or_else(|| std::env::var(TITLE_ENV_VAR).ok()) {
        Some(title) => title,
        None => {
            let err = Error::input_missing("No title supplied")
                .with_hint("Pass the title as the first argument")
                .with_hint(format!(
                    "Or set the {} environment variable",
                    TITLE_ENV_VAR
                ));
            return report::fail(&err);
        }
    };

    let result = title::check(&title);
    if result.is_valid() {
        return ExitCode::SUCCESS;
    }

    for offender in &result.offenders {
        report::diagnostic(&format!(
            "non-ASCII character '{}' ({}) at column {}",
            offender.character, offender.codepoint, offender.column
        ));
    }
    ExitCode::from(1)
}
