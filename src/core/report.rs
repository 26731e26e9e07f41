//! Stderr diagnostics and exit code mapping.
//!
//! Every binary reports failures the same way: `error: <message>` on
//! stderr (red when stderr is a terminal), indented `hint:` lines, and
//! an exit code derived from the error code's family.

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use crate::core::error::{Error, ErrorCode, Result};

const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Map an error code to its process exit code.
///
/// Input-side failures exit 2 (same family as clap's usage errors),
/// git failures exit 20, write failures and unexpected I/O exit 1.
pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InputFileNotFound
        | ErrorCode::InputMalformed
        | ErrorCode::InputMissing
        | ErrorCode::HistoryNotFound => 2,

        ErrorCode::GitCommandFailed => 20,

        ErrorCode::OutputWriteFailed | ErrorCode::InternalIoError => 1,
    }
}

/// Print a standalone `error:` diagnostic line to stderr.
pub fn diagnostic(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}error: {}{}", RED, message, RESET);
    } else {
        eprintln!("error: {}", message);
    }
}

/// Report an error to stderr with its hints.
pub fn report_error(err: &Error) {
    diagnostic(&err.message);
    for hint in &err.hints {
        eprintln!("  hint: {}", hint);
    }
}

/// Report an error and produce the exit code for it.
pub fn fail(err: &Error) -> ExitCode {
    report_error(err);
    ExitCode::from(exit_code_for_error(err.code) as u8)
}

/// Write a payload to stdout.
///
/// A closed pipe is not an error: downstream tools like `head` close
/// stdout early, and the run should still exit 0.
pub fn write_stdout(payload: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = write!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_exit_two() {
        assert_eq!(exit_code_for_error(ErrorCode::InputFileNotFound), 2);
        assert_eq!(exit_code_for_error(ErrorCode::InputMalformed), 2);
        assert_eq!(exit_code_for_error(ErrorCode::InputMissing), 2);
        assert_eq!(exit_code_for_error(ErrorCode::HistoryNotFound), 2);
    }

    #[test]
    fn git_errors_exit_twenty() {
        assert_eq!(exit_code_for_error(ErrorCode::GitCommandFailed), 20);
    }

    #[test]
    fn output_and_internal_errors_exit_one() {
        assert_eq!(exit_code_for_error(ErrorCode::OutputWriteFailed), 1);
        assert_eq!(exit_code_for_error(ErrorCode::InternalIoError), 1);
    }

    #[test]
    fn write_stdout_accepts_payload() {
        assert!(write_stdout("").is_ok());
    }
}
