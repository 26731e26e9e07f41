use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputFileNotFound,
    InputMalformed,
    InputMissing,

    HistoryNotFound,
    GitCommandFailed,

    OutputWriteFailed,

    InternalIoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InputFileNotFound => "input.file_not_found",
            ErrorCode::InputMalformed => "input.malformed",
            ErrorCode::InputMissing => "input.missing",

            ErrorCode::HistoryNotFound => "history.not_found",
            ErrorCode::GitCommandFailed => "git.command_failed",

            ErrorCode::OutputWriteFailed => "output.write_failed",

            ErrorCode::InternalIoError => "internal.io_error",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub hints: Vec<String>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hints: Vec::new(),
        }
    }

    pub fn input_file_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::InputFileNotFound,
            format!("No such file: '{}'", path.display()),
        )
    }

    pub fn input_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InputMalformed, message)
    }

    pub fn input_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InputMissing, message)
    }

    pub fn history_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::HistoryNotFound, message)
    }

    pub fn git_command_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GitCommandFailed, message)
    }

    pub fn output_write_failed(path: &Path, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::OutputWriteFailed,
            format!("Cannot write '{}': {}", path.display(), reason.into()),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let error = error.into();
        let message = match context {
            Some(context) => format!("{}: {}", context, error),
            None => error,
        };
        Self::new(ErrorCode::InternalIoError, message)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(message.into());
        self
    }
}
