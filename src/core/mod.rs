// Public modules
pub mod changelog;
pub mod error;
pub mod git;
pub mod report;
pub mod table;
pub mod title;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
