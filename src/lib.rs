/// Macro for prefixed status logging to stderr (only when stderr is a terminal).
///
/// Usage:
/// ```ignore
/// log_status!("csv2md", "Wrote {} ({} rows)", path, rows);
/// log_status!("mkchangelog", "Wrote {} ({} releases)", path, releases);
/// ```
#[macro_export]
macro_rules! log_status {
    ($prefix:expr, $($arg:tt)*) => {
        if ::std::io::IsTerminal::is_terminal(&::std::io::stderr()) {
            eprintln!(concat!("[", $prefix, "] {}"), format_args!($($arg)*));
        }
    };
}

pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `oddjobs::changelog` instead of `oddjobs::core::changelog`
pub use self::core::*;
pub use self::utils::*;
