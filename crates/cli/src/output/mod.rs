//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats. It also handles spinners, page tables and colored output.

mod formatter;
mod page;
mod progress;

pub use formatter::Formatter;
pub use page::render_page;
pub use progress::Spinner;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable spinners
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
