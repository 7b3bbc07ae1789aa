pub mod analyzer;
pub mod cli;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod logging;
pub mod parser;
pub mod source;
pub mod stats;

// Re-export key types for convenience
pub use analyzer::{AnalysisResult, LogAnalyzer};
pub use cli::Args;
pub use error::{Error, Result};
pub use filter::FilterSpec;
pub use formatter::{Report, ReportFormat};
pub use parser::{AccessRecord, parse_line};
pub use source::LogSource;
pub use stats::Summary;
