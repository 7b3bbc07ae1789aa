use crate::formatter::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "logsaw")]
#[clap(about = "Logsaw: request statistics from NGINX access logs", long_about = None)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Glob pattern of local log files, or an http(s) URL
    #[clap(long, value_name = "GLOB|URL")]
    pub path: String,

    /// Only count requests at or after this ISO-8601 date-time (UTC unless it carries an offset)
    #[clap(long = "from", value_name = "FROM_DATE")]
    pub from_date: Option<String>,

    /// Only count requests at or before this ISO-8601 date-time (UTC unless it carries an offset)
    #[clap(long = "to", value_name = "TO_DATE")]
    pub to_date: Option<String>,

    /// Report format
    #[clap(long, value_enum, ignore_case = true, default_value = "markdown")]
    pub format: ReportFormat,

    /// Record field to filter on (e.g. http_user_agent, method, status)
    #[clap(long, value_name = "FIELD", requires = "filter_value")]
    pub filter_field: Option<String>,

    /// Glob the filter field must match (e.g. "Mozilla*", GET)
    #[clap(long, value_name = "VALUE", requires = "filter_field")]
    pub filter_value: Option<String>,

    /// Match the filter field name and value case-insensitively
    #[clap(long)]
    pub ignore_case: bool,

    /// Also save the report to this path (extension is added per format)
    #[clap(short, long, value_name = "BASE")]
    pub output: Option<PathBuf>,
}
