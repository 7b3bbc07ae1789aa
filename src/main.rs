use anyhow::Context;
use clap::Parser;
use tracing::info;

use logsaw::analyzer::LogAnalyzer;
use logsaw::cli::Args;
use logsaw::filter::FilterSpec;
use logsaw::formatter::{Report, print_report, save_report};
use logsaw::logging::init_logging;
use logsaw::source::LogSource;

fn build_filter(args: &Args) -> logsaw::Result<FilterSpec> {
    let mut filter = FilterSpec::new();
    if let Some(from) = &args.from_date {
        filter = filter.with_from(from)?;
    }
    if let Some(to) = &args.to_date {
        filter = filter.with_to(to)?;
    }
    if let (Some(field), Some(value)) = (&args.filter_field, &args.filter_value) {
        filter = filter.with_field(field, value, !args.ignore_case)?;
    }
    Ok(filter)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let filter = build_filter(&args)?;
    let source = LogSource::open(&args.path)?;

    let analyzer = LogAnalyzer::new(filter);
    let result = analyzer
        .analyze(&source)
        .with_context(|| format!("failed to analyze {}", args.path))?;

    let report = Report::new(&result, args.from_date.as_deref(), args.to_date.as_deref());

    if let Some(base) = &args.output {
        let written = save_report(&report, args.format, base)?;
        info!(path = %written.display(), "report saved");
    }

    print_report(&report, args.format)?;

    Ok(())
}
