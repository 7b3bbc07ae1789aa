use crate::error::Result;
use crate::filter::FilterSpec;
use crate::parser::{AccessRecord, parse_line};
use crate::source::LogSource;
use crate::stats::Summary;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Statistics accumulated over one run.
///
/// `total_requests` always equals `response_sizes.len()` and the sum of any
/// one of the frequency maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_requests: usize,
    pub resources: FxHashMap<String, usize>,
    pub status_codes: FxHashMap<String, usize>,
    pub methods: FxHashMap<String, usize>,
    pub remote_addrs: FxHashMap<String, usize>,
    pub response_sizes: Vec<u64>,
    pub error_resources: FxHashSet<String>,
    pub sources: Vec<String>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one accepted record into every counter.
    pub fn record(&mut self, record: &AccessRecord<'_>) {
        self.total_requests += 1;
        *self.resources.entry(record.source.to_string()).or_insert(0) += 1;
        *self.status_codes.entry(record.status.to_string()).or_insert(0) += 1;
        self.response_sizes.push(record.body_bytes_sent);
        *self.methods.entry(record.method.to_string()).or_insert(0) += 1;
        *self.remote_addrs.entry(record.remote_addr.to_string()).or_insert(0) += 1;

        if record.is_error() && !self.error_resources.contains(record.source) {
            self.error_resources.insert(record.source.to_string());
        }
    }

    /// Mean and 95th percentile of the response sizes.
    pub fn summary(&self) -> Summary {
        Summary::from_sizes(&self.response_sizes)
    }
}

/// Drives lines through parse, filter and aggregation.
#[derive(Debug, Clone, Default)]
pub struct LogAnalyzer {
    filter: FilterSpec,
}

impl LogAnalyzer {
    pub fn new(filter: FilterSpec) -> Self {
        LogAnalyzer { filter }
    }

    /// Decides a single line. `Ok(None)` when the line is malformed or
    /// filtered out.
    pub fn analyze_line<'a>(&self, line: &'a str) -> Result<Option<AccessRecord<'a>>> {
        let Some(record) = parse_line(line) else {
            return Ok(None);
        };
        if self.filter.matches(&record)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// Consumes `lines` once and returns the accumulated statistics.
    ///
    /// Stops at the first fatal error; malformed lines are skipped.
    pub fn analyze_lines<I, S>(&self, lines: I) -> Result<AnalysisResult>
    where
        I: IntoIterator<Item = Result<S>>,
        S: AsRef<str>,
    {
        let mut result = AnalysisResult::new();
        let mut skipped_lines = 0usize;

        for line in lines {
            let line = line?;
            match self.analyze_line(line.as_ref())? {
                Some(record) => result.record(&record),
                None => skipped_lines += 1,
            }
        }

        debug!(
            accepted = result.total_requests,
            skipped = skipped_lines,
            "finished reading lines"
        );
        Ok(result)
    }

    /// Full run over a [`LogSource`], recording which files/URL were read.
    pub fn analyze(&self, source: &LogSource) -> Result<AnalysisResult> {
        let mut result = self.analyze_lines(source.lines()?)?;
        result.sources = source.files();

        info!(
            sources = result.sources.len(),
            requests = result.total_requests,
            "analysis complete"
        );
        Ok(result)
    }
}
