use crate::analyzer::AnalysisResult;
use crate::error::{Error, Result};
use crate::stats::Summary;
use clap::ValueEnum;
use http::StatusCode;
use serde::Serialize;
use std::cmp::Reverse;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Output layout of the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Adoc,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Adoc => "adoc",
            ReportFormat::Json => "json",
        }
    }
}

/// Everything a rendering needs: the statistics plus the run parameters.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub result: &'a AnalysisResult,
    pub summary: Summary,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a AnalysisResult, from: Option<&'a str>, to: Option<&'a str>) -> Self {
        Self {
            result,
            summary: result.summary(),
            from,
            to,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [String],
    from: Option<&'a str>,
    to: Option<&'a str>,
    total_requests: usize,
    average_response_size: Option<f64>,
    p95_response_size: Option<f64>,
    resources: Vec<KeyCount<'a>>,
    status_codes: Vec<StatusCount<'a>>,
    methods: Vec<KeyCount<'a>>,
    remote_addrs: Vec<KeyCount<'a>>,
    error_resources: Vec<&'a str>,
}

#[derive(Serialize)]
struct KeyCount<'a> {
    key: &'a str,
    count: usize,
}

#[derive(Serialize)]
struct StatusCount<'a> {
    code: &'a str,
    name: &'static str,
    count: usize,
}

/// Canonical reason phrase for a status code, or `Unknown`.
pub fn status_name(code: &str) -> &'static str {
    StatusCode::from_bytes(code.as_bytes())
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown")
}

/// `1234567` -> `1_234_567`
pub fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }
    out
}

/// Two decimals with grouped integer part, `-` when there is no data.
pub fn format_size(value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) => {
            let fixed = format!("{:.2}", v);
            let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
            let grouped = int_part
                .parse::<u128>()
                .map(group_thousands)
                .unwrap_or_else(|_| int_part.to_string());
            format!("{}.{}", grouped, frac_part)
        }
    }
}

// Descending by count, ties broken by key so output is stable.
fn by_count(map: &rustc_hash::FxHashMap<String, usize>) -> Vec<(&str, usize)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by_key(|&(key, count)| (Reverse(count), key));
    entries
}

fn by_code(map: &rustc_hash::FxHashMap<String, usize>) -> Vec<(&str, usize)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_unstable();
    entries
}

fn error_resources(result: &AnalysisResult) -> Vec<&str> {
    let mut urls: Vec<&str> = result.error_resources.iter().map(String::as_str).collect();
    urls.sort_unstable();
    urls
}

fn write_markdown<W: Write>(report: &Report<'_>, writer: &mut W) -> io::Result<()> {
    let result = report.result;

    writeln!(writer, "#### General information\n")?;
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "|:---|---:|")?;
    writeln!(writer, "| Files | {} |", result.sources.join(", "))?;
    writeln!(writer, "| From | {} |", report.from.unwrap_or("-"))?;
    writeln!(writer, "| To | {} |", report.to.unwrap_or("-"))?;
    writeln!(
        writer,
        "| Requests | {} |",
        group_thousands(result.total_requests as u128)
    )?;
    writeln!(
        writer,
        "| Average response size | {} |",
        format_size(report.summary.mean)
    )?;
    writeln!(
        writer,
        "| 95p response size | {} |",
        format_size(report.summary.p95)
    )?;

    writeln!(writer, "\n#### Requested resources\n")?;
    writeln!(writer, "| Resource | Count |")?;
    writeln!(writer, "|:---|---:|")?;
    for (resource, count) in by_count(&result.resources) {
        writeln!(writer, "| `{}` | {} |", resource, group_thousands(count as u128))?;
    }

    writeln!(writer, "\n#### Response codes\n")?;
    writeln!(writer, "| Code | Name | Count |")?;
    writeln!(writer, "|:---:|:---|---:|")?;
    for (code, count) in by_code(&result.status_codes) {
        writeln!(
            writer,
            "| {} | {} | {} |",
            code,
            status_name(code),
            group_thousands(count as u128)
        )?;
    }

    writeln!(writer, "\n#### Request methods\n")?;
    writeln!(writer, "| Method | Count |")?;
    writeln!(writer, "|:---|---:|")?;
    for (method, count) in by_count(&result.methods) {
        writeln!(writer, "| {} | {} |", method, group_thousands(count as u128))?;
    }

    writeln!(writer, "\n#### IP addresses\n")?;
    writeln!(writer, "| IP address | Requests |")?;
    writeln!(writer, "|:---|---:|")?;
    for (addr, count) in by_count(&result.remote_addrs) {
        writeln!(writer, "| {} | {} |", addr, group_thousands(count as u128))?;
    }

    writeln!(writer, "\n#### Error resources\n")?;
    let errors: Vec<String> = error_resources(result)
        .into_iter()
        .map(|url| format!("`{}`", url))
        .collect();
    writeln!(writer, "{}", errors.join(", "))?;

    Ok(())
}

fn write_adoc<W: Write>(report: &Report<'_>, writer: &mut W) -> io::Result<()> {
    let result = report.result;

    writeln!(writer, "=== General information\n")?;
    writeln!(writer, "* **Files:** {}", result.sources.join(", "))?;
    writeln!(writer, "* **From:** {}", report.from.unwrap_or("-"))?;
    writeln!(writer, "* **To:** {}", report.to.unwrap_or("-"))?;
    writeln!(
        writer,
        "* **Requests:** {}",
        group_thousands(result.total_requests as u128)
    )?;
    writeln!(
        writer,
        "* **Average response size:** {}",
        format_size(report.summary.mean)
    )?;
    writeln!(
        writer,
        "* **95th percentile response size:** {}\n",
        format_size(report.summary.p95)
    )?;

    writeln!(writer, "=== Requested resources\n")?;
    writeln!(writer, "[options=\"header\"]\n|===\n|Resource |Count")?;
    for (resource, count) in by_count(&result.resources) {
        writeln!(writer, "|`{}` |{}", resource, group_thousands(count as u128))?;
    }
    writeln!(writer, "|===\n")?;

    writeln!(writer, "=== Response codes\n")?;
    writeln!(writer, "[options=\"header\"]\n|===\n|Code |Name |Count")?;
    for (code, count) in by_code(&result.status_codes) {
        writeln!(
            writer,
            "|{} |{} |{}",
            code,
            status_name(code),
            group_thousands(count as u128)
        )?;
    }
    writeln!(writer, "|===\n")?;

    writeln!(writer, "=== Request methods\n")?;
    writeln!(writer, "[options=\"header\"]\n|===\n|Method |Count")?;
    for (method, count) in by_count(&result.methods) {
        writeln!(writer, "|{} |{}", method, group_thousands(count as u128))?;
    }
    writeln!(writer, "|===\n")?;

    writeln!(writer, "=== IP addresses\n")?;
    writeln!(writer, "[options=\"header\"]\n|===\n|IP address |Requests")?;
    for (addr, count) in by_count(&result.remote_addrs) {
        writeln!(writer, "|{} |{}", addr, group_thousands(count as u128))?;
    }
    writeln!(writer, "|===\n")?;

    writeln!(writer, "=== Error resources\n")?;
    let errors: Vec<String> = error_resources(result)
        .into_iter()
        .map(|url| format!("`{}`", url))
        .collect();
    writeln!(writer, "{}", errors.join(", "))?;

    Ok(())
}

fn key_counts(entries: Vec<(&str, usize)>) -> Vec<KeyCount<'_>> {
    entries
        .into_iter()
        .map(|(key, count)| KeyCount { key, count })
        .collect()
}

fn write_json<W: Write>(report: &Report<'_>, writer: &mut W) -> io::Result<()> {
    let result = report.result;
    let json = JsonReport {
        files: &result.sources,
        from: report.from,
        to: report.to,
        total_requests: result.total_requests,
        average_response_size: report.summary.mean,
        p95_response_size: report.summary.p95,
        resources: key_counts(by_count(&result.resources)),
        status_codes: by_code(&result.status_codes)
            .into_iter()
            .map(|(code, count)| StatusCount {
                code,
                name: status_name(code),
                count,
            })
            .collect(),
        methods: key_counts(by_count(&result.methods)),
        remote_addrs: key_counts(by_count(&result.remote_addrs)),
        error_resources: error_resources(result),
    };

    serde_json::to_writer_pretty(&mut *writer, &json)?;
    writeln!(writer)
}

/// Writes `report` in `format` to any writer.
pub fn write_report<W: Write>(
    report: &Report<'_>,
    format: ReportFormat,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ReportFormat::Markdown => write_markdown(report, writer),
        ReportFormat::Adoc => write_adoc(report, writer),
        ReportFormat::Json => write_json(report, writer),
    }
}

pub fn render(report: &Report<'_>, format: ReportFormat) -> String {
    let mut buf = Vec::new();
    write_report(report, format, &mut buf).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn print_report(report: &Report<'_>, format: ReportFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(report, format, &mut handle)?;
    handle.flush()
}

/// Saves the report next to `base`, adding the format's extension.
///
/// Parent directories are created as needed. Returns the written path.
pub fn save_report(report: &Report<'_>, format: ReportFormat, base: &Path) -> Result<PathBuf> {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(format.extension());
    let path = PathBuf::from(path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    let mut file = fs::File::create(&path).map_err(|e| Error::io(&path, e))?;
    write_report(report, format, &mut file).map_err(|e| Error::io(&path, e))?;
    Ok(path)
}
