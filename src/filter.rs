use crate::error::{Error, Result};
use crate::parser::AccessRecord;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use glob::{MatchOptions, Pattern};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 bound.
///
/// Values carrying an offset keep it. Naive date-times and plain dates are
/// taken as UTC.
pub fn parse_bound(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| Error::InvalidBound {
            value: value.to_string(),
        })
}

/// Rewrites a shell-style value pattern into one [`Pattern`] accepts.
///
/// Runs of `*` collapse into one, since a value has no path components to
/// recurse into. A `[` without a closing `]` is matched literally.
fn value_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                continue;
            }
            '[' => {
                // A class needs at least one member, so `]` right after
                // `[` or `[!` is a member and not the close.
                let start = if chars.get(i + 1) == Some(&'!') { i + 3 } else { i + 2 };
                let close = chars
                    .get(start..)
                    .and_then(|rest| rest.iter().position(|&c| c == ']'));
                match close {
                    Some(offset) => {
                        let end = start + offset;
                        out.extend(&chars[i..=end]);
                        i = end + 1;
                        continue;
                    }
                    None => out.push_str("[[]"),
                }
            }
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// A `(field, glob)` pair every included record has to satisfy.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    name: String,
    pattern: Pattern,
    case_sensitive: bool,
}

impl FieldFilter {
    pub fn new(name: &str, pattern: &str, case_sensitive: bool) -> Result<Self> {
        let compiled =
            Pattern::new(&value_pattern(pattern)).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            pattern: compiled,
            case_sensitive,
        })
    }

    /// Unknown field names never match.
    pub fn matches(&self, record: &AccessRecord<'_>) -> bool {
        let value = if self.case_sensitive {
            record.field(&self.name)
        } else {
            record.field_ignore_case(&self.name)
        };

        let Some(value) = value else {
            return false;
        };

        let options = MatchOptions {
            case_sensitive: self.case_sensitive,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.pattern.matches_with(&value, options)
    }
}

/// Inclusion criteria for records. Every configured check must pass.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub from: Option<DateTime<FixedOffset>>,
    pub to: Option<DateTime<FixedOffset>>,
    pub field: Option<FieldFilter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from(mut self, from: &str) -> Result<Self> {
        self.from = Some(parse_bound(from)?);
        Ok(self)
    }

    pub fn with_to(mut self, to: &str) -> Result<Self> {
        self.to = Some(parse_bound(to)?);
        Ok(self)
    }

    pub fn with_field(mut self, name: &str, pattern: &str, case_sensitive: bool) -> Result<Self> {
        self.field = Some(FieldFilter::new(name, pattern, case_sensitive)?);
        Ok(self)
    }

    /// Decides whether `record` is included.
    ///
    /// The field check runs first. The timestamp is parsed for every record
    /// that gets past it, and a parse failure is fatal for the run.
    pub fn matches(&self, record: &AccessRecord<'_>) -> Result<bool> {
        if let Some(field) = &self.field {
            if !field.matches(record) {
                return Ok(false);
            }
        }

        let time = record.timestamp()?;

        if let Some(from) = self.from {
            if time < from {
                return Ok(false);
            }
        }
        if let Some(to) = self.to {
            if time > to {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn line(time: &str, status: &str, agent: &str) -> String {
        format!(
            r#"127.0.0.1 - - [{time}] "GET /index.html HTTP/1.1" {status} 1234 "-" "{agent}""#
        )
    }

    #[test]
    fn test_parse_bound_naive_is_utc() {
        let dt = parse_bound("2024-11-09T09:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-11-09T09:30:00+00:00");

        let dt = parse_bound("2024-11-09").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-11-09T00:00:00+00:00");

        let dt = parse_bound("2024-11-09 09:30").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-11-09T09:30:00+00:00");
    }

    #[test]
    fn test_parse_bound_keeps_offset() {
        let dt = parse_bound("2024-11-09T12:30:00+03:00").unwrap();
        assert_eq!(dt, parse_bound("2024-11-09T09:30:00").unwrap());
    }

    #[test]
    fn test_parse_bound_rejects_garbage() {
        assert!(matches!(
            parse_bound("last tuesday"),
            Err(Error::InvalidBound { .. })
        ));
    }

    #[test]
    fn test_empty_spec_accepts_everything() {
        let spec = FilterSpec::new();
        let l = line("09/Nov/2024:10:00:00 +0000", "200", "Mozilla/5.0");
        assert!(spec.matches(&parse_line(&l).unwrap()).unwrap());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let spec = FilterSpec::new()
            .with_from("2024-11-09T09:30:00")
            .unwrap()
            .with_to("2024-11-09T10:30:00")
            .unwrap();

        for (time, expected) in [
            ("09/Nov/2024:09:29:59 +0000", false),
            ("09/Nov/2024:09:30:00 +0000", true),
            ("09/Nov/2024:10:30:00 +0000", true),
            ("09/Nov/2024:10:30:01 +0000", false),
            // 12:45 at +0300 is 09:45 UTC
            ("09/Nov/2024:12:45:00 +0300", true),
        ] {
            let l = line(time, "200", "-");
            assert_eq!(spec.matches(&parse_line(&l).unwrap()).unwrap(), expected, "{time}");
        }
    }

    #[test]
    fn test_field_glob() {
        let spec = FilterSpec::new()
            .with_field("http_user_agent", "Mozilla*", true)
            .unwrap();

        let hit = line("09/Nov/2024:10:00:00 +0000", "200", "Mozilla/5.0");
        let miss = line("09/Nov/2024:10:00:00 +0000", "200", "curl/8.4.0");
        assert!(spec.matches(&parse_line(&hit).unwrap()).unwrap());
        assert!(!spec.matches(&parse_line(&miss).unwrap()).unwrap());
    }

    #[test]
    fn test_field_question_mark_wildcard() {
        let spec = FilterSpec::new().with_field("status", "4??", true).unwrap();
        let l = line("09/Nov/2024:10:00:00 +0000", "404", "-");
        assert!(spec.matches(&parse_line(&l).unwrap()).unwrap());
        let l = line("09/Nov/2024:10:00:00 +0000", "200", "-");
        assert!(!spec.matches(&parse_line(&l).unwrap()).unwrap());
    }

    #[test]
    fn test_case_sensitivity_is_configurable() {
        let l = line("09/Nov/2024:10:00:00 +0000", "200", "Mozilla/5.0");
        let record = parse_line(&l).unwrap();

        let strict = FilterSpec::new()
            .with_field("HTTP_USER_AGENT", "mozilla*", true)
            .unwrap();
        assert!(!strict.matches(&record).unwrap());

        let relaxed = FilterSpec::new()
            .with_field("HTTP_USER_AGENT", "mozilla*", false)
            .unwrap();
        assert!(relaxed.matches(&record).unwrap());
    }

    #[test]
    fn test_unknown_field_rejects() {
        let spec = FilterSpec::new().with_field("agent", "*", true).unwrap();
        let l = line("09/Nov/2024:10:00:00 +0000", "200", "Mozilla/5.0");
        assert!(!spec.matches(&parse_line(&l).unwrap()).unwrap());
    }

    #[test]
    fn test_field_and_time_compose_with_and() {
        let spec = FilterSpec::new()
            .with_from("2024-11-09T09:30:00")
            .unwrap()
            .with_field("status", "200", true)
            .unwrap();

        let both = line("09/Nov/2024:10:00:00 +0000", "200", "-");
        let too_early = line("09/Nov/2024:09:00:00 +0000", "200", "-");
        let wrong_status = line("09/Nov/2024:10:00:00 +0000", "404", "-");

        assert!(spec.matches(&parse_line(&both).unwrap()).unwrap());
        assert!(!spec.matches(&parse_line(&too_early).unwrap()).unwrap());
        assert!(!spec.matches(&parse_line(&wrong_status).unwrap()).unwrap());
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let spec = FilterSpec::new();
        let l = line("09/Nov/2024 10:00", "200", "-");
        assert!(matches!(
            spec.matches(&parse_line(&l).unwrap()),
            Err(Error::Timestamp { .. })
        ));
    }

    #[test]
    fn test_bad_timestamp_behind_field_mismatch_is_not_fatal() {
        let spec = FilterSpec::new().with_field("status", "5*", true).unwrap();
        let l = line("not a time", "200", "-");
        assert!(!spec.matches(&parse_line(&l).unwrap()).unwrap());
    }

    #[test]
    fn test_value_pattern_normalization() {
        assert_eq!(value_pattern("Mozilla**"), "Mozilla*");
        assert_eq!(value_pattern("**Firefox***"), "*Firefox*");
        assert_eq!(value_pattern("["), "[[]");
        assert_eq!(value_pattern("a[b"), "a[[]b");
        assert_eq!(value_pattern("[!]"), "[[]!]");
        assert_eq!(value_pattern("4[0-9]?"), "4[0-9]?");
        assert_eq!(value_pattern("[]]x"), "[]]x");
        assert_eq!(value_pattern("[*]**"), "[*]*");
    }

    #[test]
    fn test_repeated_star_matches_like_single() {
        let spec = FilterSpec::new()
            .with_field("http_user_agent", "Mozilla**", true)
            .unwrap();
        let l = line("09/Nov/2024:10:00:00 +0000", "200", "Mozilla/5.0");
        assert!(spec.matches(&parse_line(&l).unwrap()).unwrap());

        let spec = FilterSpec::new()
            .with_field("http_user_agent", "*Firefox**", true)
            .unwrap();
        let l = line("09/Nov/2024:10:00:00 +0000", "200", "Mozilla/5.0 Firefox/133.0");
        assert!(spec.matches(&parse_line(&l).unwrap()).unwrap());
    }

    #[test]
    fn test_unbalanced_bracket_is_literal() {
        let spec = FilterSpec::new()
            .with_field("source", "/items[1*", true)
            .unwrap();
        let hit = r#"127.0.0.1 - - [09/Nov/2024:10:00:00 +0000] "GET /items[1]?x HTTP/1.1" 200 1 "-" "-""#;
        let miss = r#"127.0.0.1 - - [09/Nov/2024:10:00:00 +0000] "GET /items1 HTTP/1.1" 200 1 "-" "-""#;
        assert!(spec.matches(&parse_line(hit).unwrap()).unwrap());
        assert!(!spec.matches(&parse_line(miss).unwrap()).unwrap());

        assert!(FilterSpec::new().with_field("source", "[", true).is_ok());
    }
}
