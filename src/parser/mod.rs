use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;

/// Timestamp layout of the `time_local` field, e.g. `09/Nov/2024:10:00:00 +0000`.
pub const TIME_LOCAL_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Every attribute an [`AccessRecord`] exposes to field filtering.
pub const FIELD_NAMES: [&str; 10] = [
    "remote_addr",
    "remote_user",
    "time_local",
    "method",
    "source",
    "protocol",
    "status",
    "body_bytes_sent",
    "http_referer",
    "http_user_agent",
];

/// Structured representation of one access-log line.
///
/// Only produced for lines that match the whole grammar. All text fields
/// borrow from the line they were parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord<'a> {
    pub remote_addr: &'a str,
    pub remote_user: &'a str,
    pub time_local: &'a str,
    pub method: &'a str,
    pub source: &'a str,
    pub protocol: &'a str,
    pub status: &'a str,
    pub body_bytes_sent: u64,
    pub http_referer: &'a str,
    pub http_user_agent: &'a str,
}

impl<'a> AccessRecord<'a> {
    /// Looks up an attribute by its snake_case name.
    ///
    /// Returns `None` for names that are not record attributes.
    pub fn field(&self, name: &str) -> Option<Cow<'a, str>> {
        let value = match name {
            "remote_addr" => self.remote_addr,
            "remote_user" => self.remote_user,
            "time_local" => self.time_local,
            "method" => self.method,
            "source" => self.source,
            "protocol" => self.protocol,
            "status" => self.status,
            "body_bytes_sent" => return Some(Cow::Owned(self.body_bytes_sent.to_string())),
            "http_referer" => self.http_referer,
            "http_user_agent" => self.http_user_agent,
            _ => return None,
        };
        Some(Cow::Borrowed(value))
    }

    /// Same as [`field`](Self::field) but ignores ASCII case in `name`.
    pub fn field_ignore_case(&self, name: &str) -> Option<Cow<'a, str>> {
        FIELD_NAMES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(name))
            .and_then(|known| self.field(known))
    }

    /// Parses `time_local` into a timezone-aware instant.
    pub fn timestamp(&self) -> Result<DateTime<FixedOffset>> {
        DateTime::parse_from_str(self.time_local, TIME_LOCAL_FORMAT).map_err(|source| {
            Error::Timestamp {
                value: self.time_local.to_string(),
                source,
            }
        })
    }

    /// True for 4xx and 5xx responses.
    pub fn is_error(&self) -> bool {
        self.status.starts_with('4') || self.status.starts_with('5')
    }
}

pub mod combined;

pub use combined::parse_line;
