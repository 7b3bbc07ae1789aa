use super::AccessRecord;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // IP - USER [TIME] "METHOD PATH PROTOCOL" STATUS BYTES "REFERER" "USER-AGENT"
    static ref ACCESS_LOG_REGEX: Regex = Regex::new(
        r#"^(\S+) - (\S*) \[([^\]]+)\] "(\S+) (\S+) (\S+)" ([0-9]{3}) ([0-9]+) "([^"]*)" "([^"]*)""#
    ).unwrap();
}

/// Matches one trimmed line against the combined access-log grammar.
///
/// Returns `None` when any token fails to conform, including a byte count
/// too large for `u64`. Text following the user-agent field is ignored.
pub fn parse_line(line: &str) -> Option<AccessRecord<'_>> {
    let caps = ACCESS_LOG_REGEX.captures(line)?;
    let text = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    let body_bytes_sent = text(8).parse::<u64>().ok()?;

    Some(AccessRecord {
        remote_addr: text(1),
        remote_user: text(2),
        time_local: text(3),
        method: text(4),
        source: text(5),
        protocol: text(6),
        status: text(7),
        body_bytes_sent,
        http_referer: text(9),
        http_user_agent: text(10),
    })
}
