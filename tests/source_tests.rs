use logsaw::analyzer::LogAnalyzer;
use logsaw::source::LogSource;
use std::fs;
use tempfile::TempDir;

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("file1.log"), "line1\nline2\nline3").unwrap();
    fs::write(dir.path().join("file2.txt"), "").unwrap();
    dir
}

fn pattern(dir: &TempDir, glob: &str) -> String {
    dir.path().join(glob).to_str().unwrap().to_string()
}

#[test]
fn test_local_iterator_reading() {
    let dir = setup();
    let source = LogSource::open(&pattern(&dir, "*.log")).unwrap();

    let lines: Vec<String> = source.lines().unwrap().map(Result::unwrap).collect();
    assert_eq!(lines, vec!["line1", "line2", "line3"]);
    assert_eq!(source.files().len(), 1);
    assert!(source.files()[0].ends_with("file1.log"));
}

#[test]
fn test_local_iterator_no_files() {
    let dir = setup();
    let source = LogSource::open(&pattern(&dir, "*.md")).unwrap();

    assert!(source.files().is_empty());
    assert_eq!(source.lines().unwrap().count(), 0);
}

#[test]
fn test_blank_lines_skipped_and_trimmed() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.log"),
        "\n  first  \r\n\n\t\nsecond\n   \n",
    )
    .unwrap();

    let source = LogSource::open(&pattern(&dir, "*.log")).unwrap();
    let lines: Vec<String> = source.lines().unwrap().map(Result::unwrap).collect();
    assert_eq!(lines, vec!["first", "second"]);
}

#[test]
fn test_multiple_files_streamed_in_order() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("access.log.1"), "b1\nb2\n").unwrap();
    fs::write(dir.path().join("access.log"), "a1\n").unwrap();
    fs::write(dir.path().join("error.log"), "nope\n").unwrap();

    let source = LogSource::open(&pattern(&dir, "access.log*")).unwrap();
    let lines: Vec<String> = source.lines().unwrap().map(Result::unwrap).collect();

    assert_eq!(source.files().len(), 2);
    assert_eq!(lines, vec!["a1", "b1", "b2"]);
}

#[test]
fn test_directories_are_not_sources() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested.log")).unwrap();
    fs::write(dir.path().join("real.log"), "x\n").unwrap();

    let source = LogSource::open(&pattern(&dir, "*.log")).unwrap();
    assert_eq!(source.files().len(), 1);
}

#[test]
fn test_lines_restart_by_calling_again() {
    let dir = setup();
    let source = LogSource::open(&pattern(&dir, "*.log")).unwrap();

    assert_eq!(source.lines().unwrap().count(), 3);
    assert_eq!(source.lines().unwrap().count(), 3);
}

#[test]
fn test_invalid_utf8_is_decoded_lossily() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.log"), b"ok\nbad \xff byte\n").unwrap();

    let source = LogSource::open(&pattern(&dir, "*.log")).unwrap();
    let lines: Vec<String> = source.lines().unwrap().map(Result::unwrap).collect();
    assert_eq!(lines, vec!["ok".to_string(), "bad \u{fffd} byte".to_string()]);
}

#[test]
fn test_empty_glob_is_an_empty_run() {
    let dir = TempDir::new().unwrap();
    let source = LogSource::open(&pattern(&dir, "*.log")).unwrap();
    let result = LogAnalyzer::default().analyze(&source).unwrap();

    assert_eq!(result.total_requests, 0);
    assert!(result.resources.is_empty());
    assert!(result.status_codes.is_empty());
    assert!(result.methods.is_empty());
    assert!(result.remote_addrs.is_empty());
    assert!(result.response_sizes.is_empty());
    assert!(result.error_resources.is_empty());
    assert!(result.sources.is_empty());
}

#[test]
fn test_analyze_records_sources() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("access.log"),
        concat!(
            r#"127.0.0.1 - - [09/Nov/2024:09:00:00 +0000] "GET /index.html HTTP/1.1" 200 1234 "-" "Mozilla/5.0""#,
            "\n",
            r#"127.0.0.3 - - [09/Nov/2024:09:40:00 +0000] "GET /about.html HTTP/1.1" 404 2345 "-" "Mozilla/5.0""#,
            "\n"
        ),
    )
    .unwrap();

    let source = LogSource::open(&pattern(&dir, "*.log")).unwrap();
    let result = LogAnalyzer::default().analyze(&source).unwrap();

    assert_eq!(result.total_requests, 2);
    assert_eq!(result.sources, source.files());
}
