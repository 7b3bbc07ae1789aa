use crate::error::{Error, Result};
use glob::glob;
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Where log lines come from: a set of local files or one remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    Local { files: Vec<PathBuf> },
    Remote { url: String },
}

impl LogSource {
    /// Classifies `path` and resolves it.
    ///
    /// Anything starting with `http` is fetched remotely, everything else is
    /// expanded as a filesystem glob. A glob that matches nothing is a valid,
    /// empty source; only a malformed pattern is an error.
    pub fn open(path: &str) -> Result<Self> {
        if Self::is_remote(path) {
            return Ok(LogSource::Remote {
                url: path.to_string(),
            });
        }

        let mut files: Vec<PathBuf> = glob(path)
            .map_err(|source| Error::Glob {
                pattern: path.to_string(),
                source,
            })?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        debug!(pattern = path, matched = files.len(), "expanded log glob");
        Ok(LogSource::Local { files })
    }

    pub fn is_remote(path: &str) -> bool {
        path.starts_with("http")
    }

    /// Identifiers of everything this source reads, for reporting.
    pub fn files(&self) -> Vec<String> {
        match self {
            LogSource::Local { files } => {
                files.iter().map(|p| p.display().to_string()).collect()
            }
            LogSource::Remote { url } => vec![url.clone()],
        }
    }

    /// Starts a single pass over the source.
    ///
    /// For a remote source the request is issued here, so an unreachable
    /// endpoint or a non-success status fails before any line is produced.
    pub fn lines(&self) -> Result<Lines> {
        match self {
            LogSource::Local { files } => Ok(Lines {
                pending: files.clone().into_iter(),
                current: None,
                buf: Vec::new(),
            }),
            LogSource::Remote { url } => {
                warn!(url = url.as_str(), "fetching remote log");
                let client = Client::builder()
                    .timeout(None::<Duration>)
                    .build()
                    .map_err(|e| Error::http(url, e))?;
                let response = client
                    .get(url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| Error::http(url, e))?;

                let reader: Box<dyn BufRead> = Box::new(BufReader::new(response));
                Ok(Lines {
                    pending: Vec::new().into_iter(),
                    current: Some((PathBuf::from(url), reader)),
                    buf: Vec::new(),
                })
            }
        }
    }
}

/// Lazy sequence of trimmed, non-empty lines.
///
/// Consumed exactly once; call [`LogSource::lines`] again to restart.
pub struct Lines {
    pending: std::vec::IntoIter<PathBuf>,
    current: Option<(PathBuf, Box<dyn BufRead>)>,
    buf: Vec<u8>,
}

impl Iterator for Lines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some((label, reader)) = self.current.as_mut() else {
                let path = self.pending.next()?;
                debug!(file = %path.display(), "reading log file");
                match File::open(&path) {
                    Ok(file) => {
                        let reader: Box<dyn BufRead> = Box::new(BufReader::new(file));
                        self.current = Some((path, reader));
                        continue;
                    }
                    Err(e) => return Some(Err(Error::io(path, e))),
                }
            };

            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.current = None,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        return Some(Ok(trimmed.to_string()));
                    }
                }
                Err(e) => {
                    let label = label.clone();
                    self.current = None;
                    return Some(Err(Error::io(label, e)));
                }
            }
        }
    }
}
