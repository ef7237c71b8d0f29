use crate::error::{IndexerError, Result};
use crate::reader::record::{column_index, split_record};
use std::fs::File;
use std::io::{BufRead, BufReader, Split};
use std::path::{Path, PathBuf};

/// Start of a URL field in the export: comma, doubled quote, scheme.
const URL_START_MARKER: &str = ",\"\"http";
/// Closes the URL field.
const URL_END_MARKER: &str = "\"\"";

/// Extracts the URL embedded as `,""<url>""` in a single line.
///
/// Returns `None` when either marker is missing. The returned slice is exactly
/// the text between the markers.
pub fn extract_marked_url(line: &str) -> Option<&str> {
    let start = line.find(URL_START_MARKER)? + 3;
    let rest = &line[start..];
    let end = rest.find(URL_END_MARKER)?;
    let url = &rest[..end];

    url.starts_with("http").then_some(url)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Data lines read, header excluded.
    pub lines_read: usize,
    pub blank_lines: usize,
    pub urls_found: usize,
    /// Non-blank lines that yielded no URL.
    pub lines_skipped: usize,
}

/// Lazily yields URLs from a CSV export, one per matching line.
///
/// The first line is always treated as a header. Lines with no recoverable
/// URL are dropped silently and only show up in [`ReadStats`].
pub struct UrlReader<R> {
    lines: Split<R>,
    url_column: Option<String>,
    column: Option<usize>,
    header_consumed: bool,
    finished: bool,
    stats: ReadStats,
}

impl UrlReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, url_column: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IndexerError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_reader(
            BufReader::new(file),
            url_column.map(str::to_string),
        ))
    }
}

impl<R: BufRead> UrlReader<R> {
    pub fn from_reader(reader: R, url_column: Option<String>) -> Self {
        Self {
            lines: reader.split(b'\n'),
            url_column,
            column: None,
            header_consumed: false,
            finished: false,
            stats: ReadStats::default(),
        }
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    fn next_line(&mut self) -> Option<String> {
        match self.lines.next()? {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading input early");
                self.finished = true;
                None
            }
        }
    }

    fn consume_header(&mut self) {
        self.header_consumed = true;
        let Some(header) = self.next_line() else {
            return;
        };

        if let Some(ref name) = self.url_column {
            self.column = column_index(header.trim(), name);
            match self.column {
                Some(index) => tracing::debug!(column = %name, index, "using URL column"),
                None => tracing::warn!(
                    column = %name,
                    "URL column not found in header; using marker scan"
                ),
            }
        }
    }

    fn extract(&self, line: &str) -> Option<String> {
        if let Some(index) = self.column {
            let fields = split_record(line);
            if let Some(value) = fields.get(index).map(|f| f.trim()) {
                if value.starts_with("http") {
                    return Some(value.to_string());
                }
            }
        }

        extract_marked_url(line).map(str::to_string)
    }
}

impl<R: BufRead> Iterator for UrlReader<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }

        if !self.header_consumed {
            self.consume_header();
        }

        loop {
            let Some(raw) = self.next_line() else {
                self.finished = true;
                return None;
            };
            self.stats.lines_read += 1;

            let line = raw.trim();
            if line.is_empty() {
                self.stats.blank_lines += 1;
                continue;
            }

            match self.extract(line) {
                Some(url) => {
                    self.stats.urls_found += 1;
                    return Some(url);
                }
                None => {
                    self.stats.lines_skipped += 1;
                    tracing::trace!(line = self.stats.lines_read + 1, "no URL on line");
                }
            }
        }
    }
}

/// A re-readable URL source: every call to [`UrlSource::open`] starts from the
/// top of the file.
#[derive(Debug, Clone)]
pub struct UrlSource {
    path: PathBuf,
    url_column: Option<String>,
}

impl UrlSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            url_column: None,
        }
    }

    pub fn with_url_column(mut self, column: Option<String>) -> Self {
        self.url_column = column;
        self
    }

    pub fn open(&self) -> Result<UrlReader<BufReader<File>>> {
        UrlReader::open(&self.path, self.url_column.as_deref())
    }

    /// Total URLs in the file. Reads the whole file in a separate pass.
    pub fn count(&self) -> Result<usize> {
        Ok(self.open()?.count())
    }
}

pub fn count_urls<P: AsRef<Path>>(path: P) -> Result<usize> {
    UrlSource::new(path.as_ref()).count()
}
