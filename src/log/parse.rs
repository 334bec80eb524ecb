use crate::error::{AggregateError, Result};
use crate::log::row::ResultRow;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Layout conventions of the two log producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// LibSciBench output from the graph database benchmarks:
    /// `#` comment lines, then a column-header line, then whitespace-separated
    /// numeric fields.
    ///
    /// Example:
    /// # Sysname : Linux
    /// id  root  time
    /// 0   17    12345.6
    Gda,
    /// Graph500 `bfs_times.txt`: tab-separated, no header.
    Reference,
}

/// Lazy row sequence over a single result file.
///
/// The file handle lives inside the iterator and is released when it is
/// dropped, whether the scan finished or stopped on an error. After the first
/// error the iterator is exhausted.
pub struct Rows {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    style: LogStyle,
    lineno: usize,
    header_pending: bool,
    failed: bool,
}

/// Open `path` and return its data rows.
///
/// Comment lines (first non-whitespace character `#`) and blank lines are
/// skipped. For [`LogStyle::Gda`] the first remaining line is the column
/// header and is dropped as well.
///
/// Blank lines are not rows: a GDA file yields
/// `lines - comments - blank lines - 1` rows. A blank line never carries a
/// measurement, so dropping it leaves every aggregate unchanged.
pub fn read_rows(path: &Path, style: LogStyle) -> Result<Rows> {
    let file = File::open(path).map_err(|e| AggregateError::io(path, e))?;
    debug!(path = %path.display(), ?style, "opened result file");

    Ok(Rows {
        path: path.to_path_buf(),
        lines: BufReader::new(file).lines(),
        style,
        lineno: 0,
        header_pending: style == LogStyle::Gda,
        failed: false,
    })
}

impl Iterator for Rows {
    type Item = Result<ResultRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(AggregateError::io(&self.path, e)));
                }
            };
            self.lineno += 1;

            let content = line.trim_start();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            if self.header_pending {
                self.header_pending = false;
                continue;
            }

            return Some(Ok(ResultRow::new(self.lineno, tokenize(&line, self.style))));
        }
    }
}

fn tokenize(line: &str, style: LogStyle) -> Vec<String> {
    match style {
        LogStyle::Gda => line.split_whitespace().map(str::to_string).collect(),
        LogStyle::Reference => line
            .split(['\t', '\n'])
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    }
}
