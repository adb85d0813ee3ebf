use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use loadstat_metrics::{Outcome, Sample};

use super::fields::split_fields;
use super::{Column, LogRecord};
use crate::{Error, Result};

#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("row has no `{0}` field")]
    MissingField(Column),

    #[error("`{0}` is not an integer: `{1}`")]
    InvalidInteger(Column, String),

    #[error("negative `elapsed`: {0}")]
    NegativeElapsed(i64),

    #[error("`success` must be `true` or `false`, got `{0}`")]
    InvalidSuccess(String),
}

/// Position of each known column in the header; `None` when absent.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnIndex([Option<usize>; Column::ALL.len()]);

impl ColumnIndex {
    fn from_header(header: &[String]) -> Self {
        let mut idx = [None; Column::ALL.len()];
        for (pos, name) in header.iter().enumerate() {
            let name = name.trim_start_matches('\u{feff}').trim();
            let Ok(col) = Column::from_str(name) else {
                continue;
            };
            let slot = &mut idx[col as usize];
            if slot.is_none() {
                *slot = Some(pos);
            }
        }
        Self(idx)
    }

    fn get(&self, col: Column) -> Option<usize> {
        self.0[col as usize]
    }
}

struct Row<'a> {
    cols: &'a ColumnIndex,
    fields: &'a [String],
}

impl<'a> Row<'a> {
    /// Field of a column the row must carry if the header names it.
    fn required(&self, col: Column) -> std::result::Result<Option<&'a str>, RowError> {
        match self.cols.get(col) {
            None => Ok(None),
            Some(i) => self
                .fields
                .get(i)
                .map(|v| Some(v.trim()))
                .ok_or(RowError::MissingField(col)),
        }
    }

    fn optional(&self, col: Column) -> Option<&'a str> {
        self.cols
            .get(col)
            .and_then(|i| self.fields.get(i))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn optional_string(&self, col: Column) -> Option<String> {
        self.optional(col).map(ToOwned::to_owned)
    }

    fn optional_u64(&self, col: Column) -> Option<u64> {
        self.optional(col).and_then(|v| v.parse().ok())
    }

    fn integer(&self, col: Column) -> std::result::Result<Option<i64>, RowError> {
        self.required(col)?
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| RowError::InvalidInteger(col, v.to_string()))
            })
            .transpose()
    }

    fn outcome(&self) -> std::result::Result<Outcome, RowError> {
        let Some(v) = self.required(Column::Success)? else {
            return Ok(Outcome::Unknown);
        };
        if v.is_empty() {
            Ok(Outcome::Unknown)
        } else if v.eq_ignore_ascii_case("true") {
            Ok(Outcome::Success)
        } else if v.eq_ignore_ascii_case("false") {
            Ok(Outcome::Failure)
        } else {
            Err(RowError::InvalidSuccess(v.to_string()))
        }
    }

    fn parse(&self) -> std::result::Result<LogRecord, RowError> {
        let timestamp_ms = self.integer(Column::TimeStamp)?.unwrap_or(0);
        let elapsed = self.integer(Column::Elapsed)?.unwrap_or(0);
        let response_time_ms =
            u64::try_from(elapsed).map_err(|_| RowError::NegativeElapsed(elapsed))?;
        let outcome = self.outcome()?;

        Ok(LogRecord {
            sample: Sample {
                response_time_ms,
                outcome,
                timestamp_ms,
                status_code: self
                    .optional(Column::ResponseCode)
                    .and_then(|v| v.parse().ok()),
            },
            label: self.optional_string(Column::Label),
            response_message: self.optional_string(Column::ResponseMessage),
            thread_name: self.optional_string(Column::ThreadName),
            data_type: self.optional_string(Column::DataType),
            failure_message: self.optional_string(Column::FailureMessage),
            bytes: self.optional_u64(Column::Bytes),
            sent_bytes: self.optional_u64(Column::SentBytes),
        })
    }
}

/// Non-blank lines of the input, line endings stripped. Invalid UTF-8 is
/// replaced, not rejected.
struct Lines<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: io::Read> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            buf: Vec::new(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.clear();
            if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let text = String::from_utf8_lossy(&self.buf);
            let line = text.trim_end_matches(['\n', '\r']);
            if !line.trim().is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }
}

/// Records of a parsed result log, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultLog {
    pub records: Vec<LogRecord>,
    /// Malformed rows that were dropped.
    pub skipped_rows: usize,
}

impl ResultLog {
    /// Reads and parses the log at `path`.
    ///
    /// A missing or unreadable file is an error; malformed rows are skipped.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::OpenLog {
            path: path.to_path_buf(),
            source,
        })?;

        let log = Self::from_reader(file)?;
        if log.skipped_rows > 0 {
            tracing::warn!(
                path = %path.display(),
                skipped = log.skipped_rows,
                "skipped malformed result log rows"
            );
        }
        tracing::debug!(path = %path.display(), records = log.records.len(), "read result log");
        Ok(log)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut lines = Lines::new(reader);
        let mut log = ResultLog::default();

        let Some(header) = lines.next_line()? else {
            return Ok(log);
        };
        let cols = ColumnIndex::from_header(&split_fields(&header));

        while let Some(line) = lines.next_line()? {
            let fields = split_fields(&line);
            match (Row {
                cols: &cols,
                fields: &fields,
            })
            .parse()
            {
                Ok(rec) => log.records.push(rec),
                Err(err) => {
                    log.skipped_rows += 1;
                    tracing::debug!(
                        line = lines.line_no,
                        %err,
                        "skipping malformed result log row"
                    );
                }
            }
        }

        Ok(log)
    }

    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.records.iter().map(|r| r.sample).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads the log at `path` and returns its samples in file order.
pub fn parse_log(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    ResultLog::read(path).map(|log| log.samples())
}
