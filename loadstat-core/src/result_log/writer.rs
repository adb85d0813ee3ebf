use std::fs::File;
use std::io;
use std::path::Path;

use loadstat_metrics::Sample;

use super::{Column, LogRecord};
use crate::{Error, Result};

/// Writes records in the format [`ResultLog`](super::ResultLog) reads back.
#[derive(Debug)]
pub struct ResultLogWriter<W: io::Write> {
    inner: csv::Writer<W>,
}

impl ResultLogWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::CreateLog {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file)
    }
}

impl<W: io::Write> ResultLogWriter<W> {
    /// Wraps `writer` and emits the header row.
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(Column::ALL.iter().map(ToString::to_string))?;
        Ok(Self { inner })
    }

    pub fn write_record(&mut self, rec: &LogRecord) -> Result<()> {
        let s = &rec.sample;
        let text = |v: &Option<String>| v.as_deref().map(single_line).unwrap_or_default();
        let number = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_default();

        self.inner.write_record([
            s.timestamp_ms.to_string(),
            s.response_time_ms.to_string(),
            text(&rec.label),
            s.status_code.map(|c| c.to_string()).unwrap_or_default(),
            text(&rec.response_message),
            text(&rec.thread_name),
            text(&rec.data_type),
            s.outcome
                .as_flag()
                .map(|ok| ok.to_string())
                .unwrap_or_default(),
            text(&rec.failure_message),
            number(rec.bytes),
            number(rec.sent_bytes),
        ])?;
        Ok(())
    }

    pub fn write_sample(&mut self, sample: &Sample) -> Result<()> {
        self.write_record(&LogRecord::from_sample(*sample))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|err| Error::Io(err.into_error()))
    }
}

/// Rows are line-delimited, so line breaks inside a value become spaces.
fn single_line(v: &str) -> String {
    v.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_log::ResultLog;
    use loadstat_metrics::Outcome;

    #[test]
    fn writes_header_and_quotes_delimiters() {
        let mut w = ResultLogWriter::new(Vec::new()).unwrap_or_else(|e| panic!("{e}"));
        let rec = LogRecord {
            failure_message: Some("expected 200, got 503".to_string()),
            bytes: Some(10),
            ..LogRecord::from_sample(Sample::failure(75, 1_000).with_status(503))
                .with_label("search")
        };
        w.write_record(&rec).unwrap_or_else(|e| panic!("{e}"));
        w.write_sample(&Sample::new(5, Outcome::Unknown, 1_001))
            .unwrap_or_else(|e| panic!("{e}"));

        let bytes = w.into_inner().unwrap_or_else(|e| panic!("{e}"));
        let text = String::from_utf8(bytes).unwrap_or_else(|e| panic!("{e}"));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timeStamp,elapsed,label,"));
        assert_eq!(
            lines[1],
            "1000,75,search,503,,,,false,\"expected 200, got 503\",10,"
        );
        assert_eq!(lines[2], "1001,5,,,,,,,,,");

        let log = ResultLog::from_reader(text.as_bytes()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            log.records,
            vec![
                rec,
                LogRecord::from_sample(Sample::new(5, Outcome::Unknown, 1_001))
            ]
        );
    }

    #[test]
    fn quotes_survive_and_line_breaks_are_flattened() {
        let mut w = ResultLogWriter::new(Vec::new()).unwrap_or_else(|e| panic!("{e}"));
        let rec = LogRecord {
            response_message: Some("said \"no\", twice".to_string()),
            failure_message: Some("line one\r\nline two".to_string()),
            ..LogRecord::from_sample(Sample::failure(9, 2_000)).with_label("a\"b")
        };
        w.write_record(&rec).unwrap_or_else(|e| panic!("{e}"));

        let bytes = w.into_inner().unwrap_or_else(|e| panic!("{e}"));
        let log = ResultLog::from_reader(bytes.as_slice()).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(log.skipped_rows, 0);
        assert_eq!(log.records.len(), 1);
        let got = &log.records[0];
        assert_eq!(got.label.as_deref(), Some("a\"b"));
        assert_eq!(got.response_message.as_deref(), Some("said \"no\", twice"));
        assert_eq!(got.failure_message.as_deref(), Some("line one  line two"));
        assert_eq!(got.sample, rec.sample);
    }
}
