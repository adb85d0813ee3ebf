//! Persisted, header-described, comma-delimited result log: one row per request.
//!
//! ```text
//! timeStamp,elapsed,label,responseCode,responseMessage,threadName,dataType,success,failureMessage,bytes,sentBytes
//! 1700000000000,182,GET /cart,200,OK,checkout 1-1,text,true,,5120,311
//! ```
//!
//! Only `timeStamp`, `elapsed` and `success` carry statistical meaning; the
//! remaining columns are kept on [`LogRecord`] for reporting. Each line is one
//! row; see [`fields`] for how quotes are read.

mod fields;
mod reader;
mod writer;

pub use reader::{ResultLog, parse_log};
pub use writer::ResultLogWriter;

use loadstat_metrics::Sample;

/// Label used for rows that carry no `label` value.
pub const UNLABELED: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Column {
    TimeStamp,
    Elapsed,
    Label,
    ResponseCode,
    ResponseMessage,
    ThreadName,
    DataType,
    Success,
    FailureMessage,
    Bytes,
    SentBytes,
}

impl Column {
    /// Written header order.
    pub const ALL: [Column; 11] = [
        Column::TimeStamp,
        Column::Elapsed,
        Column::Label,
        Column::ResponseCode,
        Column::ResponseMessage,
        Column::ThreadName,
        Column::DataType,
        Column::Success,
        Column::FailureMessage,
        Column::Bytes,
        Column::SentBytes,
    ];
}

/// One historical request: the statistical sample plus the row's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogRecord {
    pub sample: Sample,
    pub label: Option<String>,
    pub response_message: Option<String>,
    pub thread_name: Option<String>,
    pub data_type: Option<String>,
    pub failure_message: Option<String>,
    pub bytes: Option<u64>,
    pub sent_bytes: Option<u64>,
}

impl LogRecord {
    #[must_use]
    pub fn from_sample(sample: Sample) -> Self {
        Self {
            sample,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label to group by; [`UNLABELED`] when the row had none.
    #[must_use]
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or(UNLABELED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn column_names_match_case_insensitively() {
        assert_eq!(Column::from_str("timeStamp"), Ok(Column::TimeStamp));
        assert_eq!(Column::from_str("timestamp"), Ok(Column::TimeStamp));
        assert_eq!(Column::from_str("SENTBYTES"), Ok(Column::SentBytes));
        assert!(Column::from_str("Latency").is_err());
    }

    #[test]
    fn header_uses_camel_case() {
        let header: Vec<String> = Column::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            header.join(","),
            "timeStamp,elapsed,label,responseCode,responseMessage,threadName,dataType,success,failureMessage,bytes,sentBytes"
        );
    }
}
