/// Classification of a single request, as handed over by the protocol layer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    /// Outcome was never reported (e.g. a historical row without a success column).
    /// Counts as a request, but neither as a success nor as a failure.
    #[default]
    Unknown,
}

impl Outcome {
    #[must_use]
    pub fn from_flag(ok: bool) -> Self {
        if ok { Self::Success } else { Self::Failure }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Self::Success => Some(true),
            Self::Failure => Some(false),
            Self::Unknown => None,
        }
    }
}

/// One recorded request outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub response_time_ms: u64,
    pub outcome: Outcome,
    /// Request start, epoch milliseconds.
    pub timestamp_ms: i64,
    pub status_code: Option<u16>,
}

impl Sample {
    #[must_use]
    pub fn new(response_time_ms: u64, outcome: Outcome, timestamp_ms: i64) -> Self {
        Self {
            response_time_ms,
            outcome,
            timestamp_ms,
            status_code: None,
        }
    }

    #[must_use]
    pub fn success(response_time_ms: u64, timestamp_ms: i64) -> Self {
        Self::new(response_time_ms, Outcome::Success, timestamp_ms)
    }

    #[must_use]
    pub fn failure(response_time_ms: u64, timestamp_ms: i64) -> Self {
        Self::new(response_time_ms, Outcome::Failure, timestamp_ms)
    }

    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Epoch milliseconds at which the request completed.
    #[must_use]
    pub fn completed_at_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.response_time_ms).unwrap_or(i64::MAX);
        self.timestamp_ms.saturating_add(elapsed)
    }
}
