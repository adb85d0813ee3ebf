#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// One or more thresholds failed.
    ThresholdsFailed = 11,

    /// Live replay disagreed with the batch report.
    ParityMismatch = 13,

    /// Invalid CLI/config (bad flags, unreadable or invalid config file, invalid thresholds).
    InvalidInput = 30,

    /// Runtime error (missing or unreadable result log, IO errors).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_quality_gates(thresholds_failed: bool, parity_mismatch: bool) -> Self {
        match (thresholds_failed, parity_mismatch) {
            (_, true) => Self::ParityMismatch,
            (true, false) => Self::ThresholdsFailed,
            (false, false) => Self::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_mismatch_takes_precedence() {
        assert_eq!(ExitCode::from_quality_gates(false, false), ExitCode::Success);
        assert_eq!(ExitCode::from_quality_gates(true, false), ExitCode::ThresholdsFailed);
        assert_eq!(ExitCode::from_quality_gates(true, true), ExitCode::ParityMismatch);
        assert_eq!(ExitCode::ParityMismatch.as_i32(), 13);
    }
}
