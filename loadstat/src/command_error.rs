use crate::exit_codes::ExitCode;

#[derive(Debug)]
pub enum CommandError {
    InvalidInput(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl CommandError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e) | Self::RuntimeError(e) => e,
        }
    }
}

/// Bad user input (thresholds, worker count) exits 30; anything that went wrong
/// reading, writing or replaying a log exits 40.
impl From<loadstat_core::Error> for CommandError {
    fn from(err: loadstat_core::Error) -> Self {
        use loadstat_core::Error;

        match err {
            Error::InvalidThreshold { .. } | Error::InvalidWorkers => {
                Self::InvalidInput(err.into())
            }
            Error::OpenLog { .. }
            | Error::CreateLog { .. }
            | Error::Write(_)
            | Error::Io(_)
            | Error::WorkerPanicked => Self::RuntimeError(err.into()),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.anyhow())
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}
