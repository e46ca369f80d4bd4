use crate::{judgedata::DownloadError, runner::ExecError};

pub type Result<T> = std::result::Result<T, VerifyError>;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Compile error: {0}")]
    CompileFailure(#[source] ExecError),

    #[error("Run failed: {command}: {reason}")]
    RunFailure { command: String, reason: String },

    #[error(transparent)]
    DownloadFailure(#[from] DownloadError),

    #[error("Failed to pre_command: {0}")]
    PreconditionFailure(#[source] ExecError),

    #[error("Not verified yet.")]
    Unverified,
}

impl VerifyError {
    pub(crate) fn run_failure(command: &str, reason: impl ToString) -> Self {
        Self::RunFailure {
            command: command.to_owned(),
            reason: reason.to_string(),
        }
    }
}
