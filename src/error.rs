use std::fmt;

/// Failure taxonomy for a reconciliation run. Transport and auth failures
/// originate with the session collaborator; decode failures are our own.
/// All three abort the run before anything is merged. A join-miss is not an
/// error and never appears here.
#[derive(Debug)]
pub enum RunError {
    Transport(String),
    Decode(String),
    AuthRequired,
}

impl RunError {
    /// Stable machine-readable code used at the IPC boundary.
    pub fn code(&self) -> &'static str {
        match self {
            RunError::Transport(_) => "transport",
            RunError::Decode(_) => "bad_payload",
            RunError::AuthRequired => "auth_required",
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Transport(msg) => write!(f, "network failure: {msg}"),
            RunError::Decode(msg) => write!(f, "malformed payload: {msg}"),
            RunError::AuthRequired => write!(f, "authentication required"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<serde_json::Error> for RunError {
    fn from(value: serde_json::Error) -> Self {
        RunError::Decode(value.to_string())
    }
}

pub type RunResult<T> = Result<T, RunError>;
