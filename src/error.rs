use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid {kind} handle {id}")]
    InvalidHandle { kind: &'static str, id: u32 },

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("failed to load bank {name}: {reason}")]
    BankLoad { name: String, reason: String },

    #[error("bank {0} is already loaded")]
    BankAlreadyLoaded(String),

    #[error("audio output error: {0}")]
    Output(String),

    #[error("event {0} is not loaded")]
    NotLoaded(String),
}

#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("fetch of {path} timed out after {after:?}")]
    TimedOut { path: String, after: Duration },

    #[error("failed to parse manifest {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("manifest {0} lists no tracks")]
    EmptyManifest(String),

    #[error("fetch worker for {0} exited without a result")]
    Disconnected(String),

    #[error("asset not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("engine could not read {path}: {reason}")]
    Bank { path: String, reason: String },

    #[error("event {0} could not be resolved")]
    EventNotFound(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl LoadError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Engine(_))
    }

    pub fn into_engine(self) -> EngineError {
        match self {
            Self::Engine(err) => err,
            Self::EventNotFound(path) => EngineError::EventNotFound(path),
            Self::Bank { path, reason } => EngineError::BankLoad { name: path, reason },
            Self::Fetch(err) => EngineError::NotLoaded(err.to_string()),
        }
    }
}
