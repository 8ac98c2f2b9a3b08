/// Errors surfaced by the harness itself, as opposed to the candidates it runs.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("nothing to rank: no candidate produced an average time")]
    NothingToRank,

    #[error("unknown predicate family: {0}")]
    UnknownFamily(String),
}

/// Failure raised by a candidate callable during a timed run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CandidateError {
    message: String,
}

impl CandidateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
