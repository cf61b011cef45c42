use thiserror::Error;

use crate::domain::PlayerId;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("unknown team '{0}'")]
    UnknownTeam(String),
    #[error("duplicate player id {0} in roster")]
    DuplicatePlayer(PlayerId),
    #[error("failed to persist '{key}': {source}")]
    Persistence {
        key: &'static str,
        source: anyhow::Error,
    },
    #[error("import task did not complete: {0}")]
    ImportTask(String),
}

impl TrackerError {
    pub fn persistence(key: &'static str, source: anyhow::Error) -> Self {
        Self::Persistence { key, source }
    }
}
