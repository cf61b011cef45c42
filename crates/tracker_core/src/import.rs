//! Background file imports: read and parse off the caller's path, apply
//! whenever the caller picks the result up.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use shared::domain::{ImpactLogEntry, LogEntry};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::csv_io::{parse_action_log, parse_impact_log, CsvImportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    ActionLog,
    ImpactLog,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ActionLog => "action_log",
            Self::ImpactLog => "impact_log",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedImport {
    ActionLog(Vec<LogEntry>),
    ImpactLog(Vec<ImpactLogEntry>),
}

impl ParsedImport {
    pub fn len(&self) -> usize {
        match self {
            Self::ActionLog(rows) => rows.len(),
            Self::ImpactLog(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An import in flight. There is no timeout and no cancellation.
pub struct PendingImport {
    kind: ImportKind,
    path: PathBuf,
    handle: JoinHandle<Result<ParsedImport, CsvImportError>>,
}

impl PendingImport {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        ImportKind,
        PathBuf,
        JoinHandle<Result<ParsedImport, CsvImportError>>,
    ) {
        (self.kind, self.path, self.handle)
    }
}

/// Must be called from within a tokio runtime.
pub fn spawn_import(path: PathBuf, kind: ImportKind) -> PendingImport {
    let task_path = path.clone();
    let handle = tokio::spawn(async move { read_and_parse(&task_path, kind).await });
    PendingImport { kind, path, handle }
}

pub async fn read_and_parse(path: &Path, kind: ImportKind) -> Result<ParsedImport, CsvImportError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        warn!(path = %path.display(), %kind, "import file does not have a .csv extension");
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CsvImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    match kind {
        ImportKind::ActionLog => parse_action_log(&text).map(ParsedImport::ActionLog),
        ImportKind::ImpactLog => parse_impact_log(&text).map(ParsedImport::ImpactLog),
    }
}
