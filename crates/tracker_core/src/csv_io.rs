//! CSV export of the action log and header-driven import of the two
//! supported upload schemas.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Local};
use csv::{ReaderBuilder, StringRecord};
use shared::domain::{EntryId, ImpactLogEntry, JerseyNumber, LogEntry};
use thiserror::Error;

pub const EXPORT_HEADERS: [&str; 4] = ["jersey_number", "subject", "action", "time"];
pub const EXPORT_MIME_TYPE: &str = "text/csv;charset=utf-8;";

const COL_JERSEY_NUMBER: &str = "jersey_number";
const COL_SUBJECT: &str = "subject";
const COL_ACTION: &str = "action";
const COL_TIME: &str = "time";
const COL_PLAYER_ID: &str = "playerId";

const COL_IMPACT_JERSEY: &str = "Jersey #";
const COL_IMPACT_PLA: &str = "Peak Linear Acceleration (PLA, g)";
const COL_IMPACT_DATE: &str = "Date";
const COL_IMPACT_LOCAL_TIME: &str = "Local Time";

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed csv: {0}")]
    Malformed(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

impl ExportFile {
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export dir '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)
            .with_context(|| format!("failed to write export '{}'", path.display()))?;
        Ok(path)
    }
}

/// Renders the log newest-first. Every field is wrapped in double quotes as
/// is; embedded quotes are not escaped. `None` for an empty log.
pub fn serialize_action_log(log: &[LogEntry]) -> Option<String> {
    if log.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(log.len() + 1);
    lines.push(quote_row(EXPORT_HEADERS));
    for entry in log {
        let number = entry
            .number
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        lines.push(quote_row([
            number.as_str(),
            entry.subject.as_deref().unwrap_or_default(),
            entry.action.as_deref().unwrap_or_default(),
            entry.time.as_deref().unwrap_or_default(),
        ]));
    }
    Some(lines.join("\n"))
}

pub fn export_action_log(log: &[LogEntry], now: &DateTime<Local>) -> Option<ExportFile> {
    let contents = serialize_action_log(log)?;
    Some(ExportFile {
        file_name: export_file_name(now),
        mime_type: EXPORT_MIME_TYPE,
        contents,
    })
}

pub fn export_file_name(now: &DateTime<Local>) -> String {
    format!("player_log_{}.csv", now.timestamp_millis())
}

fn quote_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses an exported (or compatible) action log. Rows missing a column keep
/// that field empty rather than failing the file.
pub fn parse_action_log(csv_text: &str) -> Result<Vec<LogEntry>, CsvImportError> {
    map_rows(csv_text, |row| {
        let number = row.field(COL_JERSEY_NUMBER);
        let time = row.field(COL_TIME);
        let player_id = row
            .field(COL_PLAYER_ID)
            .filter(|id| !id.is_empty())
            .map(EntryId::Imported)
            .unwrap_or_else(|| EntryId::fallback(number.as_deref(), time.as_deref()));

        LogEntry {
            player_id,
            number: number.map(JerseyNumber::Text),
            subject: row.field(COL_SUBJECT),
            action: row.field(COL_ACTION),
            time,
        }
    })
}

pub fn parse_impact_log(csv_text: &str) -> Result<Vec<ImpactLogEntry>, CsvImportError> {
    map_rows(csv_text, |row| {
        let number = row.field(COL_IMPACT_JERSEY);
        let date = row.field(COL_IMPACT_DATE);
        let local_time = row.field(COL_IMPACT_LOCAL_TIME);
        let player_id = row
            .field(COL_PLAYER_ID)
            .filter(|id| !id.is_empty())
            .map(EntryId::Imported)
            .unwrap_or_else(|| EntryId::fallback(number.as_deref(), local_time.as_deref()));
        let time = match (date, local_time) {
            (None, None) => None,
            (date, local_time) => Some(format!(
                "{} {}",
                date.unwrap_or_default(),
                local_time.unwrap_or_default()
            )),
        };

        ImpactLogEntry {
            number,
            impact: row.field(COL_IMPACT_PLA),
            time,
            player_id,
        }
    })
}

struct CsvRow<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl CsvRow<'_> {
    fn field(&self, name: &str) -> Option<String> {
        let index = self.headers.iter().position(|header| header == name)?;
        self.record.get(index).map(str::to_string)
    }
}

fn map_rows<T>(
    csv_text: &str,
    mut build: impl FnMut(&CsvRow<'_>) -> T,
) -> Result<Vec<T>, CsvImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(build(&CsvRow {
            headers: &headers,
            record: &record,
        }));
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "tests/csv_io_tests.rs"]
mod tests;
