//! Session controller: owns all tracker state and writes each slice back to
//! the store right after it changes. A slice whose save fails stays marked
//! and is written again by the next save, whichever operation triggers it.

use std::path::PathBuf;

use shared::{
    domain::{ActiveStatusMap, ImpactLogEntry, LogEntry, PlayerId},
    error::TrackerError,
};
use storage::{keys, load_list, load_slice, save_slice, StateStore};
use tracing::{error, info, warn};

use crate::{
    activity::ActivityLog,
    clock::{format_timestamp, Clock, SystemClock},
    csv_io::{export_action_log, CsvImportError, ExportFile},
    import::{spawn_import, ImportKind, ParsedImport, PendingImport},
    roster::{GridCell, Roster},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Applied { kind: ImportKind, rows: usize },
    /// The file could not be read or parsed; nothing changed.
    Rejected { kind: ImportKind },
}

/// Slices changed in memory but not yet written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Unsaved {
    active: bool,
    team: bool,
    log: bool,
    legacy_log: bool,
}

pub struct TrackerSession<S: StateStore> {
    roster: Roster,
    store: S,
    clock: Box<dyn Clock>,
    activity: ActivityLog,
    selected_team: String,
    impact_log: Vec<ImpactLogEntry>,
    unsaved: Unsaved,
}

impl<S: StateStore> TrackerSession<S> {
    pub async fn hydrate(roster: Roster, store: S) -> Result<Self, TrackerError> {
        Self::hydrate_with_clock(roster, store, SystemClock).await
    }

    pub async fn hydrate_with_clock(
        roster: Roster,
        store: S,
        clock: impl Clock + 'static,
    ) -> Result<Self, TrackerError> {
        let active: ActiveStatusMap = load_slice(&store, keys::ACTIVE_PLAYERS).await;
        let entries: Vec<LogEntry> = load_list(&store, keys::ACTION_LOG).await;
        let stored_team: String = load_slice(&store, keys::SELECTED_TEAM).await;

        let mut activity = ActivityLog::from_parts(active, entries);
        let pruned = activity.retain_known(&roster);

        let mut session = Self {
            roster,
            store,
            clock: Box::new(clock),
            activity,
            selected_team: stored_team,
            impact_log: Vec::new(),
            unsaved: Unsaved::default(),
        };

        session.unsaved.active = pruned > 0;
        if !session.roster.has_team(&session.selected_team) {
            if let Some(team) = session.roster.default_team() {
                if !session.selected_team.is_empty() {
                    warn!(team = %session.selected_team, "stored team is not in roster");
                }
                session.selected_team = team.to_string();
                session.unsaved.team = true;
            }
        }
        session.save_unsaved().await?;

        info!(
            players = session.roster.players().len(),
            log_entries = session.activity.entries().len(),
            team = %session.selected_team,
            "tracker session hydrated"
        );
        Ok(session)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn active_map(&self) -> &ActiveStatusMap {
        self.activity.active_map()
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.activity.is_active(id)
    }

    pub fn action_log(&self) -> &[LogEntry] {
        self.activity.entries()
    }

    pub fn selected_team(&self) -> &str {
        &self.selected_team
    }

    pub fn impact_log(&self) -> &[ImpactLogEntry] {
        &self.impact_log
    }

    pub fn team_grid(&self, per_row: usize) -> Vec<Vec<GridCell<'_>>> {
        self.roster
            .team_grid(&self.selected_team, self.activity.active_map(), per_row)
    }

    pub async fn select_team(&mut self, team: &str) -> Result<(), TrackerError> {
        if !self.roster.has_team(team) {
            warn!(team, "ignoring selection of unknown team");
            return Err(TrackerError::UnknownTeam(team.to_string()));
        }
        self.selected_team = team.to_string();
        self.unsaved.team = true;
        self.save_unsaved().await
    }

    /// `None` when `id` is not on the roster; nothing changes in that case.
    pub async fn toggle(&mut self, id: PlayerId) -> Result<Option<LogEntry>, TrackerError> {
        let Some(player) = self.roster.find(id) else {
            warn!(player_id = %id, "toggle requested for unknown player");
            return Ok(None);
        };

        let time = format_timestamp(&self.clock.now());
        let entry = self.activity.toggle(player, &time);
        self.unsaved.active = true;
        self.unsaved.log = true;
        self.save_unsaved().await?;
        Ok(Some(entry))
    }

    pub async fn deactivate_all_active(&mut self) -> Result<Vec<LogEntry>, TrackerError> {
        if !self.activity.active_map().values().any(|active| *active) {
            return Ok(Vec::new());
        }

        let time = format_timestamp(&self.clock.now());
        let batch = self.activity.deactivate_all_active(&self.roster, &time);
        self.unsaved.active = true;
        self.unsaved.log = true;
        self.save_unsaved().await?;
        info!(deactivated = batch.len(), "deactivated all active players");
        Ok(batch)
    }

    /// Empties the log and the status map. The selected team stays.
    pub async fn clear(&mut self) -> Result<(), TrackerError> {
        self.activity.clear();
        self.unsaved.active = true;
        self.unsaved.log = true;
        self.unsaved.legacy_log = true;
        self.save_unsaved().await?;
        info!("cleared action log");
        Ok(())
    }

    /// `None` when the log is empty.
    pub fn export_csv(&self) -> Option<ExportFile> {
        export_action_log(self.activity.entries(), &self.clock.now())
    }

    pub fn begin_import(&self, path: impl Into<PathBuf>, kind: ImportKind) -> PendingImport {
        spawn_import(path.into(), kind)
    }

    /// Waits for `pending` and applies its rows. Read and parse failures are
    /// logged once and leave every collection untouched.
    pub async fn finish_import(
        &mut self,
        pending: PendingImport,
    ) -> Result<ImportOutcome, TrackerError> {
        let (kind, path, handle) = pending.into_parts();
        let parsed = handle
            .await
            .map_err(|err| TrackerError::ImportTask(err.to_string()))?;
        self.apply_import(kind, &path, parsed).await
    }

    async fn apply_import(
        &mut self,
        kind: ImportKind,
        path: &std::path::Path,
        parsed: Result<ParsedImport, CsvImportError>,
    ) -> Result<ImportOutcome, TrackerError> {
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(err) => {
                error!(path = %path.display(), %kind, error = %err, "CSV parse error");
                return Ok(ImportOutcome::Rejected { kind });
            }
        };

        let rows = parsed.len();
        match parsed {
            ParsedImport::ActionLog(entries) => {
                self.activity.append_imported(entries);
                self.unsaved.log = true;
                self.save_unsaved().await?;
            }
            ParsedImport::ImpactLog(entries) => {
                self.impact_log.extend(entries);
            }
        }
        info!(path = %path.display(), %kind, rows, "imported csv");
        Ok(ImportOutcome::Applied { kind, rows })
    }

    /// Writes every marked slice from current memory, clearing each mark as
    /// its write lands. Stops at the first failure; the rest stay marked.
    async fn save_unsaved(&mut self) -> Result<(), TrackerError> {
        if self.unsaved.active {
            save_slice(&self.store, keys::ACTIVE_PLAYERS, self.activity.active_map())
                .await
                .map_err(|err| TrackerError::persistence(keys::ACTIVE_PLAYERS, err))?;
            self.unsaved.active = false;
        }
        if self.unsaved.team {
            save_slice(&self.store, keys::SELECTED_TEAM, self.selected_team.as_str())
                .await
                .map_err(|err| TrackerError::persistence(keys::SELECTED_TEAM, err))?;
            self.unsaved.team = false;
        }
        if self.unsaved.log {
            save_slice(&self.store, keys::ACTION_LOG, self.activity.entries())
                .await
                .map_err(|err| TrackerError::persistence(keys::ACTION_LOG, err))?;
            self.unsaved.log = false;
        }
        if self.unsaved.legacy_log {
            self.store
                .remove(keys::LEGACY_ACTION_LOG)
                .await
                .map_err(|err| TrackerError::persistence(keys::LEGACY_ACTION_LOG, err))?;
            self.unsaved.legacy_log = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
