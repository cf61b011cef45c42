//! In-memory activation state and the newest-first action history.
//!
//! Every recorded entry reflects the status the player was switched *to*, so
//! the log reads as an audit trail on its own. The log and the status map are
//! allowed to disagree (imported history never touches the map).

use shared::domain::{ActionLog, ActiveStatusMap, Action, LogEntry, Player, PlayerId};
use tracing::{debug, warn};

use crate::roster::Roster;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActivityLog {
    active: ActiveStatusMap,
    entries: ActionLog,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(active: ActiveStatusMap, entries: ActionLog) -> Self {
        Self { active, entries }
    }

    pub fn active_map(&self) -> &ActiveStatusMap {
        &self.active
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.active.get(&id).copied().unwrap_or(false)
    }

    /// Flips `player` and prepends the matching entry.
    pub fn toggle(&mut self, player: &Player, time: &str) -> LogEntry {
        let now_active = !self.is_active(player.id);
        self.active.insert(player.id, now_active);

        let entry = LogEntry::recorded(player, Action::from_status(now_active), time);
        self.entries.insert(0, entry.clone());
        debug!(player_id = %player.id, action = %Action::from_status(now_active), "toggled player");
        entry
    }

    /// Switches every active player off. Entries follow ascending player id
    /// and are prepended as one block ahead of the existing history.
    pub fn deactivate_all_active(&mut self, roster: &Roster, time: &str) -> Vec<LogEntry> {
        let mut batch = Vec::new();
        for (id, active) in self.active.iter_mut().filter(|(_, active)| **active) {
            *active = false;
            match roster.find(*id) {
                Some(player) => batch.push(LogEntry::recorded(player, Action::Off, time)),
                None => warn!(player_id = %id, "deactivated player missing from roster"),
            }
        }

        self.entries.splice(0..0, batch.iter().cloned());
        batch
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.entries.clear();
    }

    /// Imported history goes after everything already recorded.
    pub fn append_imported(&mut self, entries: impl IntoIterator<Item = LogEntry>) {
        self.entries.extend(entries);
    }

    /// Drops status for ids the roster does not know. Returns how many went.
    pub fn retain_known(&mut self, roster: &Roster) -> usize {
        let before = self.active.len();
        self.active.retain(|id, _| {
            let known = roster.contains(*id);
            if !known {
                warn!(player_id = %id, "dropping stored status for unknown player");
            }
            known
        });
        before - self.active.len()
    }
}

#[cfg(test)]
#[path = "tests/activity_tests.rs"]
mod tests;
