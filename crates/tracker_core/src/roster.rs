//! Static, read-only player list and the team views built on it.

use std::{collections::HashSet, fs, path::Path};

use anyhow::Context;
use shared::{
    domain::{ActiveStatusMap, Player, PlayerId},
    error::TrackerError,
};

/// Player buttons shown per grid row.
pub const PLAYER_BUTTONS_PER_ROW: usize = 6;

#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
    teams: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell<'a> {
    pub player: &'a Player,
    pub active: bool,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Result<Self, TrackerError> {
        let mut seen = HashSet::new();
        let mut teams: Vec<String> = Vec::new();
        for player in &players {
            if !seen.insert(player.id) {
                return Err(TrackerError::DuplicatePlayer(player.id));
            }
            if !teams.iter().any(|team| team == &player.team) {
                teams.push(player.team.clone());
            }
        }
        Ok(Self { players, teams })
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let players: Vec<Player> = serde_json::from_str(raw).context("invalid roster json")?;
        Ok(Self::new(players)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read roster '{}'", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to load roster '{}'", path.display()))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Distinct teams in order of first appearance.
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn default_team(&self) -> Option<&str> {
        self.teams.first().map(String::as_str)
    }

    pub fn has_team(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }

    pub fn find(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.find(id).is_some()
    }

    pub fn team_players<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a Player> + 'a {
        self.players.iter().filter(move |p| p.team == team)
    }

    pub fn team_grid(
        &self,
        team: &str,
        active: &ActiveStatusMap,
        per_row: usize,
    ) -> Vec<Vec<GridCell<'_>>> {
        let cells: Vec<GridCell<'_>> = self
            .players
            .iter()
            .filter(|p| p.team == team)
            .map(|player| GridCell {
                player,
                active: active.get(&player.id).copied().unwrap_or(false),
            })
            .collect();
        cells
            .chunks(per_row.max(1))
            .map(<[GridCell<'_>]>::to_vec)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64, number: i64, team: &str) -> Player {
        Player {
            id: PlayerId(id),
            number,
            subject: format!("S{id}"),
            team: team.into(),
        }
    }

    #[test]
    fn teams_keep_first_appearance_order() {
        let roster = Roster::new(vec![
            player(1, 7, "Blue"),
            player(2, 9, "Alpha"),
            player(3, 11, "Blue"),
        ])
        .expect("roster");
        assert_eq!(roster.teams(), ["Blue".to_string(), "Alpha".to_string()]);
        assert_eq!(roster.default_team(), Some("Blue"));
        let blue: Vec<i64> = roster.team_players("Blue").map(|p| p.id.0).collect();
        assert_eq!(blue, vec![1, 3]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Roster::new(vec![player(1, 7, "A"), player(1, 8, "A")]).expect_err("dup");
        assert!(matches!(err, TrackerError::DuplicatePlayer(PlayerId(1))));
    }

    #[test]
    fn grid_chunks_rows_and_marks_active_players() {
        let players = (1..=8).map(|id| player(id, id * 2, "A")).collect();
        let roster = Roster::new(players).expect("roster");
        let mut active = ActiveStatusMap::new();
        active.insert(PlayerId(7), true);
        active.insert(PlayerId(2), false);

        let grid = roster.team_grid("A", &active, PLAYER_BUTTONS_PER_ROW);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].len(), 6);
        assert_eq!(grid[1].len(), 2);
        assert!(grid[1][0].active);
        assert!(!grid[0][1].active);
    }

    #[test]
    fn parses_roster_json() {
        let roster = Roster::from_json(
            r#"[{"id": 1, "number": 7, "subject": "S1", "team": "A"}]"#,
        )
        .expect("roster");
        assert_eq!(roster.find(PlayerId(1)).map(|p| p.number), Some(7));
        assert!(roster.find(PlayerId(2)).is_none());
    }
}
