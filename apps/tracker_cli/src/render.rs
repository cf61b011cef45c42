//! Plain-text views of the session for the terminal.

use std::fmt::Write as _;

use shared::domain::{ImpactLogEntry, LogEntry};
use tracker_core::GridCell;

const LOG_HEADERS: [&str; 4] = ["Player #", "Subject ID", "Action", "Time"];

pub fn grid(team: &str, rows: &[Vec<GridCell<'_>>]) -> String {
    let mut out = format!("Team: {team}\n");
    if rows.is_empty() {
        out.push_str("  (no players)\n");
        return out;
    }
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| {
                let marker = if cell.active { '*' } else { ' ' };
                format!(
                    "[{marker}#{:<3} {:<8} id={:<4}]",
                    cell.player.number, cell.player.subject, cell.player.id
                )
            })
            .collect();
        let _ = writeln!(out, "  {}", cells.join(" "));
    }
    out
}

pub fn action_log(entries: &[LogEntry]) -> String {
    let numbers: Vec<String> = entries
        .iter()
        .map(|entry| {
            entry
                .number
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        })
        .collect();
    let rows: Vec<[&str; 4]> = entries
        .iter()
        .zip(&numbers)
        .map(|(entry, number)| {
            [
                number.as_str(),
                entry.subject.as_deref().unwrap_or_default(),
                entry.action.as_deref().unwrap_or_default(),
                entry.time.as_deref().unwrap_or_default(),
            ]
        })
        .collect();
    table(LOG_HEADERS, &rows)
}

pub fn impact_log(entries: &[ImpactLogEntry]) -> String {
    let rows: Vec<[&str; 4]> = entries
        .iter()
        .map(|entry| {
            [
                entry.number.as_deref().unwrap_or_default(),
                entry.impact.as_deref().unwrap_or_default(),
                entry.time.as_deref().unwrap_or_default(),
                "",
            ]
        })
        .collect();
    table(["Jersey #", "PLA (g)", "Time", ""], &rows)
}

fn table<'a>(headers: [&'a str; 4], rows: &[[&'a str; 4]]) -> String {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, field) in widths.iter_mut().zip(row) {
            *width = (*width).max(field.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&headers).chain(rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(field, width)| format!("{field:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join(" | ").trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use shared::domain::{Action, Player, PlayerId};

    use super::*;

    #[test]
    fn log_table_lists_rows_in_log_order() {
        let player = Player {
            id: PlayerId(1),
            number: 7,
            subject: "S1".into(),
            team: "A".into(),
        };
        let entries = vec![
            LogEntry::recorded(&player, Action::Off, "01/01/2024, 10:05:00"),
            LogEntry::recorded(&player, Action::On, "01/01/2024, 10:00:00"),
        ];
        let text = action_log(&entries);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Player # | Subject ID | Action | Time"));
        assert!(lines[1].starts_with("7 "));
        assert!(lines[1].contains("OFF"));
        assert!(lines[2].contains("ON"));
    }

    #[test]
    fn grid_marks_active_cells() {
        let player = Player {
            id: PlayerId(3),
            number: 11,
            subject: "S3".into(),
            team: "B".into(),
        };
        let rows = vec![vec![GridCell {
            player: &player,
            active: true,
        }]];
        let text = grid("B", &rows);
        assert!(text.contains("[*#11"));
    }
}
