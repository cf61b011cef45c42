use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::PlayerId;
use storage::SqliteStateStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracker_core::{
    ImportKind, ImportOutcome, Roster, TrackerSession, PLAYER_BUTTONS_PER_ROW,
};

mod config;
mod render;

use config::{load_settings, normalize_database_url};

#[derive(Parser, Debug)]
#[command(name = "roster-tracker", about = "Track player activation and export the action log")]
struct Cli {
    /// Config file (defaults to ./tracker.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    roster: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the roster's teams.
    Teams,
    /// Show the player grid for the selected team (or `--team`).
    Players {
        #[arg(long)]
        team: Option<String>,
    },
    SelectTeam {
        team: String,
    },
    /// Flip one or more players on/off, in the order given.
    Toggle {
        #[arg(required = true)]
        player_ids: Vec<i64>,
    },
    DeactivateAll,
    /// Empty the action log and reset every player to inactive.
    Clear,
    Log,
    Export {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    ImportLog {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    ImportImpact {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(database_url) = cli.database_url.clone() {
        settings.database_url = database_url;
    }
    if let Some(roster) = cli.roster.clone() {
        settings.roster_path = roster;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let roster = Roster::load(&settings.roster_path)?;
    let database_url = normalize_database_url(&settings.database_url);
    let store = SqliteStateStore::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    if let Err(error) = store.health_check().await {
        error!(%database_url, %error, "SQLite health check failed");
        return Err(error);
    }
    let mut session = TrackerSession::hydrate(roster, store).await?;

    match cli.command {
        Command::Teams => {
            for team in session.roster().teams() {
                let marker = if team == session.selected_team() { "*" } else { " " };
                println!("{marker} {team}");
            }
        }
        Command::Players { team } => {
            let team = team.unwrap_or_else(|| session.selected_team().to_string());
            let rows = session.roster().team_grid(
                &team,
                session.active_map(),
                PLAYER_BUTTONS_PER_ROW,
            );
            print!("{}", render::grid(&team, &rows));
        }
        Command::SelectTeam { team } => {
            session.select_team(&team).await?;
            print!(
                "{}",
                render::grid(session.selected_team(), &session.team_grid(PLAYER_BUTTONS_PER_ROW))
            );
        }
        Command::Toggle { player_ids } => {
            for id in player_ids {
                match session.toggle(PlayerId(id)).await? {
                    Some(entry) => println!(
                        "#{} {} -> {}",
                        entry.number.as_ref().map(ToString::to_string).unwrap_or_default(),
                        entry.subject.as_deref().unwrap_or_default(),
                        entry.action.as_deref().unwrap_or_default()
                    ),
                    None => println!("unknown player id {id}; nothing changed"),
                }
            }
        }
        Command::DeactivateAll => {
            let batch = session.deactivate_all_active().await?;
            println!("deactivated {} player(s)", batch.len());
        }
        Command::Clear => {
            session.clear().await?;
            println!("action log cleared");
        }
        Command::Log => {
            print!("{}", render::action_log(session.action_log()));
        }
        Command::Export { out_dir } => match session.export_csv() {
            Some(export) => {
                let dir = out_dir.unwrap_or_else(|| settings.export_dir.clone());
                let path = export.write_to(&dir)?;
                info!(path = %path.display(), mime = export.mime_type, "exported action log");
                println!("{}", path.display());
            }
            None => println!("action log is empty; nothing exported"),
        },
        Command::ImportLog { files } => {
            import_files(&mut session, files, ImportKind::ActionLog).await?;
        }
        Command::ImportImpact { files } => {
            import_files(&mut session, files, ImportKind::ImpactLog).await?;
            print!("{}", render::impact_log(session.impact_log()));
        }
    }

    Ok(())
}

/// Starts every read up front, then applies results in the order given.
async fn import_files(
    session: &mut TrackerSession<SqliteStateStore>,
    files: Vec<PathBuf>,
    kind: ImportKind,
) -> Result<()> {
    let pending: Vec<_> = files
        .into_iter()
        .map(|path| session.begin_import(path, kind))
        .collect();

    for job in pending {
        let path = job.path().display().to_string();
        match session
            .finish_import(job)
            .await
            .with_context(|| format!("import of '{path}' did not complete"))?
        {
            ImportOutcome::Applied { rows, .. } => println!("{path}: imported {rows} row(s)"),
            ImportOutcome::Rejected { .. } => println!("{path}: could not be imported"),
        }
    }
    Ok(())
}
