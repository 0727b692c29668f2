//! `tourney`: manage tournaments from the command line.
//!
//! The token is kept in a JSON file between runs, so `login` once and the
//! following commands are authenticated until the token expires.
//!
//! ```text
//! tourney login admin --password admin123
//! tourney tournaments list
//! tourney tournaments create --name "Spring Cup" --sport football \
//!     --start 2025-04-01 --end 2025-04-03 --deadline 2025-03-20 --max-teams 8
//! tourney register t1 --team Rovers --captain Sam --email sam@example.com
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (e.g. `RUST_LOG=tourney=debug`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tourney::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tourney", about = "Client for the Tourney tournament API", version)]
struct Cli {
    /// Root URL of the API
    #[arg(long, env = "TOURNEY_API_URL", default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// File the login token is kept in
    #[arg(long, env = "TOURNEY_TOKEN_FILE", default_value = ".tourney-session.json")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the token
    Login {
        username: String,

        #[arg(long, env = "TOURNEY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the token
    Logout,

    /// Show who the saved token belongs to
    Whoami {
        /// Ask the server instead of reading the token locally
        #[arg(long)]
        remote: bool,
    },

    /// Browse and manage tournaments
    #[command(subcommand)]
    Tournaments(TournamentCommand),

    /// Register a team for a tournament
    Register {
        tournament_id: String,

        #[arg(long)]
        team: String,

        #[arg(long)]
        captain: String,

        #[arg(long)]
        email: String,

        /// Player name (repeatable)
        #[arg(long = "player")]
        players: Vec<String>,
    },

    /// List the teams registered for a tournament (login required)
    Registrations { tournament_id: String },
}

#[derive(Subcommand)]
enum TournamentCommand {
    /// List all tournaments
    List,

    /// Show one tournament
    Get { id: String },

    /// Create a tournament (admin)
    Create(TournamentFields),

    /// Change a tournament (admin). Only the given fields change.
    Update {
        id: String,

        #[command(flatten)]
        fields: TournamentPatch,
    },

    /// Delete a tournament (admin)
    Delete { id: String },
}

#[derive(clap::Args)]
struct TournamentFields {
    #[arg(long)]
    name: String,

    #[arg(long)]
    sport: String,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    start: String,

    /// Last day, YYYY-MM-DD
    #[arg(long)]
    end: String,

    /// Registration deadline, YYYY-MM-DD
    #[arg(long)]
    deadline: String,

    #[arg(long)]
    max_teams: u32,

    #[arg(long)]
    description: Option<String>,
}

impl From<TournamentFields> for Tournament {
    fn from(fields: TournamentFields) -> Self {
        Tournament {
            name: fields.name,
            sport: fields.sport,
            start_date: fields.start,
            end_date: fields.end,
            registration_deadline: fields.deadline,
            max_teams: fields.max_teams,
            description: fields.description,
            ..Tournament::default()
        }
    }
}

#[derive(clap::Args)]
struct TournamentPatch {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    sport: Option<String>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,

    #[arg(long)]
    deadline: Option<String>,

    #[arg(long)]
    max_teams: Option<u32>,

    #[arg(long)]
    description: Option<String>,
}

impl TournamentPatch {
    fn apply(self, t: &mut Tournament) {
        if let Some(v) = self.name {
            t.name = v;
        }
        if let Some(v) = self.sport {
            t.sport = v;
        }
        if let Some(v) = self.start {
            t.start_date = v;
        }
        if let Some(v) = self.end {
            t.end_date = v;
        }
        if let Some(v) = self.deadline {
            t.registration_deadline = v;
        }
        if let Some(v) = self.max_teams {
            t.max_teams = v;
        }
        if self.description.is_some() {
            t.description = self.description;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(api_url = %cli.api_url, token_file = %cli.token_file.display(), "starting");
    let client = TourneyClient::builder()
        .base_url(&cli.api_url)
        .file_storage(&cli.token_file)
        .build()
        .with_context(|| format!("Failed to set up client for {}", cli.api_url))?;

    run(&client, cli.command).await
}

async fn run(client: &TourneyClient, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let session = client.login(&username, &password).await?;
            let role = if session.is_admin { "admin" } else { "user" };
            println!("Logged in as {username} ({role})");
        }
        Command::Logout => {
            client.logout();
            println!("Logged out");
        }
        Command::Whoami { remote } => {
            let user = if remote {
                Some(client.session().current_user().await?)
            } else {
                client.session().user()
            };
            match user {
                Some(user) if user.is_admin => println!("{} (admin)", user.username),
                Some(user) => println!("{}", user.username),
                None => println!("Not logged in"),
            }
        }
        Command::Tournaments(command) => tournaments(client, command).await?,
        Command::Register {
            tournament_id,
            team,
            captain,
            email,
            players,
        } => {
            let created = client
                .registrations()
                .register(&Registration {
                    tournament_id,
                    team_name: team,
                    captain_name: captain,
                    captain_email: email,
                    player_names: players,
                    ..Registration::default()
                })
                .await?;
            print_json(&created)?;
        }
        Command::Registrations { tournament_id } => {
            let list = client
                .registrations()
                .list_for_tournament(&tournament_id)
                .await?;
            print_json(&list)?;
        }
    }
    Ok(())
}

async fn tournaments(client: &TourneyClient, command: TournamentCommand) -> Result<()> {
    let store = client.tournaments();
    match command {
        TournamentCommand::List => {
            store.list().await?;
            for t in store.items() {
                let slots = t
                    .open_slots()
                    .map(|n| format!("{n} slots left"))
                    .unwrap_or_else(|| format!("max {} teams", t.max_teams));
                println!(
                    "{}  {}  [{}]  {} .. {}  ({slots})",
                    t.id.as_deref().unwrap_or("-"),
                    t.name,
                    t.sport,
                    t.start_date,
                    t.end_date,
                );
            }
        }
        TournamentCommand::Get { id } => print_json(&store.get(&id).await?)?,
        TournamentCommand::Create(fields) => {
            let created = store.create(&fields.into()).await?;
            print_json(&created)?;
        }
        TournamentCommand::Update { id, fields } => {
            let mut tournament = store.get(&id).await?;
            fields.apply(&mut tournament);
            let updated = store.update(&id, &tournament).await?;
            print_json(&updated)?;
        }
        TournamentCommand::Delete { id } => {
            store.delete(&id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let value: Value = serde_json::to_value(value)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
