//! Tic-tac-toe ladder - unified CLI
//!
//! Serves the league over HTTP or prints reports from its database.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_ladder::{LeagueConfig, LeagueService, SqliteRepository, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictactoe_ladder=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = LeagueConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Serve { port, host } => {
            let config = config.with_overrides(host, port, cli.db_path);
            run_server(config).await
        }
        Command::Rankings => {
            let config = config.with_overrides(None, None, cli.db_path);
            print_rankings(&open_league(&config)?)
        }
        Command::Reminders => {
            let config = config.with_overrides(None, None, cli.db_path);
            print_reminders(&open_league(&config)?)
        }
    }
}

/// Opens the database and wraps it in a league service.
#[instrument(skip(config), fields(db_path = %config.db_path()))]
fn open_league(config: &LeagueConfig) -> Result<LeagueService> {
    let repository = SqliteRepository::new(config.db_path().clone())?;
    Ok(LeagueService::new(Arc::new(repository), config.stats_ttl()))
}

/// Runs the HTTP league server until interrupted.
async fn run_server(config: LeagueConfig) -> Result<()> {
    info!("Starting tictactoe_ladder server");

    let league = open_league(&config)?;
    let app = router(league);

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(host = %config.host(), port = config.port(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
        })
        .await?;

    Ok(())
}

/// Prints the leaderboard, highest ranking first.
fn print_rankings(league: &LeagueService) -> Result<()> {
    let rankings = league.list_rankings()?;
    if rankings.is_empty() {
        println!("No players registered.");
        return Ok(());
    }

    println!(
        "{:<4} {:<20} {:>5} {:>4} {:>5} {:>6} {:>8}",
        "#", "Player", "Games", "Wins", "Draws", "Losses", "Ranking"
    );
    for (place, row) in rankings.iter().enumerate() {
        println!(
            "{:<4} {:<20} {:>5} {:>4} {:>5} {:>6} {:>8.3}",
            place + 1,
            row.player_name,
            row.total_games,
            row.wins,
            row.draws,
            row.losses,
            row.ranking
        );
    }
    Ok(())
}

/// Prints the reminder owed to each player with a game in progress.
fn print_reminders(league: &LeagueService) -> Result<()> {
    let reminders = league.pending_reminders()?;
    info!(count = reminders.len(), "Reminders pending");

    for reminder in reminders {
        println!("To: {} <{}>", reminder.user_name, reminder.email);
        println!("Subject: {}", reminder.subject);
        println!();
        println!("{}", reminder.body);
        println!("Games: {:?}", reminder.game_ids);
        println!("---");
    }
    Ok(())
}
