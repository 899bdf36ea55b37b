use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_tracker::config::AppConfig;
use league_tracker::league::League;
use league_tracker::models::{NewGame, Player, PlayerId, StandingsEntry};
use league_tracker::parse_played_at;

#[derive(Parser)]
#[command(name = "league-tracker")]
#[command(about = "Game league results, standings and rank history")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./league.toml")]
    config: PathBuf,

    /// Database path (overrides the config file)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new player
    AddPlayer {
        /// Display name
        name: String,
    },

    /// List players by name
    Players,

    /// Record a finished game
    RecordGame {
        /// Everyone who played (names or #ids, comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        players: Vec<String>,

        /// Winner (name or #id)
        #[arg(long)]
        winner: String,

        /// 2nd place (name or #id)
        #[arg(long)]
        second: String,

        /// Day played (YYYY-MM-DD, default today)
        #[arg(long, default_value = "")]
        date: String,

        /// Who is recording the game
        #[arg(long)]
        by: Option<String>,
    },

    /// List games, most recent first
    Games,

    /// Show the leaderboard
    Standings {
        /// Only these players, in this order (names or #ids, comma-separated)
        #[arg(long, value_delimiter = ',')]
        players: Vec<String>,
    },

    /// Running totals after each of a player's games
    History {
        /// Player name or #id
        player: String,
    },

    /// Leaderboard rank after each of a player's games
    RankHistory {
        /// Player name or #id
        player: String,
    },

    /// Compare two players over the games they shared
    H2h {
        /// First player (name or #id)
        player1: String,

        /// Second player (name or #id)
        player2: String,
    },

    /// Assign emojis to players that have none
    BackfillEmojis,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate().context("Invalid configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting league-tracker v{}", env!("CARGO_PKG_VERSION"));

    let league = League::open(&config.storage())
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;

    match cli.command {
        Commands::AddPlayer { name } => {
            let player = league.add_player(&name)?;
            if cli.json {
                print_json(&player)?;
            } else {
                println!("Added {} (id {})", player.label(), player.id);
            }
        }

        Commands::Players => {
            let players = league.players()?;
            if cli.json {
                print_json(&players)?;
            } else if players.is_empty() {
                println!("No players yet. Use `add-player` to register one.");
            } else {
                for player in &players {
                    println!("{:>4}  {}", player.id, player.label());
                }
            }
        }

        Commands::RecordGame {
            players,
            winner,
            second,
            date,
            by,
        } => {
            let roster = league.players()?;
            let participants = players
                .iter()
                .map(|p| resolve_player(&roster, p))
                .collect::<Result<Vec<_>>>()?;
            let winner = resolve_player(&roster, &winner)?;
            let second = resolve_player(&roster, &second)?;
            let today = chrono::Local::now().date_naive();
            let played_at = parse_played_at(&date, today)?;

            let mut game = NewGame::new(played_at, participants, winner, second);
            if let Some(by) = by.or_else(|| config.default_attribution.clone()) {
                game = game.with_created_by(by);
            }

            let recorded = league.record_game(game)?;
            if cli.json {
                print_json(&recorded)?;
            } else {
                println!(
                    "Recorded game {} on {}: {} won, {} 2nd",
                    recorded.id,
                    recorded.played_at,
                    name_of(&roster, recorded.winner),
                    name_of(&roster, recorded.second)
                );
            }
        }

        Commands::Games => {
            let games = league.games()?;
            if cli.json {
                print_json(&games)?;
            } else {
                let roster = league.players()?;
                println!("=== Games ({}) ===\n", games.len());
                for game in &games {
                    let others: Vec<String> = game
                        .ordered_participants()
                        .into_iter()
                        .skip(2)
                        .map(|id| name_of(&roster, id))
                        .collect();
                    println!(
                        "#{:<4} {}  1st {}  2nd {}  also {}{}",
                        game.id,
                        game.played_at,
                        name_of(&roster, game.winner),
                        name_of(&roster, game.second),
                        if others.is_empty() { "-".to_string() } else { others.join(", ") },
                        game.created_by
                            .as_deref()
                            .map(|by| format!("  (by {})", by))
                            .unwrap_or_default()
                    );
                }
            }
        }

        Commands::Standings { players } => {
            let entries = if players.is_empty() {
                league.standings()?
            } else {
                let roster = league.players()?;
                let ids = players
                    .iter()
                    .map(|p| resolve_player(&roster, p))
                    .collect::<Result<Vec<_>>>()?;
                league.standings_for(&ids)?
            };
            if cli.json {
                print_json(&entries)?;
            } else {
                print_standings(&entries);
            }
        }

        Commands::History { player } => {
            let player = resolve_player(&league.players()?, &player)?;
            let history = league.game_history(player)?;
            if cli.json {
                print_json(&history)?;
            } else {
                println!("{:<6} {:<10} {:>4} {:>6} {:>5} {:>5}", "Game", "Date", "Pts", "Total", "GP", "PPG");
                for entry in &history {
                    println!(
                        "{:<6} {:<10} {:>4} {:>6} {:>5} {:>5.2}",
                        entry.game_id, entry.played_at, entry.points, entry.total_points, entry.games, entry.ppg
                    );
                }
            }
        }

        Commands::RankHistory { player } => {
            let player = resolve_player(&league.players()?, &player)?;
            let history = league.rank_history(player)?;
            if cli.json {
                print_json(&history)?;
            } else {
                println!("{:<6} {:<10} {:>4}", "Game", "Date", "Rank");
                for entry in &history {
                    println!("{:<6} {:<10} {:>4}", entry.game_id, entry.played_at, entry.rank);
                }
            }
        }

        Commands::H2h { player1, player2 } => {
            let roster = league.players()?;
            let id1 = resolve_player(&roster, &player1)?;
            let id2 = resolve_player(&roster, &player2)?;
            let h2h = league.head_to_head(id1, id2)?;
            if cli.json {
                print_json(&h2h)?;
            } else {
                println!(
                    "=== {} vs {} ({} shared games) ===\n",
                    h2h.player1.label(),
                    h2h.player2.label(),
                    h2h.shared_games
                );
                for (player, stats) in [
                    (&h2h.player1, &h2h.player1_stats),
                    (&h2h.player2, &h2h.player2_stats),
                ] {
                    println!(
                        "{:<20} wins {:>3}  2nd {:>3}  pts {:>4}  ppg {:.2}",
                        player.name, stats.wins, stats.seconds, stats.points, stats.ppg
                    );
                }
                if !h2h.games.is_empty() {
                    println!();
                    for game in &h2h.games {
                        println!(
                            "#{:<4} {}  1st {}  2nd {}",
                            game.id,
                            game.played_at,
                            name_of(&roster, game.winner),
                            name_of(&roster, game.second)
                        );
                    }
                }
            }
        }

        Commands::BackfillEmojis => {
            let updated = league.backfill_emojis()?;
            if cli.json {
                print_json(&serde_json::json!({ "updated": updated }))?;
            } else {
                println!("Backfilled emojis for {} players", updated);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_standings(entries: &[StandingsEntry]) {
    println!(
        "{:>4}  {:<24} {:>4} {:>4} {:>4} {:>5} {:>5}",
        "#", "Player", "GP", "W", "2nd", "Pts", "PPG"
    );
    for entry in entries {
        println!(
            "{:>4}  {:<24} {:>4} {:>4} {:>4} {:>5} {:>5.2}",
            entry.rank,
            entry.player.label(),
            entry.stats.games,
            entry.stats.wins,
            entry.stats.seconds,
            entry.stats.points,
            entry.stats.ppg
        );
    }
}

/// Resolve `#12` or `12` to an id, anything else to the player of that name.
///
/// Names are never all digits, so the two forms cannot overlap.
fn resolve_player(roster: &[Player], reference: &str) -> Result<PlayerId> {
    let reference = reference.trim();
    let digits = reference.strip_prefix('#').unwrap_or(reference);
    if let Ok(id) = digits.parse::<i64>() {
        return Ok(PlayerId(id));
    }
    match roster.iter().find(|p| p.name == reference) {
        Some(player) => Ok(player.id),
        None => bail!("No player named {:?}", reference),
    }
}

fn name_of(roster: &[Player], id: PlayerId) -> String {
    roster
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}
