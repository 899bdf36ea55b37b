//! Per-player history: running totals and rank replay.
//!
//! Games are replayed in log order (day, then game id). A snapshot "as of" a
//! game includes that game and every game before it in log order, so games
//! recorded later on the same day are excluded. Same-day games are ordered by
//! insertion id because dates carry no time of day.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    Game, GameHistoryEntry, GameId, Player, PlayerId, PlayerStats, RankHistoryEntry,
    StandingsEntry,
};

use super::standings::{compare_standings, rank_players, record_game, tally};
use super::{in_log_order, placement_points};

/// Running totals for one player after each of their games, oldest first.
pub fn game_history(player: PlayerId, games: &[Game]) -> Vec<GameHistoryEntry> {
    let mut totals = PlayerStats::default();

    in_log_order(games)
        .into_iter()
        .filter_map(|game| game.placement_of(player).map(|placement| (game, placement)))
        .map(|(game, placement)| {
            totals.record(placement);
            GameHistoryEntry {
                game_id: game.id,
                played_at: game.played_at,
                points: placement_points(placement),
                total_points: totals.points,
                games: totals.games,
                ppg: totals.ppg,
            }
        })
        .collect()
}

/// The player's leaderboard rank right after each of their games, oldest first.
///
/// Folds the log once, keeping running totals for the whole roster, and ranks
/// the player against everyone else whenever one of their games is applied.
/// Returns an empty list if the player is not on the roster.
pub fn rank_history(player: PlayerId, players: &[Player], games: &[Game]) -> Vec<RankHistoryEntry> {
    let Some(target) = players.iter().find(|p| p.id == player) else {
        return Vec::new();
    };

    let mut totals = tally(players, std::iter::empty());
    let mut history = Vec::new();

    for game in in_log_order(games) {
        record_game(&mut totals, game);
        if game.includes(player) {
            history.push(RankHistoryEntry {
                game_id: game.id,
                played_at: game.played_at,
                rank: rank_of(target, players, &totals),
            });
        }
    }

    history
}

/// Full leaderboard as of a game, that game included.
///
/// Returns None if the game is not in the log.
pub fn standings_as_of(
    players: &[Player],
    games: &[Game],
    game_id: GameId,
) -> Option<Vec<StandingsEntry>> {
    let cutoff = games.iter().find(|g| g.id == game_id)?.log_position();
    let totals = tally(
        players,
        games.iter().filter(|g| g.log_position() <= cutoff),
    );
    Some(rank_players(players, &totals))
}

/// 1 + the number of roster players ranked above the target.
fn rank_of(target: &Player, players: &[Player], totals: &HashMap<PlayerId, PlayerStats>) -> u32 {
    let stats_of = |id: PlayerId| totals.get(&id).copied().unwrap_or_default();
    let target_stats = stats_of(target.id);

    let ahead = players
        .iter()
        .filter(|p| p.id != target.id)
        .filter(|p| {
            compare_standings(
                (p.name.as_str(), &stats_of(p.id)),
                (target.name.as_str(), &target_stats),
            ) == Ordering::Less
        })
        .count();

    ahead as u32 + 1
}
