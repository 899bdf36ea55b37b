//! Leaderboard standings.
//!
//! The leaderboard order is points, then wins, then 2nd places, then games
//! played (all descending), then name ascending. Names are unique so the order
//! is total. The same comparator ranks historical snapshots in
//! [`super::history`].

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Game, Player, PlayerId, PlayerStats, StandingsEntry};

/// Leaderboard order between two players. `Less` means `a` ranks above `b`.
pub fn compare_standings(a: (&str, &PlayerStats), b: (&str, &PlayerStats)) -> Ordering {
    let (a_name, a) = a;
    let (b_name, b) = b;
    b.points
        .cmp(&a.points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.seconds.cmp(&a.seconds))
        .then_with(|| b.games.cmp(&a.games))
        .then_with(|| a_name.cmp(b_name))
}

/// Tally stats for every roster player over the given games.
///
/// Participants missing from the roster are ignored.
pub(crate) fn tally<'a>(
    players: &[Player],
    games: impl IntoIterator<Item = &'a Game>,
) -> HashMap<PlayerId, PlayerStats> {
    let mut totals: HashMap<PlayerId, PlayerStats> = players
        .iter()
        .map(|p| (p.id, PlayerStats::default()))
        .collect();

    for game in games {
        record_game(&mut totals, game);
    }

    totals
}

/// Fold one game into running totals.
pub(crate) fn record_game(totals: &mut HashMap<PlayerId, PlayerStats>, game: &Game) {
    for &participant in &game.participants {
        if let (Some(stats), Some(placement)) =
            (totals.get_mut(&participant), game.placement_of(participant))
        {
            stats.record(placement);
        }
    }
}

/// Order the roster by the leaderboard comparator and number the ranks.
pub(crate) fn rank_players(
    players: &[Player],
    totals: &HashMap<PlayerId, PlayerStats>,
) -> Vec<StandingsEntry> {
    let mut rows: Vec<(&Player, PlayerStats)> = players
        .iter()
        .map(|p| (p, totals.get(&p.id).copied().unwrap_or_default()))
        .collect();

    rows.sort_by(|(pa, sa), (pb, sb)| {
        compare_standings((pa.name.as_str(), sa), (pb.name.as_str(), sb))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, (player, stats))| StandingsEntry {
            rank: i as u32 + 1,
            player: player.clone(),
            stats,
        })
        .collect()
}

/// Full leaderboard, one entry per roster player, best first.
pub fn standings(players: &[Player], games: &[Game]) -> Vec<StandingsEntry> {
    rank_players(players, &tally(players, games))
}

/// Leaderboard entries for the requested players, in the order requested.
///
/// Ranks are positions in the full leaderboard. Unknown ids are skipped.
pub fn standings_for(players: &[Player], games: &[Game], ids: &[PlayerId]) -> Vec<StandingsEntry> {
    let by_id: HashMap<PlayerId, StandingsEntry> = standings(players, games)
        .into_iter()
        .map(|entry| (entry.player.id, entry))
        .collect();

    ids.iter().filter_map(|id| by_id.get(id).cloned()).collect()
}
