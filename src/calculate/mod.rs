//! Statistics and ranking engine.
//!
//! Pure functions over the player roster and the game log:
//! - Score model (3 points for a win, 1 for 2nd place)
//! - Leaderboard standings with a single tie-break order
//! - Per-player game history and rank history replay
//! - Head-to-head stats over shared games
//! - Deterministic emoji assignment

pub mod emoji;
pub mod head_to_head;
pub mod history;
pub mod standings;

pub use emoji::{assign_emoji, EmojiError, EMOJI_POOL};
pub use head_to_head::head_to_head;
pub use history::{game_history, rank_history, standings_as_of};
pub use standings::{compare_standings, standings, standings_for};

use crate::models::{Game, Placement, PlayerId, SECOND_POINTS, WIN_POINTS};

/// Points a placement is worth.
pub fn placement_points(placement: Placement) -> u32 {
    match placement {
        Placement::Winner => WIN_POINTS,
        Placement::Second => SECOND_POINTS,
        Placement::Unplaced => 0,
    }
}

/// Points a player earned in a game. 0 if they did not place or did not play.
pub fn points_for(player: PlayerId, game: &Game) -> u32 {
    game.placement_of(player).map_or(0, placement_points)
}

/// Sort games into log order: by day, then by insertion.
pub(crate) fn in_log_order(games: &[Game]) -> Vec<&Game> {
    let mut sorted: Vec<&Game> = games.iter().collect();
    sorted.sort_by_key(|g| g.log_position());
    sorted
}
