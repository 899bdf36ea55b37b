//! Head-to-head stats between two players.

use std::cmp::Reverse;

use crate::models::{Game, H2HStats, Player, PlayerStats, ValidationError};

/// Compare two players over the games they both took part in.
///
/// Each player's stats count only the shared games, placed or not. The
/// returned game list is most recent first.
pub fn head_to_head(
    player1: &Player,
    player2: &Player,
    games: &[Game],
) -> Result<H2HStats, ValidationError> {
    if player1.id == player2.id {
        return Err(ValidationError::SamePlayer(player1.id));
    }

    let mut shared: Vec<&Game> = games
        .iter()
        .filter(|g| g.includes(player1.id) && g.includes(player2.id))
        .collect();
    shared.sort_by_key(|g| Reverse(g.log_position()));

    let mut player1_stats = PlayerStats::default();
    let mut player2_stats = PlayerStats::default();
    for game in &shared {
        if let Some(placement) = game.placement_of(player1.id) {
            player1_stats.record(placement);
        }
        if let Some(placement) = game.placement_of(player2.id) {
            player2_stats.record(placement);
        }
    }

    Ok(H2HStats {
        player1: player1.clone(),
        player2: player2.clone(),
        shared_games: shared.len() as u32,
        player1_stats,
        player2_stats,
        games: shared.into_iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::{game, player};
    use crate::models::{GameId, PlayerId};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_shared_games_only() {
        let a = player(1, "A");
        let b = player(2, "B");
        let games = vec![
            game(1, 1, 1, 2, &[3]),
            game(2, 2, 3, 1, &[]),
            game(3, 3, 3, 2, &[1]),
            game(4, 3, 2, 3, &[]),
        ];

        let h2h = head_to_head(&a, &b, &games).unwrap();
        assert_eq!(h2h.shared_games, 2);
        assert_eq!(h2h.player1_stats, PlayerStats::new(2, 1, 0));
        assert_eq!(h2h.player2_stats, PlayerStats::new(2, 0, 2));
        assert_eq!(h2h.player1_stats.points, 3);
        assert_eq!(h2h.player2_stats.points, 2);
        assert!((h2h.player2_stats.ppg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_games_most_recent_first() {
        let a = player(1, "A");
        let b = player(2, "B");
        let games = vec![
            game(1, 2, 1, 2, &[]),
            game(2, 1, 2, 1, &[]),
            game(3, 2, 2, 1, &[]),
        ];

        let h2h = head_to_head(&a, &b, &games).unwrap();
        let order: Vec<GameId> = h2h.games.iter().map(|g| g.id).collect();
        assert_eq!(order, vec![GameId(3), GameId(1), GameId(2)]);
    }

    #[test]
    fn test_never_met() {
        let a = player(1, "A");
        let b = player(2, "B");
        let games = vec![game(1, 1, 1, 3, &[]), game(2, 1, 2, 3, &[])];

        let h2h = head_to_head(&a, &b, &games).unwrap();
        assert_eq!(h2h.shared_games, 0);
        assert_eq!(h2h.player1_stats, PlayerStats::default());
        assert_eq!(h2h.player2_stats, PlayerStats::default());
        assert!(h2h.games.is_empty());
    }

    #[test]
    fn test_same_player_rejected() {
        let a = player(1, "A");
        assert_eq!(
            head_to_head(&a, &a, &[]),
            Err(ValidationError::SamePlayer(PlayerId(1)))
        );
    }

    #[test]
    fn test_symmetry_and_points_invariant() {
        let mut rng = StdRng::seed_from_u64(31);
        let players: Vec<Player> = (1..=4).map(|i| player(i, &format!("P{i}"))).collect();
        let games: Vec<Game> = (1..=50)
            .map(|id| {
                let winner = rng.random_range(1..=4);
                let second = winner % 4 + 1;
                let others: Vec<i64> = (1..=4)
                    .filter(|p| *p != winner && *p != second && rng.random_bool(0.5))
                    .collect();
                game(id, rng.random_range(1..=9), winner, second, &others)
            })
            .collect();

        for a in &players {
            for b in players.iter().filter(|b| b.id != a.id) {
                let ab = head_to_head(a, b, &games).unwrap();
                let ba = head_to_head(b, a, &games).unwrap();

                let expected = games
                    .iter()
                    .filter(|g| g.includes(a.id) && g.includes(b.id))
                    .count() as u32;
                assert_eq!(ab.shared_games, expected);
                assert_eq!(ab.player1_stats, ba.player2_stats);
                assert_eq!(ab.player2_stats, ba.player1_stats);
                assert_eq!(ab.player1_stats.games, ab.shared_games);

                for stats in [&ab.player1_stats, &ab.player2_stats] {
                    assert_eq!(stats.points, stats.wins * 3 + stats.seconds);
                }
            }
        }
    }
}
