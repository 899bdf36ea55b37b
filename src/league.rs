//! League service.
//!
//! Every query reloads the roster and game log from the store and runs the
//! pure engine in [`crate::calculate`] over them. Writes go through a single
//! lock so emoji assignment and game appends never interleave.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, info};

use crate::calculate;
use crate::models::{
    dedupe, normalize_player_name, Game, GameHistoryEntry, H2HStats, NewGame, Player, PlayerId,
    RankHistoryEntry, StandingsEntry, ValidationError,
};
use crate::storage::{StorageConfig, StorageError, Store};

/// Errors returned by league operations.
#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("League store lock poisoned")]
    LockPoisoned,
}

/// The league: roster, game log and the queries over them.
pub struct League {
    store: Mutex<Store>,
}

impl League {
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Open the league database described by `config`.
    pub fn open(config: &StorageConfig) -> Result<Self, LeagueError> {
        Ok(Self::new(Store::open(&config.database_path)?))
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, LeagueError> {
        self.store.lock().map_err(|_| LeagueError::LockPoisoned)
    }

    /// Roster and full game log, read under one lock.
    fn snapshot(&self) -> Result<(Vec<Player>, Vec<Game>), LeagueError> {
        let store = self.store()?;
        Ok((store.players()?, store.games()?))
    }

    /// Full leaderboard, best first.
    pub fn standings(&self) -> Result<Vec<StandingsEntry>, LeagueError> {
        let (players, games) = self.snapshot()?;
        Ok(calculate::standings(&players, &games))
    }

    /// Leaderboard rows for `ids`, in the order given.
    pub fn standings_for(&self, ids: &[PlayerId]) -> Result<Vec<StandingsEntry>, LeagueError> {
        let (players, games) = self.snapshot()?;
        Ok(calculate::standings_for(&players, &games, ids))
    }

    /// Running totals after each of the player's games.
    pub fn game_history(&self, player: PlayerId) -> Result<Vec<GameHistoryEntry>, LeagueError> {
        let (players, games) = self.snapshot()?;
        find_player(&players, player)?;
        Ok(calculate::game_history(player, &games))
    }

    /// Leaderboard rank after each of the player's games.
    pub fn rank_history(&self, player: PlayerId) -> Result<Vec<RankHistoryEntry>, LeagueError> {
        let (players, games) = self.snapshot()?;
        find_player(&players, player)?;
        Ok(calculate::rank_history(player, &players, &games))
    }

    /// Stats for two players over the games they shared.
    pub fn head_to_head(&self, id1: PlayerId, id2: PlayerId) -> Result<H2HStats, LeagueError> {
        let (players, games) = self.snapshot()?;
        let player1 = find_player(&players, id1)?;
        let player2 = find_player(&players, id2)?;
        Ok(calculate::head_to_head(player1, player2, &games)?)
    }

    /// Validate and append a game.
    ///
    /// Rejected games leave the log untouched.
    pub fn record_game(&self, mut game: NewGame) -> Result<Game, LeagueError> {
        game.participants = dedupe(&game.participants);
        game.validate()?;

        let mut store = self.store()?;
        let roster: HashSet<PlayerId> = store.players()?.iter().map(|p| p.id).collect();
        if let Some(&unknown) = game.participants.iter().find(|id| !roster.contains(*id)) {
            return Err(ValidationError::UnknownPlayer(unknown).into());
        }

        let recorded = store.insert_game(&game)?;
        info!(
            "Recorded game {} on {} with {} players",
            recorded.id,
            recorded.played_at,
            recorded.participants.len()
        );
        Ok(recorded)
    }

    /// Register a new player and assign their emoji.
    pub fn add_player(&self, name: &str) -> Result<Player, LeagueError> {
        let name = normalize_player_name(name)?;

        let mut store = self.store()?;
        if store.player_by_name(&name)?.is_some() {
            return Err(ValidationError::DuplicateName(name).into());
        }

        let player = store.insert_player(&name)?;
        info!("Added player {} {}", player.name, player.emoji);
        Ok(player)
    }

    /// Roster sorted by name.
    pub fn players(&self) -> Result<Vec<Player>, LeagueError> {
        let mut players = self.store()?.players()?;
        players.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(players)
    }

    /// One player by id.
    pub fn player(&self, id: PlayerId) -> Result<Player, LeagueError> {
        self.store()?
            .player(id)?
            .ok_or(LeagueError::PlayerNotFound(id))
    }

    /// Game log, most recent first.
    pub fn games(&self) -> Result<Vec<Game>, LeagueError> {
        let mut games = self.store()?.games()?;
        games.reverse();
        debug!("Listing {} games", games.len());
        Ok(games)
    }

    /// Assign emojis to any players still missing one.
    pub fn backfill_emojis(&self) -> Result<usize, LeagueError> {
        Ok(self.store()?.backfill_emojis()?)
    }
}

fn find_player(players: &[Player], id: PlayerId) -> Result<&Player, LeagueError> {
    players
        .iter()
        .find(|p| p.id == id)
        .ok_or(LeagueError::PlayerNotFound(id))
}
