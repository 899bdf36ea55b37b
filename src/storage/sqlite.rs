//! SQLite-backed roster and game log (rusqlite).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::calculate::assign_emoji;
use crate::models::{Game, GameId, NewGame, Player, PlayerId};

use super::StorageError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    emoji TEXT NOT NULL DEFAULT '',
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    played_at DATE NOT NULL,
    winner_id INTEGER NOT NULL REFERENCES players(id),
    second_id INTEGER NOT NULL REFERENCES players(id),
    created_by TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    CHECK (winner_id != second_id)
);

CREATE TABLE IF NOT EXISTS game_players (
    game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    PRIMARY KEY (game_id, player_id)
);
";

/// Handle to the league database.
///
/// Writes take `&mut self`; callers sharing a store serialize access
/// (see [`crate::league::League`]).
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at `path`.
    ///
    /// Applies the schema, adds the emoji column to legacy databases and
    /// backfills missing emojis.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!("Opening league database at {:?}", path);
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut store = Store { conn };
        store.initialize_schema()?;
        store.backfill_emojis()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(SCHEMA)?;
        if self.ensure_emoji_column()? {
            info!("Added emoji column to players table");
        }
        Ok(())
    }

    /// Add the emoji column if the players table predates it.
    /// Returns true if the column was added.
    fn ensure_emoji_column(&self) -> Result<bool, StorageError> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(players)")?;
        let has_emoji = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?
            .iter()
            .any(|column| column.eq_ignore_ascii_case("emoji"));

        if has_emoji {
            return Ok(false);
        }

        self.conn.execute(
            "ALTER TABLE players ADD COLUMN emoji TEXT NOT NULL DEFAULT ''",
            [],
        )?;
        Ok(true)
    }

    /// Give every player with a blank emoji one, in id order.
    ///
    /// Runs in one transaction. Returns the number of players updated.
    pub fn backfill_emojis(&mut self) -> Result<usize, StorageError> {
        let rows: Vec<(PlayerId, String, String)> = {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, TRIM(COALESCE(emoji, '')) FROM players ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((PlayerId(row.get(0)?), row.get(1)?, row.get(2)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut used: HashSet<String> = rows
            .iter()
            .filter(|(_, _, emoji)| !emoji.is_empty())
            .map(|(_, _, emoji)| emoji.clone())
            .collect();

        let missing: Vec<&(PlayerId, String, String)> =
            rows.iter().filter(|(_, _, emoji)| emoji.is_empty()).collect();
        if missing.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        for (id, name, _) in &missing {
            let emoji = assign_emoji(name, *id, &used)?;
            used.insert(emoji.to_string());
            tx.execute(
                "UPDATE players SET emoji = ?1 WHERE id = ?2",
                params![emoji, id.get()],
            )?;
        }
        tx.commit()?;

        info!("Backfilled emojis for {} players", missing.len());
        Ok(missing.len())
    }

    /// Emojis currently held by players.
    pub fn used_emojis(&self) -> Result<HashSet<String>, StorageError> {
        load_used_emojis(&self.conn)
    }

    /// Register a player and assign their emoji, atomically.
    ///
    /// The name must already be trimmed and checked for uniqueness.
    pub fn insert_player(&mut self, name: &str) -> Result<Player, StorageError> {
        let tx = self.conn.transaction()?;

        tx.execute("INSERT INTO players (name) VALUES (?1)", params![name])?;
        let id = PlayerId(tx.last_insert_rowid());

        let used = load_used_emojis(&tx)?;
        let emoji = assign_emoji(name, id, &used)?;
        tx.execute(
            "UPDATE players SET emoji = ?1 WHERE id = ?2",
            params![emoji, id.get()],
        )?;

        tx.commit()?;
        debug!("Inserted player {} ({}) with emoji {}", id, name, emoji);
        Ok(Player::new(id, name, emoji))
    }

    /// All players, by id.
    pub fn players(&self) -> Result<Vec<Player>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, emoji FROM players ORDER BY id")?;
        let players = stmt
            .query_map([], player_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(players)
    }

    /// Look up a player by id.
    pub fn player(&self, id: PlayerId) -> Result<Option<Player>, StorageError> {
        let player = self
            .conn
            .query_row(
                "SELECT id, name, emoji FROM players WHERE id = ?1",
                params![id.get()],
                player_from_row,
            )
            .optional()?;
        Ok(player)
    }

    /// Look up a player by exact name.
    pub fn player_by_name(&self, name: &str) -> Result<Option<Player>, StorageError> {
        let player = self
            .conn
            .query_row(
                "SELECT id, name, emoji FROM players WHERE name = ?1",
                params![name],
                player_from_row,
            )
            .optional()?;
        Ok(player)
    }

    /// The whole game log with participants, in log order (day, then id).
    pub fn games(&self) -> Result<Vec<Game>, StorageError> {
        let mut participants = self.participants_by_game()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, date(played_at), winner_id, second_id, NULLIF(TRIM(created_by), '')
             FROM games
             ORDER BY date(played_at), id",
        )?;
        let mut games = stmt
            .query_map([], |row| {
                Ok(Game {
                    id: GameId(row.get(0)?),
                    played_at: row.get(1)?,
                    winner: PlayerId(row.get(2)?),
                    second: PlayerId(row.get(3)?),
                    participants: Vec::new(),
                    created_by: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for game in &mut games {
            game.participants = participants.remove(&game.id).unwrap_or_default();
        }

        debug!("Loaded {} games", games.len());
        Ok(games)
    }

    fn participants_by_game(&self) -> Result<HashMap<GameId, Vec<PlayerId>>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT game_id, player_id FROM game_players ORDER BY game_id, rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((GameId(row.get(0)?), PlayerId(row.get(1)?)))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_game: HashMap<GameId, Vec<PlayerId>> = HashMap::new();
        for (game_id, player_id) in rows {
            by_game.entry(game_id).or_default().push(player_id);
        }
        Ok(by_game)
    }

    /// Number of recorded games.
    pub fn game_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Append a game and its participants in one transaction.
    ///
    /// Nothing is written if any insert fails.
    pub fn insert_game(&mut self, game: &NewGame) -> Result<Game, StorageError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO games (played_at, winner_id, second_id, created_by)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                game.played_at,
                game.winner.get(),
                game.second.get(),
                game.created_by
            ],
        )?;
        let id = GameId(tx.last_insert_rowid());

        {
            let mut stmt =
                tx.prepare("INSERT INTO game_players (game_id, player_id) VALUES (?1, ?2)")?;
            for participant in &game.participants {
                stmt.execute(params![id.get(), participant.get()])?;
            }
        }

        tx.commit()?;

        Ok(Game {
            id,
            played_at: game.played_at,
            winner: game.winner,
            second: game.second,
            participants: game.participants.clone(),
            created_by: game.created_by.clone(),
        })
    }
}

fn player_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: PlayerId(row.get(0)?),
        name: row.get(1)?,
        emoji: row.get(2)?,
    })
}

fn load_used_emojis(conn: &Connection) -> Result<HashSet<String>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT TRIM(emoji) FROM players WHERE TRIM(COALESCE(emoji, '')) != ''",
    )?;
    let used = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn store_with_players(names: &[&str]) -> (Store, Vec<Player>) {
        let mut store = Store::open_in_memory().unwrap();
        let players = names
            .iter()
            .map(|name| store.insert_player(name).unwrap())
            .collect();
        (store, players)
    }

    #[test]
    fn test_insert_player_assigns_unique_emoji() {
        let (store, players) = store_with_players(&["Alice", "Bob", "Carol"]);

        let emojis: HashSet<&str> = players.iter().map(|p| p.emoji.as_str()).collect();
        assert_eq!(emojis.len(), 3);
        assert!(players.iter().all(|p| !p.emoji.is_empty()));

        let expected = assign_emoji("Alice", players[0].id, &HashSet::new()).unwrap();
        assert_eq!(players[0].emoji, expected);
        assert_eq!(store.players().unwrap(), players);
    }

    #[test]
    fn test_duplicate_name_rejected_by_schema() {
        let (mut store, _) = store_with_players(&["Alice"]);
        assert!(store.insert_player("Alice").is_err());
        assert_eq!(store.players().unwrap().len(), 1);
    }

    #[test]
    fn test_player_lookup() {
        let (store, players) = store_with_players(&["Alice", "Bob"]);
        assert_eq!(store.player(players[1].id).unwrap(), Some(players[1].clone()));
        assert_eq!(store.player(PlayerId(99)).unwrap(), None);
        assert_eq!(store.player_by_name("Alice").unwrap(), Some(players[0].clone()));
        assert_eq!(store.player_by_name("alice").unwrap(), None);
    }

    #[test]
    fn test_insert_game_round_trip() {
        let (mut store, p) = store_with_players(&["A", "B", "C"]);
        let new_game = NewGame::new(day(3), vec![p[2].id, p[0].id, p[1].id], p[0].id, p[1].id)
            .with_created_by("martin");

        let game = store.insert_game(&new_game).unwrap();
        let games = store.games().unwrap();

        assert_eq!(games, vec![game]);
        assert_eq!(games[0].participants, vec![p[2].id, p[0].id, p[1].id]);
        assert_eq!(games[0].created_by.as_deref(), Some("martin"));
        assert_eq!(games[0].played_at, day(3));
    }

    #[test]
    fn test_games_in_log_order() {
        let (mut store, p) = store_with_players(&["A", "B"]);
        let ids = vec![p[0].id, p[1].id];
        for d in [5, 2, 5, 1] {
            store
                .insert_game(&NewGame::new(day(d), ids.clone(), p[0].id, p[1].id))
                .unwrap();
        }

        let order: Vec<(NaiveDate, i64)> = store
            .games()
            .unwrap()
            .iter()
            .map(|g| (g.played_at, g.id.get()))
            .collect();
        assert_eq!(order, vec![(day(1), 4), (day(2), 2), (day(5), 1), (day(5), 3)]);
    }

    #[test]
    fn test_failed_participant_insert_rolls_back() {
        let (mut store, p) = store_with_players(&["A", "B"]);
        // Player 99 does not exist: the foreign key fails after the game row is written
        let bad = NewGame::new(day(1), vec![p[0].id, p[1].id, PlayerId(99)], p[0].id, p[1].id);

        assert!(store.insert_game(&bad).is_err());
        assert_eq!(store.game_count().unwrap(), 0);
        assert!(store.games().unwrap().is_empty());
    }

    #[test]
    fn test_same_winner_and_second_rejected_by_schema() {
        let (mut store, p) = store_with_players(&["A", "B"]);
        let bad = NewGame::new(day(1), vec![p[0].id, p[1].id], p[0].id, p[0].id);

        assert!(store.insert_game(&bad).is_err());
        assert_eq!(store.game_count().unwrap(), 0);
    }

    #[test]
    fn test_blank_created_by_reads_as_none() {
        let (store, p) = store_with_players(&["A", "B"]);
        store
            .conn
            .execute(
                "INSERT INTO games (played_at, winner_id, second_id, created_by) VALUES ('2024-05-01', ?1, ?2, '')",
                params![p[0].id.get(), p[1].id.get()],
            )
            .unwrap();

        let games = store.games().unwrap();
        assert_eq!(games[0].created_by, None);
        assert!(games[0].participants.is_empty());
    }

    #[test]
    fn test_legacy_datetime_played_at() {
        let (store, p) = store_with_players(&["A", "B"]);
        store
            .conn
            .execute(
                "INSERT INTO games (played_at, winner_id, second_id) VALUES ('2024-05-07 00:00:00+00:00', ?1, ?2)",
                params![p[0].id.get(), p[1].id.get()],
            )
            .unwrap();

        let games = store.games().unwrap();
        assert_eq!(games[0].played_at, day(7));
    }

    #[test]
    fn test_legacy_database_gets_emojis() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE players (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
                );
                INSERT INTO players (name) VALUES ('Alice'), ('Bob');",
            )
            .unwrap();
        }

        let mut store = Store::open(&path).unwrap();
        let players = store.players().unwrap();
        assert_eq!(players.len(), 2);
        assert!(players.iter().all(|p| !p.emoji.is_empty()));
        assert_ne!(players[0].emoji, players[1].emoji);

        let expected = assign_emoji("Alice", PlayerId(1), &HashSet::new()).unwrap();
        assert_eq!(players[0].emoji, expected);

        // Nothing left to do on a second pass
        assert_eq!(store.backfill_emojis().unwrap(), 0);
    }

    #[test]
    fn test_backfill_respects_existing_emojis() {
        let (mut store, p) = store_with_players(&["A", "B"]);
        store
            .conn
            .execute("UPDATE players SET emoji = '' WHERE id = ?1", params![p[1].id.get()])
            .unwrap();

        assert_eq!(store.backfill_emojis().unwrap(), 1);
        let players = store.players().unwrap();
        assert_eq!(players[0].emoji, p[0].emoji);
        assert_ne!(players[1].emoji, players[0].emoji);
        assert_eq!(store.used_emojis().unwrap().len(), 2);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("league.db");

        let player = {
            let mut store = Store::open(&path).unwrap();
            store.insert_player("Alice").unwrap()
        };

        let store = Store::open(&path).unwrap();
        assert_eq!(store.players().unwrap(), vec![player]);
    }
}
