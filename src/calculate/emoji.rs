//! Deterministic emoji assignment for new players.
//!
//! Each player gets an emoji from a fixed pool. The scan starts at an offset
//! derived from an FNV-1a hash of the name and id, so players spread across the
//! pool instead of filling it in order, and the same inputs always give the
//! same emoji (backfills are idempotent).

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

use crate::models::PlayerId;

/// Candidate emojis, in scan order.
pub const EMOJI_POOL: [&str; 110] = [
    "🦄", "🐍", "🦁", "🐯", "🐺", "🦊", "🐼", "🐻", "🐨", "🐮",
    "🐷", "🐸", "🐵", "🦍", "🦝", "🦓", "🦒", "🦛", "🦘", "🐙",
    "🦑", "🦀", "🦞", "🦐", "🐠", "🐬", "🐳", "🐊", "🦈", "🦚",
    "🦜", "🦢", "🦩", "🦉", "🦅", "🦆", "🐧", "🐤", "🐝", "🌳",
    "🪲", "🦋", "🐞", "🐌", "🐢", "🐇", "🐿", "🦔", "🦥", "🍕",
    "🍔", "🍟", "🌭", "🍿", "🧃", "🍪", "🎂", "🍊", "⚽", "🏀",
    "🏈", "⚾", "🎾", "🏒", "🏓", "🚗", "🚕", "🚌", "🚓", "🚑",
    "✈", "🛸", "👔", "🧤", "🧣", "👞", "🎸", "🎹", "🎺", "🎻",
    "🥁", "🎤", "🎧", "🎵", "🌙", "🌈", "🔥", "💧", "🎮", "🎯",
    "🎲", "🦖", "🦫", "🌸", "🧬", "🦕", "🐉", "🦗", "🕷", "🦂",
    "🦟", "🦠", "🌼", "🌴", "🌲", "🌺", "🌻", "🌷", "🤿", "🍳",
];

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Errors from emoji assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmojiError {
    #[error("emoji pool is empty")]
    EmptyPool,
}

/// Pick an emoji from the shipped pool for a player.
///
/// Returns the first emoji not in `used`, scanning from the hashed offset and
/// wrapping around. If every emoji is taken, the emoji at the offset is reused.
pub fn assign_emoji(
    name: &str,
    id: PlayerId,
    used: &HashSet<String>,
) -> Result<&'static str, EmojiError> {
    pick_from_pool(&EMOJI_POOL, name, id, used)
}

/// Same as [`assign_emoji`] over an arbitrary pool.
pub fn pick_from_pool<'p>(
    pool: &[&'p str],
    name: &str,
    id: PlayerId,
    used: &HashSet<String>,
) -> Result<&'p str, EmojiError> {
    if pool.is_empty() {
        return Err(EmojiError::EmptyPool);
    }

    let start = start_offset(name, id, pool.len());
    let free = (0..pool.len())
        .map(|i| pool[(start + i) % pool.len()])
        .find(|emoji| !used.contains(*emoji));

    Ok(free.unwrap_or_else(|| {
        warn!(name, %id, "Emoji pool exhausted, reusing {}", pool[start]);
        pool[start]
    }))
}

/// Scan start for a player: `fnv1a32(name ++ 0x00 ++ id) mod pool_len`.
///
/// Must stay byte-for-byte compatible with the emojis already stored in
/// existing databases, or backfills would hand out different emojis.
pub fn start_offset(name: &str, id: PlayerId, pool_len: usize) -> usize {
    let mut hash = fnv1a32(FNV_OFFSET_BASIS, name.as_bytes());
    hash = fnv1a32(hash, &[0]);
    hash = fnv1a32(hash, id.to_string().as_bytes());
    (hash % pool_len as u32) as usize
}

fn fnv1a32(mut hash: u32, bytes: &[u8]) -> u32 {
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
