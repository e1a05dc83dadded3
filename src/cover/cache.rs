use iced::widget::image::Handle;
use std::collections::{HashMap, HashSet};

use crate::state::data::GameEntry;

/// Identity of a rendered card.
/// The image path is part of the key so a reused game ID never shows a stale cover.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub game_id: i64,
    pub image_path: String,
}

impl CardKey {
    pub fn of(game: &GameEntry) -> Self {
        Self {
            game_id: game.id,
            image_path: game.image_path.clone(),
        }
    }
}

/// Decoded covers for the cards currently in the grid.
///
/// Entries live as long as their card: every grid reload calls
/// [`CoverCache::retain_cards`], which releases covers of cards that are gone.
#[derive(Debug, Default)]
pub struct CoverCache {
    covers: HashMap<CardKey, Handle>,
    /// Covers requested but not yet delivered
    pending: HashSet<CardKey>,
}

impl CoverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CardKey) -> Option<&Handle> {
        self.covers.get(key)
    }

    pub fn len(&self) -> usize {
        self.covers.len()
    }

    #[cfg(test)]
    pub fn is_pending(&self, key: &CardKey) -> bool {
        self.pending.contains(key)
    }

    /// Drop covers (and pending requests) of cards not in `games`.
    /// Returns how many decoded covers were released.
    pub fn retain_cards(&mut self, games: &[GameEntry]) -> usize {
        let shown: HashSet<CardKey> = games.iter().map(CardKey::of).collect();

        let before = self.covers.len();
        self.covers.retain(|key, _| shown.contains(key));
        self.pending.retain(|key| shown.contains(key));

        let released = before - self.covers.len();
        if released > 0 {
            log::debug!("Released {} covers", released);
        }
        released
    }

    /// Mark every card without a cover as pending and return their keys.
    /// Cards already loaded or in flight are skipped.
    pub fn begin_loads(&mut self, games: &[GameEntry]) -> Vec<CardKey> {
        let mut keys = Vec::new();
        for game in games {
            let key = CardKey::of(game);
            if self.covers.contains_key(&key) || self.pending.contains(&key) {
                continue;
            }
            self.pending.insert(key.clone());
            keys.push(key);
        }
        keys
    }

    /// Store a delivered cover if its card is still shown.
    /// Returns false when the cover arrived too late and was dropped.
    pub fn finish(&mut self, key: CardKey, handle: Handle, games: &[GameEntry]) -> bool {
        self.pending.remove(&key);

        if games.iter().any(|game| CardKey::of(game) == key) {
            self.covers.insert(key, handle);
            true
        } else {
            log::debug!("Dropping cover for card {} that is no longer shown", key.game_id);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: i64, path: &str) -> GameEntry {
        GameEntry {
            id,
            title: format!("Game {}", id),
            image_path: path.to_string(),
            developer_name: None,
        }
    }

    fn handle() -> Handle {
        Handle::from_rgba(1, 1, vec![0u8, 0, 0, 255])
    }

    #[test]
    fn test_begin_loads_skips_known_cards() {
        let mut cache = CoverCache::new();
        let games = vec![game(1, "a.png"), game(2, "b.png")];

        let keys = cache.begin_loads(&games);
        assert_eq!(keys.len(), 2);
        assert!(cache.is_pending(&keys[0]));

        // Already in flight
        assert!(cache.begin_loads(&games).is_empty());

        assert!(cache.finish(keys[0].clone(), handle(), &games));
        assert!(!cache.is_pending(&keys[0]));
        assert!(cache.get(&keys[0]).is_some());

        // Loaded and in flight
        assert!(cache.begin_loads(&games).is_empty());
    }

    #[test]
    fn test_retain_releases_removed_cards() {
        let mut cache = CoverCache::new();
        let games = vec![game(1, "a.png"), game(2, "b.png"), game(3, "c.png")];

        for key in cache.begin_loads(&games) {
            cache.finish(key, handle(), &games);
        }
        assert_eq!(cache.len(), 3);

        let remaining = vec![games[0].clone(), games[2].clone()];
        assert_eq!(cache.retain_cards(&remaining), 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&CardKey::of(&games[1])).is_none());
    }

    #[test]
    fn test_late_cover_is_dropped() {
        let mut cache = CoverCache::new();
        let games = vec![game(1, "a.png")];
        let keys = cache.begin_loads(&games);

        // The game is removed before its cover arrives
        cache.retain_cards(&[]);
        assert!(!cache.is_pending(&keys[0]));

        assert!(!cache.finish(keys[0].clone(), handle(), &[]));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_reused_id_with_new_path_reloads() {
        let mut cache = CoverCache::new();
        let old = vec![game(5, "old.png")];
        for key in cache.begin_loads(&old) {
            cache.finish(key, handle(), &old);
        }

        let new = vec![game(5, "new.png")];
        cache.retain_cards(&new);
        assert_eq!(cache.len(), 0);

        let keys = cache.begin_loads(&new);
        assert_eq!(keys, vec![CardKey::of(&new[0])]);
    }
}
