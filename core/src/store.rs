use crate::error::StoreError;
use crate::Score;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Set and ordered-set primitives the index is composed from.
///
/// A set or ordered set without members does not exist: reading it yields an empty
/// sequence, and removing its last member deletes it. Every call is independent; no
/// adapter call spans more than one key, so multi-key operations built on top are not
/// atomic.
pub trait Store {
    fn add_to_set(&self, key: &str, member: &str) -> Result<(), StoreError>;
    fn remove_from_set(&self, key: &str, member: &str) -> Result<(), StoreError>;
    fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Insert `member` with `score`, replacing any previous score.
    fn set_score(&self, key: &str, member: &str, score: Score) -> Result<(), StoreError>;
    fn remove_scored(&self, key: &str, member: &str) -> Result<(), StoreError>;
    /// All members ordered by score descending, ties by member bytes descending.
    fn range_by_score_desc(&self, key: &str) -> Result<Vec<(String, Score)>, StoreError>;

    /// Make previous writes durable. Adapters without buffering do nothing.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for &S {
    fn add_to_set(&self, key: &str, member: &str) -> Result<(), StoreError> {
        (**self).add_to_set(key, member)
    }
    fn remove_from_set(&self, key: &str, member: &str) -> Result<(), StoreError> {
        (**self).remove_from_set(key, member)
    }
    fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        (**self).set_members(key)
    }
    fn set_score(&self, key: &str, member: &str, score: Score) -> Result<(), StoreError> {
        (**self).set_score(key, member, score)
    }
    fn remove_scored(&self, key: &str, member: &str) -> Result<(), StoreError> {
        (**self).remove_scored(key, member)
    }
    fn range_by_score_desc(&self, key: &str) -> Result<Vec<(String, Score)>, StoreError> {
        (**self).range_by_score_desc(key)
    }
    fn flush(&self) -> Result<(), StoreError> {
        (**self).flush()
    }
}

/// Ordering used by [`Store::range_by_score_desc`].
pub fn by_score_desc(a: &(String, Score), b: &(String, Score)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0))
}

/// In-process adapter. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: RwLock<HashMap<String, BTreeSet<String>>>,
    scored: RwLock<HashMap<String, HashMap<String, Score>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every live key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .sets
            .read()
            .keys()
            .chain(self.scored.read().keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl Store for MemoryStore {
    fn add_to_set(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.sets
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    fn remove_from_set(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut sets = self.sets.write();
        if let Some(set) = sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                sets.remove(key);
            }
        }
        Ok(())
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .sets
            .read()
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn set_score(&self, key: &str, member: &str, score: Score) -> Result<(), StoreError> {
        self.scored
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    fn remove_scored(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut scored = self.scored.write();
        if let Some(entry) = scored.get_mut(key) {
            entry.remove(member);
            if entry.is_empty() {
                scored.remove(key);
            }
        }
        Ok(())
    }

    fn range_by_score_desc(&self, key: &str) -> Result<Vec<(String, Score)>, StoreError> {
        let mut out: Vec<(String, Score)> = self
            .scored
            .read()
            .get(key)
            .map(|entry| entry.iter().map(|(m, s)| (m.clone(), *s)).collect())
            .unwrap_or_default();
        out.sort_by(by_score_desc);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_disappears() {
        let store = MemoryStore::new();
        store.add_to_set("s", "a").unwrap();
        store.add_to_set("s", "a").unwrap();
        assert_eq!(store.set_members("s").unwrap(), vec!["a"]);
        store.remove_from_set("s", "a").unwrap();
        assert!(store.set_members("s").unwrap().is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn scores_overwrite_and_order() {
        let store = MemoryStore::new();
        store.set_score("z", "1", 5.0).unwrap();
        store.set_score("z", "1", 1.0).unwrap();
        store.set_score("z", "2", 1.0).unwrap();
        store.set_score("z", "3", 2.0).unwrap();
        let range = store.range_by_score_desc("z").unwrap();
        assert_eq!(
            range,
            vec![("3".to_string(), 2.0), ("2".to_string(), 1.0), ("1".to_string(), 1.0)]
        );
        store.remove_scored("z", "1").unwrap();
        store.remove_scored("z", "2").unwrap();
        store.remove_scored("z", "3").unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn missing_keys_read_empty() {
        let store = MemoryStore::new();
        assert!(store.set_members("nope").unwrap().is_empty());
        assert!(store.range_by_score_desc("nope").unwrap().is_empty());
        store.remove_from_set("nope", "x").unwrap();
        store.remove_scored("nope", "x").unwrap();
    }
}
