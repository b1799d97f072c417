use crate::error::StoreError;
use crate::store::{by_score_desc, Store};
use crate::Score;
use std::path::Path;

const SETS_TREE: &str = "sets";
const SCORED_TREE: &str = "scored";

/// Durable adapter over a sled database.
///
/// Entries live in two trees, one for sets and one for ordered sets. Each member is its
/// own sled key: the big-endian `u32` length of the logical key, the logical key, then
/// the member bytes. Scores are stored as big-endian `f64` bytes.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    sets: sled::Tree,
    scored: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_db(sled::open(path)?)
    }

    /// A database deleted when the last handle is dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let sets = db.open_tree(SETS_TREE)?;
        let scored = db.open_tree(SCORED_TREE)?;
        Ok(Self { db, sets, scored })
    }
}

fn key_prefix(key: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + key.len());
    buf.extend_from_slice(&(key.len() as u32).to_be_bytes());
    buf.extend_from_slice(key.as_bytes());
    buf
}

fn entry_key(key: &str, member: &str) -> Vec<u8> {
    let mut buf = key_prefix(key);
    buf.extend_from_slice(member.as_bytes());
    buf
}

fn decode_member(key: &str, raw: &[u8], prefix_len: usize) -> Result<String, StoreError> {
    String::from_utf8(raw[prefix_len..].to_vec()).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn decode_score(key: &str, raw: &[u8]) -> Result<Score, StoreError> {
    let bytes: [u8; 8] = raw.try_into().map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        reason: format!("score has {} bytes, expected 8", raw.len()),
    })?;
    Ok(f64::from_be_bytes(bytes))
}

impl Store for SledStore {
    fn add_to_set(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.sets.insert(entry_key(key, member), &[] as &[u8])?;
        Ok(())
    }

    fn remove_from_set(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.sets.remove(entry_key(key, member))?;
        Ok(())
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let prefix = key_prefix(key);
        let mut members = Vec::new();
        for item in self.sets.scan_prefix(&prefix) {
            let (k, _) = item?;
            members.push(decode_member(key, &k, prefix.len())?);
        }
        Ok(members)
    }

    fn set_score(&self, key: &str, member: &str, score: Score) -> Result<(), StoreError> {
        self.scored
            .insert(entry_key(key, member), &score.to_be_bytes()[..])?;
        Ok(())
    }

    fn remove_scored(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.scored.remove(entry_key(key, member))?;
        Ok(())
    }

    fn range_by_score_desc(&self, key: &str) -> Result<Vec<(String, Score)>, StoreError> {
        let prefix = key_prefix(key);
        let mut out = Vec::new();
        for item in self.scored.scan_prefix(&prefix) {
            let (k, v) = item?;
            out.push((decode_member(key, &k, prefix.len())?, decode_score(key, &v)?));
        }
        out.sort_by(by_score_desc);
        Ok(out)
    }

    fn flush(&self) -> Result<(), StoreError> {
        let bytes = self.db.flush()?;
        tracing::debug!(bytes, "flushed sled store");
        Ok(())
    }
}
