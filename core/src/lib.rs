//! Full-text indexing and boolean retrieval on top of an ordered key-value store.
//!
//! Documents are tokenized into terms and written to two structures kept in the
//! store: a forward entry per document (`{namespace}:doc:{id}` → set of terms) and an
//! inverted entry per term (`{namespace}:term:{term}` → document ids scored by term
//! frequency). Queries combine inverted entries with AND/OR semantics.

pub mod client;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use client::{Client, DEFAULT_NAMESPACE};
pub use error::{Error, ParseOperatorError, StoreError};
pub use persist::SledStore;
pub use query::Operator;
pub use store::{MemoryStore, Store};

/// Caller supplied document identifier.
pub type DocId = String;

/// Relevance score attached to a posting.
pub type Score = f64;

/// One entry of an inverted entry: a document and its score for the term.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub score: Score,
}

impl From<(String, f64)> for Posting {
    fn from((doc_id, score): (String, f64)) -> Self {
        Self { doc_id, score }
    }
}
