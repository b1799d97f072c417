//! Forward and inverted index maintenance: indexing and removal of documents.

use crate::client::Keys;
use crate::error::Error;
use crate::store::Store;
use crate::tokenizer::tokenize;
use crate::Score;
use std::collections::BTreeMap;

/// Term frequencies of `text`.
pub fn term_frequencies(text: &str) -> BTreeMap<String, u32> {
    let mut tf: BTreeMap<String, u32> = BTreeMap::new();
    for term in tokenize(text) {
        *tf.entry(term).or_insert(0) += 1;
    }
    tf
}

/// Posting score for a term seen `tf` times in a document.
pub fn score(tf: u32) -> Score {
    tf as Score
}

/// Index or re-index `id`. Scores overwrite earlier ones; terms absent from the new text
/// lose their postings for `id`.
///
/// At every intermediate step the forward entry lists at least the terms that hold a
/// posting for `id`, so an interrupted call is repaired by repeating it or by removal.
pub(crate) fn index_document<S: Store + ?Sized>(
    store: &S,
    keys: &Keys,
    text: &str,
    id: &str,
) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::Validation("document id must not be empty".into()));
    }
    let tf = term_frequencies(text);
    let doc_key = keys.doc(id);

    let previous = store.set_members(&doc_key)?;
    let stale: Vec<&String> = previous.iter().filter(|t| !tf.contains_key(*t)).collect();

    for term in tf.keys() {
        store.add_to_set(&doc_key, term)?;
    }
    for term in &stale {
        store.remove_scored(&keys.term(term), id)?;
    }
    for (term, count) in &tf {
        store.set_score(&keys.term(term), id, score(*count))?;
    }
    for term in &stale {
        store.remove_from_set(&doc_key, term)?;
    }

    tracing::debug!(namespace = keys.namespace(), id, terms = tf.len(), stale = stale.len(), "indexed document");
    Ok(())
}

/// Remove every posting and the forward entry of `id`. Returns false when `id` was not
/// indexed.
pub(crate) fn remove_document<S: Store + ?Sized>(
    store: &S,
    keys: &Keys,
    id: &str,
) -> Result<bool, Error> {
    let doc_key = keys.doc(id);
    let terms = store.set_members(&doc_key)?;
    if terms.is_empty() {
        tracing::debug!(namespace = keys.namespace(), id, "remove of unknown document");
        return Ok(false);
    }
    for term in &terms {
        store.remove_scored(&keys.term(term), id)?;
    }
    for term in &terms {
        store.remove_from_set(&doc_key, term)?;
    }
    tracing::debug!(namespace = keys.namespace(), id, terms = terms.len(), "removed document");
    Ok(true)
}
