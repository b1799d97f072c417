use crate::error::Error;
use crate::index::{index_document, remove_document};
use crate::query::{evaluate, Operator};
use crate::store::Store;
use crate::DocId;

/// Namespace used when a client is created with an empty one.
pub const DEFAULT_NAMESPACE: &str = "termstore";

/// Store key layout for one namespace.
#[derive(Debug, Clone)]
pub(crate) struct Keys {
    namespace: String,
}

impl Keys {
    pub(crate) fn new(namespace: &str) -> Self {
        let namespace = if namespace.is_empty() { DEFAULT_NAMESPACE } else { namespace };
        Self { namespace: namespace.to_string() }
    }

    pub(crate) fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Forward entry of a document.
    pub(crate) fn doc(&self, id: &str) -> String {
        format!("{}:doc:{}", self.namespace, id)
    }

    /// Inverted entry of a term.
    pub(crate) fn term(&self, term: &str) -> String {
        format!("{}:term:{}", self.namespace, term)
    }
}

/// A store connection bound to a namespace.
///
/// Operations are plain sequences of store calls. Nothing is locked, so concurrent
/// `index`/`remove` calls on the same id may interleave; `query` never writes.
#[derive(Debug, Clone)]
pub struct Client<S> {
    store: S,
    keys: Keys,
}

impl<S: Store> Client<S> {
    /// Bind `store` to `namespace`; an empty namespace means [`DEFAULT_NAMESPACE`].
    pub fn new(store: S, namespace: impl AsRef<str>) -> Self {
        Self { store, keys: Keys::new(namespace.as_ref()) }
    }

    pub fn namespace(&self) -> &str {
        self.keys.namespace()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Index `text` under `id`, replacing whatever was indexed for `id` before.
    ///
    /// On failure the index may be partially updated; repeating the call converges.
    pub fn index(&self, text: &str, id: &str) -> Result<(), Error> {
        index_document(&self.store, &self.keys, text, id)
    }

    /// Index documents in order, stopping at the first failure. Returns how many were
    /// indexed.
    pub fn index_batch<'a, I>(&self, docs: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut count = 0;
        for (id, text) in docs {
            self.index(text, id)?;
            count += 1;
        }
        tracing::info!(namespace = self.namespace(), count, "indexed batch");
        Ok(count)
    }

    /// Remove `id` from the index. Unknown ids are a no-op.
    pub fn remove(&self, id: &str) -> Result<(), Error> {
        remove_document(&self.store, &self.keys, id)?;
        Ok(())
    }

    /// Document ids matching `text` under `op`, best first.
    pub fn query(&self, text: &str, op: Operator) -> Result<Vec<DocId>, Error> {
        Ok(evaluate(&self.store, &self.keys, text, op)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    /// Terms currently indexed for `id`, sorted. Empty when `id` is unknown.
    pub fn document_terms(&self, id: &str) -> Result<Vec<String>, Error> {
        let mut terms = self.store.set_members(&self.keys.doc(id))?;
        terms.sort();
        Ok(terms)
    }

    pub fn flush(&self) -> Result<(), Error> {
        self.store.flush()?;
        Ok(())
    }
}
