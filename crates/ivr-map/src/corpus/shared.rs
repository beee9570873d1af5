//! Single-writer handle over an [`AliasCorpus`].

use std::sync::{Arc, RwLock, RwLockReadGuard};

use super::{AliasCorpus, AliasEntry, AliasUpdate};
use crate::error::{ConfigurationError, Result};

/// A corpus shared between concurrent resolution calls.
///
/// Readers hold the read guard for a whole resolution call so the corpus
/// cannot change underneath them. Appends take the write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedAliasCorpus {
    inner: Arc<RwLock<AliasCorpus>>,
}

impl SharedAliasCorpus {
    pub fn new(corpus: AliasCorpus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(corpus)),
        }
    }

    /// Read access for the duration of the guard.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, AliasCorpus>> {
        self.inner
            .read()
            .map_err(|_| ConfigurationError::CorpusUnavailable)
    }

    /// Appends one entry under the write lock.
    pub fn append(&self, entry: AliasEntry) -> Result<AliasUpdate> {
        let mut corpus = self
            .inner
            .write()
            .map_err(|_| ConfigurationError::CorpusUnavailable)?;
        corpus.append(entry)
    }

    /// A point-in-time copy.
    pub fn snapshot(&self) -> Result<AliasCorpus> {
        Ok(self.read()?.clone())
    }
}

impl From<AliasCorpus> for SharedAliasCorpus {
    fn from(corpus: AliasCorpus) -> Self {
        Self::new(corpus)
    }
}
