//! Index engine abstraction.
//!
//! The [`IndexEngine`] trait is the boundary to the inverted-index storage.
//! The indexing core only hands it finished [`RawDocument`]s and reads them
//! back by identifier; it never inspects how they are stored.
//!
//! [`MemoryEngine`] is the in-process implementation. Within a transaction
//! all writes go to a working copy that replaces the committed state on
//! commit and is dropped on cancel.

use std::collections::BTreeMap;
use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::document::document::DocId;
use crate::document::field_value::FieldValue;
use crate::error::{FalcataError, Result};
use crate::indexing::term::TermSet;
use crate::value::accessor::ValueSet;

/// The persistable form of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Generated terms with weights and positions.
    pub terms: TermSet,
    /// Encoded values by slot.
    pub values: ValueSet,
    /// Opaque payload blob.
    pub data: Vec<u8>,
    /// Field values kept for retrieval.
    pub fields: Vec<(String, FieldValue)>,
}

/// A trait for inverted-index engines the core writes documents to.
pub trait IndexEngine: Send + Sync + fmt::Debug {
    /// Insert a document, returning its newly allocated identifier.
    fn add_document(&mut self, doc: RawDocument) -> Result<DocId>;

    /// Store a document at `id`, replacing any document already there.
    fn replace_document(&mut self, id: DocId, doc: RawDocument) -> Result<()>;

    /// Delete the document at `id`. Fails with `NotFound` when absent.
    fn delete_document(&mut self, id: DocId) -> Result<()>;

    /// Look a document up. Fails with `NotFound` when absent.
    fn document(&self, id: DocId) -> Result<RawDocument>;

    /// Number of stored documents.
    fn doc_count(&self) -> Result<u64>;

    /// Identifiers of the documents indexed under `term`.
    fn term_docs(&self, term: &str) -> Result<Vec<DocId>>;

    /// Increase the spelling-dictionary frequency of `word`.
    fn add_spelling(&mut self, word: &str, freq_inc: u32) -> Result<()>;

    /// Spelling-dictionary frequency of `word`.
    fn spelling_frequency(&self, word: &str) -> Result<u32>;

    /// Start buffering writes.
    fn begin_transaction(&mut self) -> Result<()>;

    /// Apply the buffered writes.
    fn commit_transaction(&mut self) -> Result<()>;

    /// Discard the buffered writes. Identifiers allocated inside the
    /// cancelled transaction are not handed out again.
    fn cancel_transaction(&mut self) -> Result<()>;

    /// Whether a transaction is open.
    fn in_transaction(&self) -> bool;

    /// Make committed writes visible to readers.
    fn flush(&mut self) -> Result<()>;

    /// Get the name of this engine (for debugging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Default)]
struct EngineState {
    documents: BTreeMap<DocId, RawDocument>,
    last_id: DocId,
    spellings: AHashMap<String, u32>,
}

/// An in-memory index engine.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    committed: EngineState,
    transaction: Option<EngineState>,
    flushes: u64,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flushes performed.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    fn state(&self) -> &EngineState {
        self.transaction.as_ref().unwrap_or(&self.committed)
    }

    fn state_mut(&mut self) -> &mut EngineState {
        match &mut self.transaction {
            Some(state) => state,
            None => &mut self.committed,
        }
    }
}

impl IndexEngine for MemoryEngine {
    fn add_document(&mut self, doc: RawDocument) -> Result<DocId> {
        let state = self.state_mut();
        let id = state
            .last_id
            .checked_add(1)
            .ok_or_else(|| FalcataError::index("document identifiers exhausted"))?;
        state.last_id = id;
        state.documents.insert(id, doc);
        Ok(id)
    }

    fn replace_document(&mut self, id: DocId, doc: RawDocument) -> Result<()> {
        if id == 0 {
            return Err(FalcataError::invalid_argument("document id 0"));
        }
        let state = self.state_mut();
        state.last_id = state.last_id.max(id);
        state.documents.insert(id, doc);
        Ok(())
    }

    fn delete_document(&mut self, id: DocId) -> Result<()> {
        match self.state_mut().documents.remove(&id) {
            Some(_) => Ok(()),
            None => Err(FalcataError::not_found(format!("document {id}"))),
        }
    }

    fn document(&self, id: DocId) -> Result<RawDocument> {
        self.state()
            .documents
            .get(&id)
            .cloned()
            .ok_or_else(|| FalcataError::not_found(format!("document {id}")))
    }

    fn doc_count(&self) -> Result<u64> {
        Ok(self.state().documents.len() as u64)
    }

    fn term_docs(&self, term: &str) -> Result<Vec<DocId>> {
        Ok(self
            .state()
            .documents
            .iter()
            .filter(|(_, doc)| doc.terms.contains(term))
            .map(|(id, _)| *id)
            .collect())
    }

    fn add_spelling(&mut self, word: &str, freq_inc: u32) -> Result<()> {
        let freq = self
            .state_mut()
            .spellings
            .entry(word.to_string())
            .or_insert(0);
        *freq = freq.saturating_add(freq_inc);
        Ok(())
    }

    fn spelling_frequency(&self, word: &str) -> Result<u32> {
        Ok(self.state().spellings.get(word).copied().unwrap_or(0))
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            return Err(FalcataError::index("transaction already in progress"));
        }
        self.transaction = Some(self.committed.clone());
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        match self.transaction.take() {
            Some(state) => {
                self.committed = state;
                Ok(())
            }
            None => Err(FalcataError::index("no transaction in progress")),
        }
    }

    fn cancel_transaction(&mut self) -> Result<()> {
        match self.transaction.take() {
            Some(state) => {
                self.committed.last_id = self.committed.last_id.max(state.last_id);
                Ok(())
            }
            None => Err(FalcataError::index("no transaction in progress")),
        }
    }

    fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    fn flush(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            return Err(FalcataError::concurrent_mutation(
                "cannot flush while a transaction is in progress",
            ));
        }
        self.flushes += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
