//! The index handle.
//!
//! An [`Index`] bundles the policy ([`IndexConfig`]), the language
//! resources, the value codecs and the engine that stores documents. It is
//! cheap to clone; clones share the same engine and transaction state.
//!
//! All writes go through one engine lock, so value and term regeneration
//! followed by the engine write happen as one step. [`Index::transaction`]
//! groups several writes into an all-or-nothing unit.
//!
//! # Example
//!
//! ```
//! use falcata::index::config::IndexConfig;
//! use falcata::index::index::Index;
//!
//! let index = Index::new(IndexConfig::default()).unwrap();
//! let doc = index.add_doc("Rust makes fearless concurrency possible").unwrap();
//!
//! assert_eq!(index.size().unwrap(), 1);
//! assert!(index.documents().get(doc.id().unwrap()).unwrap().is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashSet;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::analysis::resources::{ResourceCache, StemmerChoice};
use crate::document::document::{DocId, Document, SearchHit};
use crate::document::field_value::FieldValue;
use crate::error::{FalcataError, Result};
use crate::index::config::IndexConfig;
use crate::index::engine::{IndexEngine, MemoryEngine, RawDocument};
use crate::indexing::generator::TermGenerator;
use crate::indexing::term::GeneratedTerm;
use crate::value::accessor::ValueSet;
use crate::value::codec::CodecRegistry;
use crate::value::slot::{ValueSlot, slot_for_name};

struct IndexInner {
    uuid: Uuid,
    config: IndexConfig,
    resources: Arc<ResourceCache>,
    codecs: CodecRegistry,
    engine: Mutex<Box<dyn IndexEngine>>,
    in_transaction: AtomicBool,
    allocated: Mutex<AllocatedIds>,
}

/// Identifiers the engine allocated inside the running transaction, and
/// those whose transaction was cancelled. A document still carrying a
/// cancelled identifier is inserted afresh on its next save.
#[derive(Debug, Default)]
struct AllocatedIds {
    pending: Vec<DocId>,
    cancelled: AHashSet<DocId>,
}

/// A handle on a document index.
#[derive(Clone)]
pub struct Index {
    inner: Arc<IndexInner>,
}

/// Builder for [`Index`] with a non-default engine, resources or codecs.
pub struct IndexBuilder {
    config: IndexConfig,
    engine: Option<Box<dyn IndexEngine>>,
    resources: Option<Arc<ResourceCache>>,
    codecs: CodecRegistry,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        IndexBuilder {
            config,
            engine: None,
            resources: None,
            codecs: CodecRegistry::new(),
        }
    }

    /// Store documents in `engine` instead of a fresh [`MemoryEngine`].
    pub fn engine(mut self, engine: Box<dyn IndexEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Use an explicit resource cache.
    pub fn resources(mut self, resources: Arc<ResourceCache>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Use `codecs` to encode stored values.
    pub fn codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// Validate the configuration and open the index.
    pub fn build(self) -> Result<Index> {
        for spec in &self.config.fields {
            if spec.name.is_empty() {
                return Err(FalcataError::field("field name must not be empty"));
            }
        }

        let resources = match (self.resources, &self.config.resource_dir) {
            (Some(resources), _) => resources,
            (None, Some(dir)) => Arc::new(ResourceCache::new(dir)),
            (None, None) => ResourceCache::global(),
        };

        // Unknown index-level languages fail here rather than on first write.
        let stemmer = match &self.config.stemmer {
            Some(choice) => choice.clone(),
            None => StemmerChoice::from(self.config.language.as_str()),
        };
        resources.resolve_stemmer(&stemmer)?;

        let engine = self
            .engine
            .unwrap_or_else(|| Box::new(MemoryEngine::new()));
        let uuid = Uuid::new_v4();
        log::debug!("opened index {uuid} on {} engine", engine.name());

        Ok(Index {
            inner: Arc::new(IndexInner {
                uuid,
                config: self.config,
                resources,
                codecs: self.codecs,
                engine: Mutex::new(engine),
                in_transaction: AtomicBool::new(false),
                allocated: Mutex::new(AllocatedIds::default()),
            }),
        })
    }
}

impl Index {
    /// Open an in-memory index with `config`.
    pub fn new(config: IndexConfig) -> Result<Self> {
        IndexBuilder::new(config).build()
    }

    /// Open an index over an existing engine.
    pub fn with_engine(config: IndexConfig, engine: Box<dyn IndexEngine>) -> Result<Self> {
        IndexBuilder::new(config).engine(engine).build()
    }

    pub fn builder(config: IndexConfig) -> IndexBuilder {
        IndexBuilder::new(config)
    }

    /// Identity of this index. Documents from different indexes never compare equal.
    pub fn uuid(&self) -> Uuid {
        self.inner.uuid
    }

    pub fn config(&self) -> &IndexConfig {
        &self.inner.config
    }

    pub fn resources(&self) -> &Arc<ResourceCache> {
        &self.inner.resources
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.inner.codecs
    }

    /// Whether a transaction is running on this index.
    pub fn in_transaction(&self) -> bool {
        self.inner.in_transaction.load(Ordering::Acquire)
    }

    /// Save a document, inserting it or replacing it depending on whether
    /// it already has an identifier, and return it bound to this index.
    pub fn add_doc<D: Into<Document>>(&self, doc: D) -> Result<Document> {
        let mut doc = doc.into();
        self.save(&mut doc)?;
        Ok(doc)
    }

    /// Regenerate `doc`'s values and terms and write it to the engine.
    ///
    /// The identifier allocated by the engine is assigned to `doc`. An
    /// identifier allocated inside a transaction that was later cancelled
    /// never pointed at a stored document, so such a document is inserted
    /// again under a new identifier.
    pub fn save(&self, doc: &mut Document) -> Result<DocId> {
        doc.bind(self);
        let mut engine = self.inner.engine.lock();
        if let Some(id) = doc.id() {
            if self.inner.allocated.lock().cancelled.contains(&id) {
                log::debug!("document id {id} was rolled back, inserting as new");
                doc.clear_id();
            }
        }
        let spellings = self.generate(doc)?;

        let raw = RawDocument {
            terms: doc.generated_terms().clone(),
            values: doc.values().clone(),
            data: doc.data().to_vec(),
            fields: doc
                .fields()
                .filter(|(name, _)| self.inner.config.is_stored(name))
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        };

        let id = match doc.id() {
            Some(id) => {
                engine.replace_document(id, raw)?;
                id
            }
            None => {
                let id = engine.add_document(raw)?;
                if engine.in_transaction() {
                    self.inner.allocated.lock().pending.push(id);
                }
                id
            }
        };
        doc.assign_id(id);

        if self.inner.config.spelling {
            for (word, freq) in &spellings {
                engine.add_spelling(word, *freq)?;
            }
        }

        log::debug!(
            "saved document {id} ({} terms, {} values)",
            doc.generated_terms().len(),
            doc.values().len()
        );
        Ok(id)
    }

    /// Rebuild `doc`'s stored values and terms from this index's policy.
    ///
    /// Repeating this without changing the document's fields gives the
    /// same result.
    pub fn regenerate(&self, doc: &mut Document) -> Result<()> {
        self.generate(doc).map(|_| ())
    }

    fn generate(&self, doc: &mut Document) -> Result<BTreeMap<String, u32>> {
        let config = &self.inner.config;

        let mut values = ValueSet::new();
        for name in config.value_fields() {
            let value = doc.get_field(name).cloned().unwrap_or(FieldValue::Null);
            match self
                .inner
                .codecs
                .store(&ValueSlot::from(name), &value, config.field_type(name))
            {
                Ok(stored) => {
                    values.insert(stored);
                }
                Err(FalcataError::ValueType(msg)) => {
                    log::warn!("not storing value of field {name:?}: {msg}");
                }
                Err(e) => return Err(e),
            }
        }

        let generated =
            TermGenerator::for_document(config, &self.inner.resources, doc)?.generate(doc)?;
        doc.set_generated(generated.terms, values);
        Ok(generated.spellings)
    }

    /// Access the stored documents.
    pub fn documents(&self) -> Documents<'_> {
        Documents { index: self }
    }

    /// Number of stored documents.
    pub fn size(&self) -> Result<u64> {
        self.inner.engine.lock().doc_count()
    }

    /// Run `f` as one all-or-nothing unit.
    ///
    /// Writes made by `f` become visible only when it returns `Ok`. When it
    /// returns an error (or panics) every write is discarded and the error
    /// is returned unchanged. Starting a transaction while one is running
    /// on the same index fails with [`FalcataError::ConcurrentMutation`].
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Index) -> Result<T>,
    {
        if self
            .inner
            .in_transaction
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FalcataError::concurrent_mutation(format!(
                "a transaction is already running on index {}",
                self.inner.uuid
            )));
        }

        let mut guard = TransactionGuard {
            index: self,
            active: false,
        };
        self.inner.engine.lock().begin_transaction()?;
        guard.active = true;
        log::debug!("began transaction on index {}", self.inner.uuid);

        let value = f(self)?;

        self.inner.engine.lock().commit_transaction()?;
        guard.active = false;
        self.inner.allocated.lock().pending.clear();
        log::debug!("committed transaction on index {}", self.inner.uuid);
        Ok(value)
    }

    /// Make committed writes visible to readers.
    pub fn flush(&self) -> Result<()> {
        if self.in_transaction() {
            return Err(FalcataError::concurrent_mutation(
                "cannot flush while a transaction is running",
            ));
        }
        self.inner.engine.lock().flush()
    }

    /// Slot of a sortable or collapsible field.
    pub fn value_slot(&self, name: &str) -> Option<u32> {
        self.inner
            .config
            .value_fields()
            .contains(&name)
            .then(|| slot_for_name(name))
    }

    /// Terms stored for document `id`.
    pub fn stored_terms(&self, id: DocId) -> Result<Vec<GeneratedTerm>> {
        let raw = self.inner.engine.lock().document(id)?;
        Ok(raw.terms.iter().collect())
    }

    /// Decode the value of `field` from `values` with the field's declared codec.
    pub fn fetch_value(&self, values: &ValueSet, field: &str) -> Result<FieldValue> {
        self.inner.codecs.fetch(
            values,
            &ValueSlot::from(field),
            self.inner.config.field_type(field),
        )
    }

    /// Identifiers of the documents indexed under `term`.
    pub fn term_docs(&self, term: &str) -> Result<Vec<DocId>> {
        self.inner.engine.lock().term_docs(term)
    }

    /// Spelling-dictionary frequency of `word`.
    pub fn spelling_frequency(&self, word: &str) -> Result<u32> {
        self.inner.engine.lock().spelling_frequency(word)
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("uuid", &self.inner.uuid)
            .field("language", &self.inner.config.language)
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}

struct TransactionGuard<'a> {
    index: &'a Index,
    active: bool,
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        let inner = &self.index.inner;
        if self.active {
            match inner.engine.lock().cancel_transaction() {
                Ok(()) => log::debug!("cancelled transaction on index {}", inner.uuid),
                Err(e) => log::warn!("failed to cancel transaction on index {}: {e}", inner.uuid),
            }
            let mut allocated = inner.allocated.lock();
            let AllocatedIds { pending, cancelled } = &mut *allocated;
            cancelled.extend(pending.drain(..));
        }
        inner.in_transaction.store(false, Ordering::Release);
    }
}

/// Lookup and removal of stored documents.
pub struct Documents<'a> {
    index: &'a Index,
}

impl Documents<'_> {
    /// Load document `id`, failing with [`FalcataError::NotFound`] when absent.
    pub fn find(&self, id: DocId) -> Result<Document> {
        let raw = self.index.inner.engine.lock().document(id)?;
        Ok(Document::from_stored(
            self.index, id, raw.fields, raw.data, raw.values,
        ))
    }

    /// Load document `id`, or `None` when absent.
    pub fn get(&self, id: DocId) -> Result<Option<Document>> {
        match self.find(id) {
            Ok(doc) => Ok(Some(doc)),
            Err(FalcataError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete document `id`, returning the identifier or `None` when absent.
    pub fn delete(&self, id: DocId) -> Result<Option<DocId>> {
        match self.index.inner.engine.lock().delete_document(id) {
            Ok(()) => Ok(Some(id)),
            Err(FalcataError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load the document a search hit refers to, carrying the hit's weight.
    pub fn from_hit(&self, hit: &SearchHit) -> Result<Document> {
        let mut doc = self.find(hit.id)?;
        doc.set_weight(hit.weight);
        Ok(doc)
    }
}
