//! Index module.
//!
//! The index ties a configuration, the shared language resources and the
//! value codecs to an [`engine::IndexEngine`] that stores documents.

pub mod config;
pub mod engine;
#[allow(clippy::module_inception)]
pub mod index;

pub use config::{IndexConfig, WeightsFunction};
pub use engine::{IndexEngine, MemoryEngine, RawDocument};
pub use index::{Documents, Index, IndexBuilder};
