//! Document module.
//!
//! This module provides the document model fed into the indexing pipeline.
//!
//! # Core Components
//!
//! - [`document::Document`] - Ordered field values, payload blob and identity
//! - [`field_value::FieldValue`] - The value held by a field
//! - [`field::FieldSpec`] - Field declarations and their classification flags
//!
//! # Examples
//!
//! ```
//! use falcata::document::document::Document;
//!
//! let doc = Document::builder()
//!     .add_text("title", "Rust Programming Guide")
//!     .add_text("author", "Jane Doe")
//!     .add_integer("year", 2024)
//!     .build();
//!
//! assert_eq!(doc.len(), 3);
//! assert!(doc.has_field("title"));
//! assert!(doc.id().is_none());
//! ```

pub mod document;
pub mod field;
pub mod field_value;
