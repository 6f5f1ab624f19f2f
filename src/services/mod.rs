//! Service layer for standoff-compare
//!
//! Drivers that sit between the command line and the matching engine:
//! reading sources, pairing documents, and writing converted output.

pub mod compare_service;
pub mod convert_service;
pub mod document_store;
pub mod taxonomy;

// Re-export commonly used types
pub use compare_service::{CompareRun, Document, DocumentFailure, PathKind, RunSummary};
pub use convert_service::{ConvertOptions, Converter, NameLookup};
pub use document_store::{DocumentStore, StoreError};
pub use taxonomy::TaxonomyNames;
