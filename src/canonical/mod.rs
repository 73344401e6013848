//! Canonicalizer: normalized records, deterministic serialization, content
//! hash.

pub mod canonicalizer;
pub mod document;

pub use canonicalizer::Canonicalizer;
pub use document::{CanonicalDocument, CanonicalRecord, CanonicalValue};
