pub mod identifiers;

pub use identifiers::{CanonicalKey, ContentHash, KeyError};
