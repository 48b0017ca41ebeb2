//! Diktat content crate - dictation files, repositories and the catalog.
//!
//! A dictation is a plain text file: optional `# key: value` header lines
//! followed by one sentence per non-empty line. The catalog layers search,
//! filters and facet lists over whatever repository is in use.

pub mod catalog;
pub mod parser;
pub mod repository;

pub use catalog::{Catalog, CatalogEntry, CatalogFilters};
pub use parser::parse_dictation;
pub use repository::{FsContentRepository, MemoryContentRepository};
