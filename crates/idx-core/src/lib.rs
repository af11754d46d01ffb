//! The durable indexing context: a tantivy-backed document store with
//! upsert-by-UINFO semantics, atomic timestamp publication, and a
//! single-writer/many-readers concurrency contract (spec §4.3, §5).

pub mod context;
pub mod lock;
pub mod schema;

pub use context::IndexingContext;
pub use lock::WriteLock;
pub use schema::IndexSchema;
