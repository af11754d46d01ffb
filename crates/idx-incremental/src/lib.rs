//! The incremental publication state machine (spec §4.5): diffs the
//! indexing context's live records against a persisted content baseline
//! to decide what belongs in the next chunk, and manages the
//! chain-id/chunk-counter lifecycle recorded in the descriptor.

pub mod baseline;
pub mod handler;

pub use baseline::{Baseline, BASELINE_FILENAME};
pub use handler::{contributor_ids_key, HandlerState, IncrementalHandler, IncrementalOutcome};
