//! fedmerge-core: Request coalescing for federated entity fetches
//!
//! This crate contains the merge engine that folds many `_entities` fetches
//! aimed at the same subgraph into a single upstream request:
//! - Representation extraction from request bodies
//! - Fingerprint-based deduplication of representation arrays
//! - Assembly of the merged request document
//! - Pooled streaming hashers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               fedmerge-core                 │
//! ├─────────────────────────────────────────────┤
//! │  merge/                                     │
//! │    extract.rs  - Locate representations     │
//! │    pool.rs     - Hasher free list           │
//! │    merger.rs   - Fingerprint + dedup        │
//! │    assemble.rs - Splice merged array        │
//! │    types.rs    - PositionMap, errors        │
//! └─────────────────────────────────────────────┘
//! ```

pub mod merge;

// Re-exports for convenience
pub use merge::{BatchMerger, MergeError, MergeResult, MergerConfig, OutputGroup, PositionMap};
