//! Batch merger with fingerprint deduplication.
//!
//! Several callers fetching entities from the same subgraph in one execution
//! window each produce a request body carrying their own
//! `body.variables.representations` array. The merger folds them into a
//! single upstream request:
//!
//! 1. **Extraction**: the raw representations array is read from every input
//! 2. **Deduplication**: byte-identical arrays share one output group
//! 3. **Assembly**: distinct elements are spliced into a copy of input 0
//!
//! The returned [`PositionMap`] tells the response splitter which inputs map
//! to which output group, and which slice of the merged array each group owns.

mod assemble;
mod extract;
mod merger;
mod pool;
mod types;

pub use assemble::assemble;
pub use extract::{extract_representations, Representations};
pub use merger::BatchMerger;
pub use pool::{HasherPool, PooledHasher};
pub use types::{
    AssemblyError, ExtractError, MergeError, MergeResult, MergerConfig, OutputGroup, PositionMap,
};

#[cfg(test)]
mod merge_proptest;
