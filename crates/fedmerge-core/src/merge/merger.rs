//! Batch merger implementation.

use std::collections::HashMap;

use serde_json::value::RawValue;
use tracing::{debug, warn};

use super::assemble::assemble;
use super::extract::extract_representations;
use super::pool::HasherPool;
use super::types::{MergeError, MergeResult, MergerConfig, OutputGroup, PositionMap};

/// Merges entity fetches for one subgraph into a single request.
///
/// Inputs whose representations arrays are byte-identical share one output
/// group and contribute their elements once. The merger holds no per-call
/// state and can be shared across threads.
pub struct BatchMerger {
    /// Hashers for payload fingerprints.
    pool: HasherPool,
    config: MergerConfig,
}

impl BatchMerger {
    /// Creates a merger with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MergerConfig::default())
    }

    pub fn with_config(config: MergerConfig) -> Self {
        Self {
            pool: HasherPool::with_prewarmed(config.prewarm_hashers, config.hash_seed),
            config,
        }
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    pub fn pool(&self) -> &HasherPool {
        &self.pool
    }

    /// XXH64 digest of `payload`, computed with a pooled hasher.
    ///
    /// The hasher is reset and returned before this function returns.
    pub fn fingerprint(&self, payload: &[u8]) -> u64 {
        let mut hasher = self.pool.acquire();
        hasher.update(payload);
        let digest = hasher.digest();
        hasher.reset();
        hasher.release();
        digest
    }

    /// Merges `inputs` into one request document appended to `output`.
    ///
    /// Input 0 is the template: the result is a copy of it with the
    /// representations array replaced by every distinct element, in
    /// first-seen order. On error nothing is written. An empty `inputs`
    /// slice is a no-op returning an empty map.
    pub fn merge<I>(&self, output: &mut Vec<u8>, inputs: &[I]) -> MergeResult<PositionMap>
    where
        I: AsRef<[u8]>,
    {
        self.merge_with_fingerprint(output, inputs, |payload| self.fingerprint(payload))
    }

    /// Like [`merge`](Self::merge), returning the merged document as a new buffer.
    pub fn merge_to_vec<I>(&self, inputs: &[I]) -> MergeResult<(Vec<u8>, PositionMap)>
    where
        I: AsRef<[u8]>,
    {
        let mut output = Vec::new();
        let positions = self.merge(&mut output, inputs)?;
        Ok((output, positions))
    }

    pub(crate) fn merge_with_fingerprint<I, F>(
        &self,
        output: &mut Vec<u8>,
        inputs: &[I],
        mut fingerprint: F,
    ) -> MergeResult<PositionMap>
    where
        I: AsRef<[u8]>,
        F: FnMut(&[u8]) -> u64,
    {
        let Some(template) = inputs.first() else {
            return Ok(PositionMap::default());
        };

        let mut groups: Vec<OutputGroup> = Vec::with_capacity(inputs.len());
        // Raw array bytes per group, indexed like `groups`.
        let mut payloads: Vec<&[u8]> = Vec::with_capacity(inputs.len());
        // Fingerprint -> groups carrying it; more than one only on collision.
        let mut by_fingerprint: HashMap<u64, Vec<usize>> = HashMap::with_capacity(inputs.len());
        let mut elements: Vec<&RawValue> = Vec::new();
        let mut collisions = 0usize;

        for (index, input) in inputs.iter().enumerate() {
            let representations = extract_representations(input.as_ref())
                .map_err(|source| MergeError::MalformedInput { index, source })?;
            let payload = representations.as_bytes();
            let digest = fingerprint(payload);

            let candidates = by_fingerprint.entry(digest).or_default();
            let existing = candidates
                .iter()
                .copied()
                .find(|&group| !self.config.verify_collisions || payloads[group] == payload);

            if let Some(group) = existing {
                groups[group].inputs.push(index);
                continue;
            }

            if !candidates.is_empty() {
                collisions += 1;
                warn!(
                    index,
                    fingerprint = digest,
                    "fingerprint collision between distinct representations"
                );
            }

            let items = representations
                .elements()
                .map_err(|source| MergeError::MalformedInput { index, source })?;

            candidates.push(groups.len());
            groups.push(OutputGroup {
                inputs: vec![index],
                element_offset: elements.len(),
                element_count: items.len(),
            });
            payloads.push(payload);
            elements.extend(items);
        }

        assemble(output, template.as_ref(), &elements)?;

        let positions = PositionMap::new(groups);
        record_merge(inputs.len(), &positions, collisions);
        debug!(
            inputs = inputs.len(),
            groups = positions.len(),
            duplicates = positions.duplicate_count(),
            elements = elements.len(),
            "merged representations batch"
        );

        Ok(positions)
    }
}

impl Default for BatchMerger {
    fn default() -> Self {
        Self::new()
    }
}

fn record_merge(inputs: usize, positions: &PositionMap, collisions: usize) {
    metrics::counter!("fedmerge_merge_calls_total").increment(1);
    metrics::counter!("fedmerge_merge_inputs_total").increment(inputs as u64);
    metrics::counter!("fedmerge_merge_duplicates_total")
        .increment(positions.duplicate_count() as u64);
    if collisions > 0 {
        metrics::counter!("fedmerge_fingerprint_collisions_total").increment(collisions as u64);
    }
    metrics::histogram!("fedmerge_merge_groups").record(positions.len() as f64);
}
