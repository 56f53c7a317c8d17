//! Data types for batch merge operations.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Tuning knobs for [`BatchMerger`](super::BatchMerger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergerConfig {
    /// Compare payload bytes when two fingerprints match.
    ///
    /// When disabled, equal fingerprints are trusted and a 64-bit collision
    /// would merge two unrelated representation arrays.
    pub verify_collisions: bool,
    /// Number of idle hashers allocated when the merger is built.
    pub prewarm_hashers: usize,
    /// Seed for the XXH64 fingerprint.
    pub hash_seed: u64,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            verify_collisions: true,
            prewarm_hashers: 0,
            hash_seed: 0,
        }
    }
}

/// One distinct representations array seen during a merge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputGroup {
    pub(crate) inputs: Vec<usize>,
    pub(crate) element_offset: usize,
    pub(crate) element_count: usize,
}

impl OutputGroup {
    /// Original input indices sharing this group, in input order.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Index of this group's first element in the merged array.
    pub fn element_offset(&self) -> usize {
        self.element_offset
    }

    /// Number of elements this group contributed to the merged array.
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Slice of the merged array (and of the upstream response) owned by this group.
    pub fn element_range(&self) -> Range<usize> {
        self.element_offset..self.element_offset + self.element_count
    }
}

/// Mapping from output group index to the original inputs it serves.
///
/// Group indices follow first-seen order, and every input index of the merge
/// call appears in exactly one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    groups: Vec<OutputGroup>,
}

impl PositionMap {
    pub(crate) fn new(groups: Vec<OutputGroup>) -> Self {
        Self { groups }
    }

    /// Number of output groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Input indices for the given output group.
    pub fn get(&self, group: usize) -> Option<&[usize]> {
        self.groups.get(group).map(OutputGroup::inputs)
    }

    /// Full bookkeeping for the given output group.
    pub fn group(&self, group: usize) -> Option<&OutputGroup> {
        self.groups.get(group)
    }

    pub fn groups(&self) -> &[OutputGroup] {
        &self.groups
    }

    /// Iterates `(group index, input indices)` in group order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.groups
            .iter()
            .enumerate()
            .map(|(index, group)| (index, group.inputs()))
    }

    /// Output group that serves the given input index.
    pub fn group_of(&self, input: usize) -> Option<usize> {
        self.groups
            .iter()
            .position(|group| group.inputs.contains(&input))
    }

    /// Total number of inputs covered by the map.
    pub fn input_count(&self) -> usize {
        self.groups.iter().map(|group| group.inputs.len()).sum()
    }

    /// Inputs that were folded into an earlier group.
    pub fn duplicate_count(&self) -> usize {
        self.input_count() - self.groups.len()
    }

    /// Length of the merged representations array.
    pub fn element_count(&self) -> usize {
        self.groups.iter().map(|group| group.element_count).sum()
    }

    /// Plain `group -> inputs` view of the map.
    pub fn to_map(&self) -> BTreeMap<usize, Vec<usize>> {
        self.iter()
            .map(|(index, inputs)| (index, inputs.to_vec()))
            .collect()
    }
}

impl Serialize for PositionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (index, inputs) in self.iter() {
            map.serialize_entry(&index, inputs)?;
        }
        map.end()
    }
}

/// Errors raised while reading the representations array of a document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The document is not well-formed JSON, or an intermediate value has the wrong type.
    #[error("invalid JSON document: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// `body.variables.representations` is absent or null.
    #[error("missing body.variables.representations")]
    MissingPath,

    /// The value at the representations path is not a JSON array.
    #[error("body.variables.representations is not an array: {0}")]
    NotAnArray(#[source] serde_json::Error),
}

/// Errors raised while splicing the merged array into the template.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("representations path not found in template: {0}")]
    PathNotFound(#[source] ExtractError),
}

/// Errors that can occur during a merge call.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Input `index` has no usable representations array.
    #[error("malformed input at index {index}: {source}")]
    MalformedInput {
        index: usize,
        #[source]
        source: ExtractError,
    },

    /// The merged array could not be spliced into input 0.
    #[error("failed to assemble merged document: {0}")]
    Assembly(#[from] AssemblyError),
}

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
