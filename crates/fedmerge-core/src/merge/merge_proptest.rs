//! Property-based tests for the batch merger.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::Value;
    use std::collections::HashSet;

    use crate::merge::{BatchMerger, MergerConfig};

    /// Strategy for a representations array drawn from a small id alphabet,
    /// so that generated batches contain plenty of duplicates.
    fn representations_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-c]{1,2}", 0..4)
    }

    fn batch_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(representations_strategy(), 1..12)
    }

    fn render(ids: &[String]) -> String {
        let elements: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"__typename":"User","id":"{id}"}}"#))
            .collect();
        format!(
            r#"{{"body":{{"variables":{{"representations":[{}]}}}}}}"#,
            elements.join(",")
        )
    }

    fn merged_ids(output: &[u8]) -> Vec<String> {
        let doc: Value = serde_json::from_slice(output).unwrap();
        doc["body"]["variables"]["representations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|rep| rep["id"].as_str().unwrap().to_string())
            .collect()
    }

    proptest! {
        #[test]
        fn test_position_map_partitions_inputs(batch in batch_strategy()) {
            let inputs: Vec<String> = batch.iter().map(|ids| render(ids)).collect();
            let (_, map) = BatchMerger::new().merge_to_vec(&inputs).unwrap();

            let mut seen = HashSet::new();
            for (_, members) in map.iter() {
                prop_assert!(!members.is_empty());
                prop_assert!(members.windows(2).all(|w| w[0] < w[1]));
                for &input in members {
                    prop_assert!(seen.insert(input), "input {} appears twice", input);
                }
            }
            prop_assert_eq!(seen.len(), inputs.len());
        }

        #[test]
        fn test_groups_follow_first_appearance(batch in batch_strategy()) {
            let inputs: Vec<String> = batch.iter().map(|ids| render(ids)).collect();
            let (output, map) = BatchMerger::new().merge_to_vec(&inputs).unwrap();

            // Expected: distinct arrays in first-seen order.
            let mut distinct: Vec<&Vec<String>> = Vec::new();
            for ids in &batch {
                if !distinct.contains(&ids) {
                    distinct.push(ids);
                }
            }

            prop_assert_eq!(map.len(), distinct.len());
            for (group, members) in map.iter() {
                prop_assert_eq!(&batch[members[0]], distinct[group]);
                let first_seen = batch.iter().position(|ids| ids == distinct[group]).unwrap();
                prop_assert_eq!(members[0], first_seen);
            }

            let expected: Vec<String> = distinct.into_iter().flatten().cloned().collect();
            prop_assert_eq!(merged_ids(&output), expected);
        }

        #[test]
        fn test_group_ranges_slice_merged_array(batch in batch_strategy()) {
            let inputs: Vec<String> = batch.iter().map(|ids| render(ids)).collect();
            let (output, map) = BatchMerger::new().merge_to_vec(&inputs).unwrap();
            let merged = merged_ids(&output);

            prop_assert_eq!(map.element_count(), merged.len());
            for group in map.groups() {
                for &input in group.inputs() {
                    prop_assert_eq!(&merged[group.element_range()], batch[input].as_slice());
                }
            }
        }

        #[test]
        fn test_pool_and_verification_do_not_change_output(batch in batch_strategy()) {
            let inputs: Vec<String> = batch.iter().map(|ids| render(ids)).collect();
            let baseline = BatchMerger::new().merge_to_vec(&inputs).unwrap();

            let warm = BatchMerger::with_config(MergerConfig {
                prewarm_hashers: 4,
                verify_collisions: false,
                ..MergerConfig::default()
            });
            prop_assert_eq!(warm.merge_to_vec(&inputs).unwrap(), baseline.clone());
            // Second call reuses the hashers released by the first.
            prop_assert_eq!(warm.merge_to_vec(&inputs).unwrap(), baseline);
        }
    }
}
