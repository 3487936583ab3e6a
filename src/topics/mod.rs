//! Topic name handling
//!
//! Cleaning of crawled names lives in [`normalize`]; this module flattens a
//! cleaned tree into the list of names submitted for trend analysis.

pub mod normalize;

pub use normalize::{
    clean_crawled_tree, clean_main_topic_name, clean_subtopic_name, clean_topics_structure,
    RawNode, RawSubtopics,
};

use std::collections::{BTreeMap, HashSet};

use crate::models::TopicNode;

/// Collect every topic name in `topics`, at any depth, without duplicates
///
/// The order of the returned names is unspecified.
pub fn extract_topic_names(topics: &BTreeMap<String, TopicNode>) -> Vec<String> {
    let mut names = HashSet::new();
    collect_names(topics, &mut names);
    names.into_iter().collect()
}

fn collect_names(topics: &BTreeMap<String, TopicNode>, names: &mut HashSet<String>) {
    for (name, node) in topics {
        names.insert(name.clone());
        collect_names(&node.subtopics, names);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(children: &[(&str, TopicNode)]) -> TopicNode {
        TopicNode {
            subtopics: children
                .iter()
                .map(|(name, child)| (name.to_string(), child.clone()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_names_all_depths_deduplicated() {
        let leaf = TopicNode::default();
        let tree: BTreeMap<String, TopicNode> = [
            (
                "Fashion".to_string(),
                node(&[("Brat summer", node(&[("Lime green", leaf.clone())]))]),
            ),
            (
                "Beauty".to_string(),
                node(&[("Brat summer", leaf.clone()), ("Glazed nails", leaf)]),
            ),
        ]
        .into_iter()
        .collect();

        let mut names = extract_topic_names(&tree);
        names.sort();

        assert_eq!(
            names,
            vec!["Beauty", "Brat summer", "Fashion", "Glazed nails", "Lime green"]
        );
    }

    #[test]
    fn test_extract_names_empty_tree() {
        assert!(extract_topic_names(&BTreeMap::new()).is_empty());
    }
}
