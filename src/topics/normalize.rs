//! Topic name cleaning and tree normalization
//!
//! Scraped link labels carry noise: top-level topics list their sub-areas
//! after a comma ("Travel, Outdoors") and subtopic labels have the pin count
//! glued on ("Brat summer95Pins"). The cleaners strip that noise, and
//! [`clean_topics_structure`] rebuilds a tree with the cleaned names.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::{Item, TopicNode};

static PIN_COUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+Pins").unwrap());

const TOPIC_SEPARATORS: &[char] = &[',', '\u{FF0C}'];

/// Keep the part of a main topic label before the first comma
///
/// # Examples
///
/// ```
/// use trendscope::topics::normalize::clean_main_topic_name;
///
/// assert_eq!(clean_main_topic_name("Travel, Outdoors"), "Travel");
/// assert_eq!(clean_main_topic_name("  Beauty "), "Beauty");
/// ```
pub fn clean_main_topic_name(raw: &str) -> String {
    raw.split(TOPIC_SEPARATORS)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Remove pin counts such as `95Pins` from a subtopic label
///
/// # Examples
///
/// ```
/// use trendscope::topics::normalize::clean_subtopic_name;
///
/// assert_eq!(clean_subtopic_name("Brat summer95Pins"), "Brat summer");
/// assert_eq!(clean_subtopic_name("Quiet luxury"), "Quiet luxury");
/// ```
pub fn clean_subtopic_name(raw: &str) -> String {
    PIN_COUNT_REGEX.replace_all(raw, "").trim().to_string()
}

/// A topic node as received from an untrusted source
///
/// Anything that is not an object with `items`/`subtopics` ends up as
/// [`RawNode::Malformed`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    WellFormed {
        #[serde(default)]
        items: Vec<Item>,
        #[serde(default)]
        subtopics: RawSubtopics,
    },
    Malformed(serde_json::Value),
}

/// The `subtopics` field of a [`RawNode`]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSubtopics {
    Map(BTreeMap<String, RawNode>),
    Malformed(serde_json::Value),
}

impl Default for RawSubtopics {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl From<&TopicNode> for RawNode {
    fn from(node: &TopicNode) -> Self {
        RawNode::WellFormed {
            items: node.items.clone(),
            subtopics: RawSubtopics::Map(
                node.subtopics
                    .iter()
                    .map(|(name, child)| (name.clone(), RawNode::from(child)))
                    .collect(),
            ),
        }
    }
}

impl RawNode {
    /// Parse a node from arbitrary JSON
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(RawNode::Malformed(value))
    }
}

/// Parse a topic mapping from arbitrary JSON
///
/// A value that is not an object yields an empty mapping.
pub fn raw_topics_from_value(value: serde_json::Value) -> BTreeMap<String, RawNode> {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(name, child)| (name, RawNode::from_value(child)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Rebuild a topic mapping with cleaned names
///
/// Top-level keys go through [`clean_main_topic_name`], keys at every level
/// below through [`clean_subtopic_name`]. Malformed nodes become empty nodes
/// and malformed `subtopics` become an empty mapping; the pass never fails.
/// When two labels clean to the same name the later one wins.
pub fn clean_topics_structure(topics: &BTreeMap<String, RawNode>) -> BTreeMap<String, TopicNode> {
    topics
        .iter()
        .map(|(raw_name, node)| {
            let name = clean_main_topic_name(raw_name);
            let cleaned = clean_node(name.clone(), node);
            (name, cleaned)
        })
        .collect()
}

/// Clean the subtopics of a crawled tree
///
/// The crawl root is synthetic: its own items are dropped and its children
/// become the top-level topics.
pub fn clean_crawled_tree(root: &TopicNode) -> BTreeMap<String, TopicNode> {
    let raw: BTreeMap<String, RawNode> = root
        .subtopics
        .iter()
        .map(|(name, child)| (name.clone(), RawNode::from(child)))
        .collect();

    clean_topics_structure(&raw)
}

fn clean_node(name: String, node: &RawNode) -> TopicNode {
    match node {
        RawNode::WellFormed { items, subtopics } => TopicNode {
            name,
            items: items.clone(),
            subtopics: clean_subtopics(subtopics),
        },
        RawNode::Malformed(value) => {
            tracing::debug!(topic = %name, kind = value_kind(value), "Replacing malformed topic node");
            TopicNode::empty(name)
        }
    }
}

fn clean_subtopics(subtopics: &RawSubtopics) -> BTreeMap<String, TopicNode> {
    match subtopics {
        RawSubtopics::Map(children) => children
            .iter()
            .map(|(raw_name, child)| {
                let name = clean_subtopic_name(raw_name);
                let cleaned = clean_node(name.clone(), child);
                (name, cleaned)
            })
            .collect(),
        RawSubtopics::Malformed(_) => BTreeMap::new(),
    }
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_main_topic_name() {
        assert_eq!(clean_main_topic_name("Travel, Outdoors"), "Travel");
        assert_eq!(clean_main_topic_name("Home decor，Garden"), "Home decor");
        assert_eq!(clean_main_topic_name("Fashion"), "Fashion");
        assert_eq!(clean_main_topic_name(", leading"), "");
    }

    #[test]
    fn test_clean_main_topic_name_idempotent() {
        for raw in ["Travel, Outdoors", " Food ,Drink, Dessert ", "Plain"] {
            let once = clean_main_topic_name(raw);
            assert_eq!(clean_main_topic_name(&once), once);
        }
    }

    #[test]
    fn test_clean_subtopic_name() {
        assert_eq!(clean_subtopic_name("Brat summer95Pins"), "Brat summer");
        assert_eq!(clean_subtopic_name("Quiet luxury"), "Quiet luxury");
        assert_eq!(clean_subtopic_name("12Pins Mob wife 3Pins"), "Mob wife");
        assert_eq!(clean_subtopic_name("Pins and needles"), "Pins and needles");
    }

    #[test]
    fn test_malformed_node_becomes_empty() {
        let raw = raw_topics_from_value(json!({
            "Travel, Outdoors": ["not", "a", "node"],
            "Food": {
                "items": [{"title": "Pasta"}],
                "subtopics": ["also", "wrong"]
            }
        }));
        let cleaned = clean_topics_structure(&raw);

        assert_eq!(cleaned["Travel"], TopicNode::empty("Travel"));
        assert_eq!(cleaned["Food"].items.len(), 1);
        assert!(cleaned["Food"].subtopics.is_empty());
    }

    #[test]
    fn test_nested_names_cleaned() {
        let raw = raw_topics_from_value(json!({
            "Fashion, Beauty": {
                "subtopics": {
                    "Brat summer95Pins": {
                        "subtopics": {"Lime green12Pins": {}}
                    }
                }
            }
        }));
        let cleaned = clean_topics_structure(&raw);
        let brat = &cleaned["Fashion"].subtopics["Brat summer"];

        assert_eq!(brat.name, "Brat summer");
        assert!(brat.subtopics.contains_key("Lime green"));
    }

    #[test]
    fn test_clean_crawled_tree_drops_root_items() {
        let mut root = TopicNode::empty("");
        root.items.push(Item::default());
        root.subtopics
            .insert("Travel, Outdoors".into(), TopicNode::empty("Travel, Outdoors"));

        let cleaned = clean_crawled_tree(&root);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned["Travel"].name, "Travel");
    }
}
