//! Classification output types.
//!
//! A classification pass produces one [`ClassifiedFact`] per matched input
//! fact plus a synthetic [`RootNode`] for every top-level topic it touched.
//! Both are grouped into a [`TreeResult`] keyed by topic name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Suffix that marks a root node key (`cat` -> `cat_root`).
pub const ROOT_SUFFIX: &str = "_root";

/// Build the root key for a topic.
pub fn root_key(topic: &str) -> String {
    format!("{}{}", topic, ROOT_SUFFIX)
}

/// A fact assigned to exactly one topic node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFact {
    /// Most specific topic matched
    pub topic: String,

    /// Weight of `topic` (0 for unweighted topics)
    pub depth: u32,

    /// Resolved ancestor topic names, empty when the fact is itself a root
    pub parents: Vec<String>,

    /// Original, unnormalized fact text
    #[serde(rename = "fact")]
    pub text: String,
}

impl ClassifiedFact {
    /// Create a new classified fact.
    pub fn new(
        topic: impl Into<String>,
        depth: u32,
        parents: Vec<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            depth,
            parents,
            text: text.into(),
        }
    }

    /// True when this fact sits directly below a root node.
    pub fn is_top_level(&self) -> bool {
        self.depth == 1
    }
}

/// Synthetic, payload-free node marking the top of a topic hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootNode {
    /// Root-marked topic name (e.g. `cat_root`)
    pub topic: String,

    /// Always 0
    pub depth: u32,
}

impl RootNode {
    /// Create the root node for a topic.
    pub fn for_topic(topic: &str) -> Self {
        Self {
            topic: root_key(topic),
            depth: 0,
        }
    }
}

/// Entry stored under a tree key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Root label for a hierarchy
    Root(RootNode),
    /// Facts classified into a topic, in input order
    Facts(Vec<ClassifiedFact>),
}

impl TreeNode {
    /// Facts held by this node (empty for roots).
    pub fn facts(&self) -> &[ClassifiedFact] {
        match self {
            TreeNode::Root(_) => &[],
            TreeNode::Facts(facts) => facts,
        }
    }

    /// Check if this node is a root label.
    pub fn is_root(&self) -> bool {
        matches!(self, TreeNode::Root(_))
    }
}

/// All hierarchies discovered from one batch.
///
/// Keys are topic names for fact sequences and `{topic}_root` for root
/// nodes. Iteration order is sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeResult {
    nodes: BTreeMap<String, TreeNode>,
}

impl TreeResult {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys (topics plus roots).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the node stored under a key.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.nodes.get(key)
    }

    /// Facts classified into a topic.
    pub fn facts(&self, topic: &str) -> &[ClassifiedFact] {
        self.nodes.get(topic).map(TreeNode::facts).unwrap_or(&[])
    }

    /// Root node for a topic, if one was synthesized.
    pub fn root(&self, topic: &str) -> Option<&RootNode> {
        match self.nodes.get(&root_key(topic)) {
            Some(TreeNode::Root(root)) => Some(root),
            _ => None,
        }
    }

    /// Check if a root node exists for a topic.
    pub fn has_root(&self, topic: &str) -> bool {
        self.root(topic).is_some()
    }

    /// Insert the root node for a topic unless it already exists.
    ///
    /// Returns true if a new root was created.
    pub fn ensure_root(&mut self, topic: &str) -> bool {
        let key = root_key(topic);
        if self.nodes.contains_key(&key) {
            return false;
        }
        self.nodes
            .insert(key, TreeNode::Root(RootNode::for_topic(topic)));
        true
    }

    /// Append a fact under its topic.
    pub fn push_fact(&mut self, fact: ClassifiedFact) {
        if let Some(TreeNode::Facts(facts)) = self.nodes.get_mut(&fact.topic) {
            facts.push(fact);
            return;
        }
        // A topic literally named `x_root` collides with the root key of `x`;
        // the fact sequence takes the slot over.
        self.nodes
            .insert(fact.topic.clone(), TreeNode::Facts(vec![fact]));
    }

    /// Iterate over `(key, node)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TreeNode)> {
        self.nodes.iter()
    }

    /// Topic names holding facts, in key order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|(_, node)| !node.is_root())
            .map(|(key, _)| key.as_str())
    }

    /// Total number of classified facts.
    pub fn fact_count(&self) -> usize {
        self.nodes.values().map(|node| node.facts().len()).sum()
    }

    /// Total number of root nodes.
    pub fn root_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_root()).count()
    }
}
