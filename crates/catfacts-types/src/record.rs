//! Stored fact records and incremental-create payloads.
//!
//! Records are the flat, persisted form of tree nodes: parents are joined
//! into one string and root nodes carry the literal `"none"` as their fact.

use serde::{Deserialize, Serialize};

use crate::error::CatFactsError;
use crate::fact::{ClassifiedFact, RootNode, TreeNode, TreeResult};

/// Placeholder stored for absent parents or fact text.
pub const NONE: &str = "none";

/// A persisted fact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRecord {
    /// Sequential identifier
    pub id: u64,
    /// Node depth
    pub depth: u32,
    /// Topic column (root records use the `{topic}_root` name)
    pub topic: String,
    /// Comma-joined parent names or `"none"`
    pub parents: String,
    /// Fact text or `"none"`
    pub fact: String,
}

impl FactRecord {
    /// Flatten a classified fact.
    pub fn from_fact(id: u64, fact: &ClassifiedFact) -> Self {
        Self {
            id,
            depth: fact.depth,
            topic: fact.topic.clone(),
            parents: join_parents(&fact.parents),
            fact: fact.text.clone(),
        }
    }

    /// Flatten a root node.
    pub fn from_root(id: u64, root: &RootNode) -> Self {
        Self {
            id,
            depth: root.depth,
            topic: root.topic.clone(),
            parents: NONE.to_string(),
            fact: NONE.to_string(),
        }
    }

    /// Flatten a whole tree, numbering records from `start_id`.
    ///
    /// Records follow key order; within a key facts keep insertion order.
    pub fn from_tree(tree: &TreeResult, start_id: u64) -> Vec<Self> {
        let mut records = Vec::with_capacity(tree.fact_count() + tree.root_count());
        let mut id = start_id;
        for (_, node) in tree.iter() {
            match node {
                TreeNode::Root(root) => {
                    records.push(Self::from_root(id, root));
                    id += 1;
                }
                TreeNode::Facts(facts) => {
                    for fact in facts {
                        records.push(Self::from_fact(id, fact));
                        id += 1;
                    }
                }
            }
        }
        records
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Join parent names for storage, `"none"` when there are none.
pub fn join_parents(parents: &[String]) -> String {
    let names: Vec<&str> = parents
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if names.is_empty() {
        NONE.to_string()
    } else {
        names.join(", ")
    }
}

/// Parents as supplied by a client: a list of names or a pre-joined string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parents {
    /// `["cat_root", "cat"]`
    List(Vec<String>),
    /// `"cat_root, cat"`
    Joined(String),
}

impl Parents {
    /// Storage form of these parents.
    pub fn joined(&self) -> String {
        match self {
            Parents::List(names) => join_parents(names),
            Parents::Joined(s) if s.trim().is_empty() => NONE.to_string(),
            Parents::Joined(s) => s.trim().to_string(),
        }
    }
}

/// A pre-classified fact submitted for incremental create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFact {
    /// Node depth
    pub depth: u32,
    /// Topic name
    pub topic: String,
    /// Optional parents, stored as `"none"` when absent
    #[serde(default)]
    pub parents: Option<Parents>,
    /// Fact text
    pub fact: String,
}

impl NewFact {
    /// Parse and validate one raw JSON record.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CatFactsError> {
        let new_fact: NewFact = serde_json::from_value(value)?;
        new_fact.validate()?;
        Ok(new_fact)
    }

    /// Check field contents beyond their presence.
    pub fn validate(&self) -> Result<(), CatFactsError> {
        if self.topic.trim().is_empty() {
            return Err(CatFactsError::InvalidInput("topic must not be empty".to_string()));
        }
        Ok(())
    }

    /// Convert into a stored record with the given id.
    pub fn into_record(self, id: u64) -> FactRecord {
        let parents = self
            .parents
            .as_ref()
            .map(Parents::joined)
            .unwrap_or_else(|| NONE.to_string());
        FactRecord {
            id,
            depth: self.depth,
            topic: self.topic,
            parents,
            fact: self.fact,
        }
    }
}

/// A submitted record that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedFact {
    /// Position in the submitted list
    pub index: usize,
    /// Why it was rejected
    pub reason: String,
}

/// Body key holding the records of an incremental create.
pub const NEW_FACTS_KEY: &str = "new_cat_facts";

/// Pull the raw records out of a `{"new_cat_facts": [...]}` body.
///
/// Records themselves are left unparsed so each can be accepted or
/// rejected on its own.
pub fn extract_new_facts(
    mut body: serde_json::Value,
) -> Result<Vec<serde_json::Value>, CatFactsError> {
    match body.get_mut(NEW_FACTS_KEY).map(serde_json::Value::take) {
        Some(serde_json::Value::Array(records)) => Ok(records),
        Some(_) => Err(CatFactsError::InvalidInput(format!(
            "'{}' must be an array",
            NEW_FACTS_KEY
        ))),
        None => Err(CatFactsError::InvalidInput(format!(
            "missing '{}'",
            NEW_FACTS_KEY
        ))),
    }
}
