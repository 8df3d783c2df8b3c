//! Weighted keyword classifier.
//!
//! Each fact is tokenized and scanned left to right:
//! - a token equal to a topic's own name anchors the fact to that topic with
//!   parents `{topic}_root` and ends the scan;
//! - otherwise every topic listing the token as a keyword competes, and a
//!   candidate replaces the running best only when its weight is strictly
//!   smaller. The running best spans the whole fact, so equal weights keep
//!   the first candidate seen (token order, then registry order).
//!
//! Facts matching nothing are dropped. A fact landing at depth 1 gets a
//! synthetic root node for its topic.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use catfacts_types::{root_key, ClassifiedFact, TreeResult};

use crate::model::{TopicDefinition, TopicModel};
use crate::normalize::tokenize;

/// How a fact was matched to its topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// A token named the topic
    Anchor,
    /// The topic won on keyword weight
    Keyword,
}

/// Counters from one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    /// Facts submitted
    pub total: usize,
    /// Facts placed in the tree
    pub classified: usize,
    /// Facts matching no topic
    pub dropped: usize,
    /// Classified facts resolved by an anchor token
    pub anchored: usize,
    /// Root nodes synthesized
    pub roots_created: usize,
}

/// Assigns facts to topic nodes using a [`TopicModel`].
///
/// Stateless across facts and free of I/O.
#[derive(Debug, Clone)]
pub struct Classifier {
    model: Arc<TopicModel>,
}

impl Classifier {
    /// Create a classifier over a model.
    pub fn new(model: Arc<TopicModel>) -> Self {
        Self { model }
    }

    /// Classifier over the built-in cat facts model.
    pub fn cat_facts() -> Self {
        Self::new(Arc::new(TopicModel::cat_facts()))
    }

    /// The model in use.
    pub fn model(&self) -> &TopicModel {
        &self.model
    }

    /// Find the winning topic for a fact.
    fn resolve(&self, text: &str) -> Option<(&TopicDefinition, MatchKind)> {
        let mut best: Option<&TopicDefinition> = None;

        for token in tokenize(text) {
            if let Some(topic) = self.model.anchor(&token) {
                return Some((topic, MatchKind::Anchor));
            }
            for topic in self.model.keyword_matches(&token) {
                if best.map_or(true, |current| topic.rank() < current.rank()) {
                    best = Some(topic);
                }
            }
        }

        best.map(|topic| (topic, MatchKind::Keyword))
    }

    /// Classify a single fact, returning how it matched.
    pub fn classify_match(&self, text: &str) -> Option<(ClassifiedFact, MatchKind)> {
        let (topic, kind) = self.resolve(text)?;
        let parents = match kind {
            MatchKind::Anchor => vec![root_key(&topic.name)],
            MatchKind::Keyword => topic.resolved_parents(),
        };
        let fact = ClassifiedFact::new(topic.name.clone(), topic.depth(), parents, text);
        Some((fact, kind))
    }

    /// Classify a single fact.
    pub fn classify_fact(&self, text: &str) -> Option<ClassifiedFact> {
        self.classify_match(text).map(|(fact, _)| fact)
    }

    /// Classify a batch into a tree.
    pub fn classify<I, S>(&self, facts: I) -> TreeResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.classify_with_stats(facts).0
    }

    /// Classify a batch into a tree and report counters.
    pub fn classify_with_stats<I, S>(&self, facts: I) -> (TreeResult, ClassificationStats)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = TreeResult::new();
        let mut stats = ClassificationStats::default();

        for text in facts {
            let text = text.as_ref();
            stats.total += 1;

            let Some((fact, kind)) = self.classify_match(text) else {
                stats.dropped += 1;
                debug!(fact = text, "No topic matched, dropping fact");
                continue;
            };

            if kind == MatchKind::Anchor {
                stats.anchored += 1;
            }
            if fact.is_top_level() && tree.ensure_root(&fact.topic) {
                stats.roots_created += 1;
                debug!(topic = %fact.topic, "Created root node");
            }

            debug!(topic = %fact.topic, depth = fact.depth, "Classified fact");
            stats.classified += 1;
            tree.push_fact(fact);
        }

        info!(
            total = stats.total,
            classified = stats.classified,
            dropped = stats.dropped,
            roots = stats.roots_created,
            "Classification complete"
        );
        for (key, node) in tree.iter() {
            if node.is_root() {
                debug!(key = %key, "Root node");
            } else {
                info!(topic = %key, facts = node.facts().len(), "Topic summary");
            }
        }

        (tree, stats)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::cat_facts()
    }
}
