//! Static topic registry.
//!
//! A [`TopicModel`] is built once at startup and never mutated. It answers two
//! lookups for a normalized token: which topic is *named* by the token (an
//! anchor) and which topics list it as a keyword.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::TopicsError;
use crate::keywords::{CatFactsKeywords, KeywordSet};

/// One topic in the registry.
#[derive(Debug, Clone)]
pub struct TopicDefinition {
    /// Unique topic name
    pub name: String,
    /// Generality; smaller is closer to a root. `None` marks a catch-all.
    pub weight: Option<u32>,
    /// Tokens that indicate this topic
    pub keywords: KeywordSet,
    /// Declared ancestors, most general first
    pub parents: Vec<String>,
}

impl TopicDefinition {
    /// Create a topic without keywords or parents.
    pub fn new(name: impl Into<String>, weight: Option<u32>) -> Self {
        Self {
            name: name.into(),
            weight,
            keywords: Arc::new(BTreeSet::new()),
            parents: Vec::new(),
        }
    }

    /// Attach a (possibly shared) keyword set.
    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    /// Declare ancestors.
    pub fn with_parents(mut self, parents: &[&str]) -> Self {
        self.parents = parents.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Ordering key for the tie-break; unweighted topics rank last.
    pub fn rank(&self) -> u32 {
        self.weight.unwrap_or(u32::MAX)
    }

    /// Depth recorded for facts in this topic.
    pub fn depth(&self) -> u32 {
        self.weight.unwrap_or(0)
    }

    /// Parents for a keyword match: the declared ones, or the topic itself.
    pub fn resolved_parents(&self) -> Vec<String> {
        if self.parents.is_empty() {
            vec![self.name.clone()]
        } else {
            self.parents.clone()
        }
    }
}

/// Immutable registry of topic definitions.
#[derive(Debug, Clone)]
pub struct TopicModel {
    /// Definitions in enumeration order
    topics: Vec<TopicDefinition>,
    /// Topic name -> index
    by_name: HashMap<String, usize>,
    /// Keyword -> indices of topics listing it, in enumeration order
    by_keyword: HashMap<String, Vec<usize>>,
}

impl TopicModel {
    /// Build a model from definitions, validating names and weights.
    pub fn new(topics: Vec<TopicDefinition>) -> Result<Self, TopicsError> {
        let mut by_name = HashMap::with_capacity(topics.len());
        let mut by_keyword: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, topic) in topics.iter().enumerate() {
            if topic.name.trim().is_empty() {
                return Err(TopicsError::InvalidModel(format!(
                    "topic at position {} has an empty name",
                    idx
                )));
            }
            if topic.weight == Some(0) {
                return Err(TopicsError::InvalidModel(format!(
                    "topic '{}' has weight 0; weights must be positive",
                    topic.name
                )));
            }
            if by_name.insert(topic.name.clone(), idx).is_some() {
                return Err(TopicsError::InvalidModel(format!(
                    "duplicate topic name '{}'",
                    topic.name
                )));
            }
            for keyword in topic.keywords.iter() {
                by_keyword.entry(keyword.clone()).or_default().push(idx);
            }
        }

        Ok(Self {
            topics,
            by_name,
            by_keyword,
        })
    }

    /// The built-in cat facts registry.
    pub fn cat_facts() -> Self {
        let kw = CatFactsKeywords::build();
        let cat_chain = ["cat_root", "cat"];

        let mut topics = vec![
            TopicDefinition::new("cat", Some(1))
                .with_keywords(kw.cat.clone())
                .with_parents(&["cat_root"]),
            // Reachable only by naming it.
            TopicDefinition::new("misc", Some(1)),
            TopicDefinition::new("person", Some(1))
                .with_keywords(kw.person.clone())
                .with_parents(&["person_root"]),
            TopicDefinition::new("appearance", Some(2))
                .with_keywords(kw.appearance.clone())
                .with_parents(&cat_chain),
            TopicDefinition::new("personality", Some(2))
                .with_keywords(kw.traits.clone())
                .with_parents(&cat_chain),
            TopicDefinition::new("intelligence", Some(2))
                .with_keywords(kw.traits.clone())
                .with_parents(&cat_chain),
            TopicDefinition::new("health", Some(2))
                .with_keywords(kw.health.clone())
                .with_parents(&cat_chain),
            TopicDefinition::new("activities", Some(2))
                .with_keywords(kw.activities.clone())
                .with_parents(&cat_chain),
        ];

        for category in ["health", "intelligence", "personality", "activities"] {
            let parents = ["cat_root", "cat", category];
            topics.push(
                TopicDefinition::new(format!("positive_{}", category), Some(3))
                    .with_keywords(kw.positive.clone())
                    .with_parents(&parents),
            );
            topics.push(
                TopicDefinition::new(format!("negative_{}", category), Some(3))
                    .with_keywords(kw.negative.clone())
                    .with_parents(&parents),
            );
        }

        // Names are unique and weights positive by construction.
        match Self::new(topics) {
            Ok(model) => model,
            Err(e) => unreachable!("built-in topic model is invalid: {}", e),
        }
    }

    /// Topic whose own name equals the token.
    pub fn anchor(&self, token: &str) -> Option<&TopicDefinition> {
        self.by_name.get(token).map(|&idx| &self.topics[idx])
    }

    /// Topics listing the token as a keyword, in enumeration order.
    pub fn keyword_matches<'a>(
        &'a self,
        token: &str,
    ) -> impl Iterator<Item = &'a TopicDefinition> + 'a {
        self.by_keyword
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&idx| &self.topics[idx])
    }

    /// Look up a topic by name.
    pub fn get(&self, name: &str) -> Result<&TopicDefinition, TopicsError> {
        self.anchor(name)
            .ok_or_else(|| TopicsError::NotFound(name.to_string()))
    }

    /// All topics in enumeration order.
    pub fn topics(&self) -> &[TopicDefinition] {
        &self.topics
    }

    /// Number of topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Check if the model has no topics.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl Default for TopicModel {
    fn default() -> Self {
        Self::cat_facts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cat_facts_model_shape() {
        let model = TopicModel::cat_facts();
        assert_eq!(model.len(), 16);

        let cat = model.get("cat").unwrap();
        assert_eq!(cat.weight, Some(1));
        assert_eq!(cat.parents, vec!["cat_root"]);

        let misc = model.get("misc").unwrap();
        assert!(misc.keywords.is_empty());
        assert_eq!(misc.resolved_parents(), vec!["misc"]);

        let pos = model.get("positive_activities").unwrap();
        assert_eq!(pos.weight, Some(3));
        assert_eq!(pos.parents, vec!["cat_root", "cat", "activities"]);
    }

    #[test]
    fn test_parents_reference_known_topics_or_roots() {
        let model = TopicModel::cat_facts();
        for topic in model.topics() {
            for parent in &topic.parents {
                let known = model.anchor(parent).is_some()
                    || parent
                        .strip_suffix(catfacts_types::ROOT_SUFFIX)
                        .and_then(|name| model.anchor(name))
                        .is_some();
                assert!(known, "{} has unknown parent {}", topic.name, parent);
            }
        }
    }

    #[test]
    fn test_shared_keyword_sets_are_the_same_allocation() {
        let model = TopicModel::cat_facts();
        let personality = model.get("personality").unwrap();
        let intelligence = model.get("intelligence").unwrap();
        assert!(Arc::ptr_eq(&personality.keywords, &intelligence.keywords));

        let positives: Vec<_> = model
            .topics()
            .iter()
            .filter(|t| t.name.starts_with("positive_"))
            .collect();
        assert_eq!(positives.len(), 4);
        for topic in &positives[1..] {
            assert!(Arc::ptr_eq(&positives[0].keywords, &topic.keywords));
        }
    }

    #[test]
    fn test_anchor_and_keyword_lookup() {
        let model = TopicModel::cat_facts();
        assert_eq!(model.anchor("cat").unwrap().name, "cat");
        assert!(model.anchor("cats").is_none());

        let names: Vec<&str> = model.keyword_matches("cats").map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["cat"]);

        let names: Vec<&str> = model.keyword_matches("great").map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "positive_health",
                "positive_intelligence",
                "positive_personality",
                "positive_activities"
            ]
        );

        assert!(model.keyword_matches("the").next().is_none());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = TopicModel::new(vec![
            TopicDefinition::new("cat", Some(1)),
            TopicDefinition::new("cat", Some(2)),
        ])
        .unwrap_err();
        assert!(matches!(err, TopicsError::InvalidModel(_)));
    }

    #[test]
    fn test_rejects_zero_weight_and_empty_name() {
        assert!(TopicModel::new(vec![TopicDefinition::new("cat", Some(0))]).is_err());
        assert!(TopicModel::new(vec![TopicDefinition::new(" ", Some(1))]).is_err());
    }

    #[test]
    fn test_unweighted_topic_rank_and_depth() {
        let topic = TopicDefinition::new("anything", None);
        assert_eq!(topic.rank(), u32::MAX);
        assert_eq!(topic.depth(), 0);
    }

    #[test]
    fn test_get_unknown_topic() {
        let model = TopicModel::cat_facts();
        assert!(matches!(model.get("dog"), Err(TopicsError::NotFound(_))));
    }
}
