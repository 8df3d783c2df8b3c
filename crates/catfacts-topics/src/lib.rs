//! # catfacts-topics
//!
//! Weighted keyword topic model and the fact classifier built on it.
//!
//! Facts are normalized into tokens and matched against a static registry
//! of topics. A token naming a topic anchors the fact there; otherwise the
//! most general keyword match wins. Classified facts are grouped into a
//! [`TreeResult`](catfacts_types::TreeResult) with a root node for every
//! topic holding a top-level fact.
//!
//! ## Usage
//!
//! ```rust
//! use catfacts_topics::Classifier;
//!
//! let classifier = Classifier::cat_facts();
//! let tree = classifier.classify(["Cats are great hunters and very smart."]);
//! assert_eq!(tree.facts("cat").len(), 1);
//! assert!(tree.has_root("cat"));
//! ```

pub mod classifier;
pub mod error;
pub mod keywords;
pub mod model;
pub mod normalize;

pub use classifier::{ClassificationStats, Classifier, MatchKind};
pub use error::TopicsError;
pub use keywords::{keyword_set, CatFactsKeywords, KeywordSet};
pub use model::{TopicDefinition, TopicModel};
pub use normalize::{normalize, tokenize};
