//! Shared keyword tables for the built-in cat facts model.
//!
//! Several topics match on the same words (every `positive_*` topic shares one
//! table, personality and intelligence share the trait table). Each table is
//! built once and handed out as a [`KeywordSet`] so those topics point at the
//! same set.
//!
//! Plurals and word forms are listed explicitly since matching does no
//! stemming.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::normalize::normalize;

/// Shared, immutable set of normalized keywords.
pub type KeywordSet = Arc<BTreeSet<String>>;

/// Build a keyword set from one or more word lists.
pub fn keyword_set(lists: &[&[&str]]) -> KeywordSet {
    Arc::new(
        lists
            .iter()
            .flat_map(|list| list.iter())
            .map(|word| normalize(word))
            .filter(|word| !word.is_empty())
            .collect(),
    )
}

pub const CAT_WORDS: &[&str] = &[
    "animal", "animals", "pet", "pets", "feline", "felines", "cats", "kitten", "kittens", "kitty",
];

pub const PERSON_WORDS: &[&str] = &[
    "people",
    "human",
    "humans",
    "persons",
    "caretakers",
    "caretaker",
    "owner",
    "owners",
];

/// Physical descriptors shared by appearance, personality, intelligence and health.
pub const TRAIT_WORDS: &[&str] = &[
    "cute", "look", "color", "adorable", "small", "big", "large", "size", "fat", "skinny",
    "strong", "robust", "muscular", "muscle", "hard", "soft",
];

pub const APPEARANCE_EXTRA_WORDS: &[&str] = &[
    "hair", "breed", "type", "bred", "grown", "grow", "head", "breeds", "largest", "smallest",
    "larger", "smaller", "biggest", "bigger", "softest", "softer", "hariest", "harier",
    "fluffiest", "fluffier", "hardest", "harder", "paw", "paws", "feet", "foot", "arm", "tail",
    "tails", "claw", "claws", "fluff", "fur", "fingers", "finger", "toes", "toe", "nails", "nail",
];

pub const HEALTH_EXTRA_WORDS: &[&str] = &["hair", "life", "live", "expectancy", "normal"];

pub const ACTIVITY_WORDS: &[&str] = &[
    "run", "running", "play", "playing", "walk", "walking", "stalk", "stalking", "ran", "played",
    "walked", "stalked", "talking", "talked", "talks", "runs", "plays", "walks", "stalks",
    "hunts", "hunted", "hunting", "hunt", "catch", "caught", "catching", "catches", "bites",
    "bit", "bite", "prey", "preyed", "preying", "preys", "meows", "meowing", "meowed", "meow",
    "cries", "crying", "cried", "cry", "yell", "yells", "yelled", "yelling", "yawn", "yawns",
    "yawning", "kill", "kills", "killing", "killed",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "best",
    "fantastic",
    "incredible",
    "wonderful",
    "amazing",
    "powerful",
    "smart",
    "intelligent",
    "better",
    "healthy",
    "beautiful",
    "super",
    "superb",
    "awesome",
    "love",
    "loving",
    "fastest",
    "fast",
    "faster",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "lame",
    "worst",
    "worse",
    "stupid",
    "dumb",
    "pointless",
    "idiotic",
    "moronic",
    "weird",
    "odd",
    "goofy",
    "terrible",
    "awful",
    "unhealthy",
    "ugly",
    "hate",
    "hateful",
    "slowest",
    "slower",
    "slow",
];

/// The keyword tables used by the built-in model, each built once.
#[derive(Debug, Clone)]
pub struct CatFactsKeywords {
    pub cat: KeywordSet,
    pub person: KeywordSet,
    pub appearance: KeywordSet,
    pub traits: KeywordSet,
    pub health: KeywordSet,
    pub activities: KeywordSet,
    pub positive: KeywordSet,
    pub negative: KeywordSet,
}

impl CatFactsKeywords {
    /// Build every table.
    pub fn build() -> Self {
        Self {
            cat: keyword_set(&[CAT_WORDS]),
            person: keyword_set(&[PERSON_WORDS]),
            appearance: keyword_set(&[TRAIT_WORDS, APPEARANCE_EXTRA_WORDS]),
            traits: keyword_set(&[TRAIT_WORDS]),
            health: keyword_set(&[TRAIT_WORDS, HEALTH_EXTRA_WORDS]),
            activities: keyword_set(&[ACTIVITY_WORDS]),
            positive: keyword_set(&[POSITIVE_WORDS]),
            negative: keyword_set(&[NEGATIVE_WORDS]),
        }
    }
}
