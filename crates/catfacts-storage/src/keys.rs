//! Key encoding and decoding for the fact store.
//!
//! Ids are zero-padded to 20 digits so lexicographic key order equals
//! numeric id order, which lets the max id be read from the last key.

use crate::error::StorageError;

/// Key for a fact record
/// Format: fact:{id:020}
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FactKey {
    /// Record id
    pub id: u64,
}

impl FactKey {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// Encode key to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("fact:{:020}", self.id).into_bytes()
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

        let id = s
            .strip_prefix("fact:")
            .ok_or_else(|| StorageError::Key(format!("Invalid fact key format: {}", s)))?;
        let id: u64 = id
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid id: {}", e)))?;

        Ok(Self { id })
    }
}

/// Key for the topic index
/// Format: topic:{topic}:{id:020}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicIndexKey {
    pub topic: String,
    pub id: u64,
}

impl TopicIndexKey {
    pub fn new(topic: impl Into<String>, id: u64) -> Self {
        Self {
            topic: topic.into(),
            id,
        }
    }

    /// Encode key to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("topic:{}:{:020}", self.topic, self.id).into_bytes()
    }

    /// Prefix covering every id indexed under a topic
    pub fn prefix(topic: &str) -> Vec<u8> {
        format!("topic:{}:", topic).into_bytes()
    }

    /// Decode key from bytes
    ///
    /// Splits on the last colon so topic names may themselves contain colons.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

        let rest = s
            .strip_prefix("topic:")
            .ok_or_else(|| StorageError::Key(format!("Invalid topic key format: {}", s)))?;
        let (topic, id) = rest
            .rsplit_once(':')
            .ok_or_else(|| StorageError::Key(format!("Invalid topic key format: {}", s)))?;
        let id: u64 = id
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid id: {}", e)))?;

        Ok(Self::new(topic, id))
    }
}
