//! Column family definitions for RocksDB.
//!
//! - facts: fact records keyed by id
//! - fact_topics: topic -> id index for fetch-by-topic
//!
//! Both are dropped and recreated together on a clean write.

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for fact records
pub const CF_FACTS: &str = "facts";

/// Column family name for the topic index
pub const CF_FACT_TOPICS: &str = "fact_topics";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_FACTS, CF_FACT_TOPICS];

/// Options for the facts table (compressed, rewritten wholesale on rebuild)
pub fn facts_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Options for a column family by name
pub fn cf_options(name: &str) -> Options {
    match name {
        CF_FACTS => facts_options(),
        _ => Options::default(),
    }
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    ALL_CF_NAMES
        .iter()
        .map(|name| ColumnFamilyDescriptor::new(*name, cf_options(name)))
        .collect()
}
