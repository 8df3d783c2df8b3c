//! RocksDB fact store.
//!
//! The DB handle sits behind an `RwLock`:
//! - clean write and incremental create take the write lock, so readers never
//!   see a half-rebuilt table and id allocation is atomic
//! - fetch, stats and compaction take the read lock

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use catfacts_types::{FactRecord, NewFact, RejectedFact, TreeResult, NONE, ROOT_SUFFIX};

use crate::column_families::{
    build_cf_descriptors, cf_options, ALL_CF_NAMES, CF_FACTS, CF_FACT_TOPICS,
};
use crate::error::StorageError;
use crate::keys::{FactKey, TopicIndexKey};

/// Fetch key used when no topic filter is given.
pub const ALL_KEY: &str = "all";

/// Records grouped by requested topic (or [`ALL_KEY`]).
pub type FetchResult = BTreeMap<String, Vec<FactRecord>>;

/// Outcome of an incremental create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateReport {
    /// Number of records stored
    pub created: usize,
    /// Ids assigned, in submission order
    pub ids: Vec<u64>,
    /// Records that could not be parsed
    pub rejected: Vec<RejectedFact>,
}

/// Durable store of fact records.
pub struct FactStore {
    db: RwLock<DB>,
    path: PathBuf,
}

fn handle<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily, StorageError> {
    db.cf_handle(name)
        .ok_or_else(|| StorageError::ColumnFamilyNotFound(name.to_string()))
}

impl FactStore {
    /// Open the store at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening fact store at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(2);

        let db = DB::open_cf_descriptors(&db_opts, path, build_cf_descriptors())?;

        Ok(Self {
            db: RwLock::new(db),
            path: path.to_path_buf(),
        })
    }

    /// Directory holding the database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DB>, StorageError> {
        self.db.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DB>, StorageError> {
        self.db.write().map_err(|_| StorageError::LockPoisoned)
    }

    /// Highest stored id, read from the last key.
    fn load_max_id(db: &DB) -> Result<Option<u64>, StorageError> {
        let cf = handle(db, CF_FACTS)?;
        let mut iter = db.iterator_cf(cf, IteratorMode::End);
        if let Some(result) = iter.next() {
            let (key, _) = result?;
            return Ok(Some(FactKey::from_bytes(&key)?.id));
        }
        Ok(None)
    }

    /// Stage a record and its index entry.
    fn stage(db: &DB, batch: &mut WriteBatch, record: &FactRecord) -> Result<(), StorageError> {
        let facts_cf = handle(db, CF_FACTS)?;
        let index_cf = handle(db, CF_FACT_TOPICS)?;
        batch.put_cf(facts_cf, FactKey::new(record.id).to_bytes(), record.to_bytes()?);
        batch.put_cf(
            index_cf,
            TopicIndexKey::new(record.topic.as_str(), record.id).to_bytes(),
            b"",
        );
        Ok(())
    }

    /// Replace the whole table with the nodes of a tree.
    ///
    /// Ids restart at 0 and follow tree order. Returns the number of
    /// records written.
    #[instrument(skip(self, tree), fields(keys = tree.len()))]
    pub fn write_clean(&self, tree: &TreeResult) -> Result<usize, StorageError> {
        let mut guard = self.write()?;

        for name in ALL_CF_NAMES {
            if let Err(e) = guard.drop_cf(name) {
                warn!(cf = %name, error = %e, "Schema conflict while dropping table, continuing");
            }
            if guard.cf_handle(name).is_none() {
                guard.create_cf(name, &cf_options(name))?;
            }
        }

        let db: &DB = &guard;
        let records = FactRecord::from_tree(tree, 0);
        let mut batch = WriteBatch::default();
        for record in &records {
            Self::stage(db, &mut batch, record)?;
        }
        db.write(batch)?;

        info!(records = records.len(), "Clean write complete");
        Ok(records.len())
    }

    /// Append pre-classified records after the current max id.
    ///
    /// Each raw value is parsed on its own; malformed ones are reported in
    /// [`CreateReport::rejected`] and do not block the rest.
    #[instrument(skip(self, values), fields(submitted = values.len()))]
    pub fn create(&self, values: Vec<serde_json::Value>) -> Result<CreateReport, StorageError> {
        let mut report = CreateReport::default();
        let mut accepted = Vec::with_capacity(values.len());

        for (index, value) in values.into_iter().enumerate() {
            match NewFact::from_value(value) {
                Ok(fact) => accepted.push(fact),
                Err(e) => {
                    warn!(index, error = %e, "Rejected malformed record");
                    report.rejected.push(RejectedFact {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if accepted.is_empty() {
            return Ok(report);
        }

        let guard = self.write()?;
        let db: &DB = &guard;
        let mut next_id = Self::load_max_id(db)?.map_or(0, |id| id + 1);

        let mut batch = WriteBatch::default();
        for fact in accepted {
            let record = fact.into_record(next_id);
            Self::stage(db, &mut batch, &record)?;
            report.ids.push(next_id);
            next_id += 1;
        }
        db.write(batch)?;

        report.created = report.ids.len();
        debug!(created = report.created, "Stored new records");
        Ok(report)
    }

    /// Fetch records, either all of them or grouped by the given topics.
    ///
    /// Unknown topics map to an empty list.
    #[instrument(skip(self))]
    pub fn fetch(&self, topics: Option<&[String]>) -> Result<FetchResult, StorageError> {
        let guard = self.read()?;
        let db: &DB = &guard;

        let mut result = FetchResult::new();
        match topics {
            None => {
                result.insert(ALL_KEY.to_string(), Self::scan_all(db)?);
            }
            Some(topics) => {
                for topic in topics {
                    let records = Self::scan_topic(db, topic)?;
                    debug!(topic = %topic, count = records.len(), "Fetched topic");
                    result.insert(topic.clone(), records);
                }
            }
        }
        Ok(result)
    }

    /// Get a single record by id.
    pub fn get(&self, id: u64) -> Result<Option<FactRecord>, StorageError> {
        let guard = self.read()?;
        let db: &DB = &guard;
        let cf = handle(db, CF_FACTS)?;
        match db.get_cf(cf, FactKey::new(id).to_bytes())? {
            Some(bytes) => Ok(Some(FactRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Highest stored id, `None` when the store is empty.
    pub fn max_id(&self) -> Result<Option<u64>, StorageError> {
        let guard = self.read()?;
        Self::load_max_id(&guard)
    }

    fn scan_all(db: &DB) -> Result<Vec<FactRecord>, StorageError> {
        let cf = handle(db, CF_FACTS)?;
        let mut records = Vec::new();
        for item in db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            records.push(FactRecord::from_bytes(&value)?);
        }
        Ok(records)
    }

    fn scan_topic(db: &DB, topic: &str) -> Result<Vec<FactRecord>, StorageError> {
        let index_cf = handle(db, CF_FACT_TOPICS)?;
        let facts_cf = handle(db, CF_FACTS)?;
        let prefix = TopicIndexKey::prefix(topic);

        let mut records = Vec::new();
        let iter = db.iterator_cf(index_cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let index_key = TopicIndexKey::from_bytes(&key)?;
            // `topic:a:` also prefixes entries for a topic named `a:b`.
            if index_key.topic != topic {
                continue;
            }
            match db.get_cf(facts_cf, FactKey::new(index_key.id).to_bytes())? {
                Some(bytes) => records.push(FactRecord::from_bytes(&bytes)?),
                None => warn!(id = index_key.id, topic, "Index entry without record"),
            }
        }
        Ok(records)
    }

    /// Flush all column families to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        let guard = self.read()?;
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = guard.cf_handle(cf_name) {
                guard.flush_cf(cf)?;
            }
        }
        Ok(())
    }

    /// Trigger manual compaction on all column families.
    pub fn compact(&self) -> Result<(), StorageError> {
        let guard = self.read()?;
        info!("Starting full compaction...");
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = guard.cf_handle(cf_name) {
                guard.compact_range_cf::<&[u8], &[u8]>(cf, None, None);
            }
        }
        info!("Compaction complete");
        Ok(())
    }

    /// Get store statistics.
    pub fn stats(&self) -> Result<StoreStats, StorageError> {
        let guard = self.read()?;
        let db: &DB = &guard;

        let mut stats = StoreStats::default();
        let mut topics = BTreeSet::new();
        for record in Self::scan_all(db)? {
            stats.record_count += 1;
            if record.fact == NONE && record.topic.ends_with(ROOT_SUFFIX) {
                stats.root_count += 1;
            } else {
                topics.insert(record.topic);
            }
        }
        stats.topic_count = topics.len() as u64;
        stats.max_id = Self::load_max_id(db)?;
        stats.disk_usage_bytes = self.get_disk_usage();

        Ok(stats)
    }

    fn get_disk_usage(&self) -> u64 {
        let mut total_size = 0u64;
        if let Ok(entries) = std::fs::read_dir(&self.path) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }
        total_size
    }
}

/// Statistics about the store.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of stored records, roots included
    pub record_count: u64,
    /// Distinct topics holding facts
    pub topic_count: u64,
    /// Number of root records
    pub root_count: u64,
    /// Highest id in use
    pub max_id: Option<u64>,
    /// Total disk usage in bytes
    pub disk_usage_bytes: u64,
}
