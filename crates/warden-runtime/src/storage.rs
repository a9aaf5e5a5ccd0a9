//! Ledger storage backends.
//!
//! [`RocksLedger`] is the durable backend: point events and role holders in
//! separate RocksDB column families. Event keys are
//! `subject bytes + 0x00 + big-endian timestamp + sequence`, so one prefix
//! scan covers a subject's bucket in timestamp order. [`MemoryLedger`] backs
//! tests and the simulation binary.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options, DB};

use warden_core::error::StoreError;
use warden_core::traits::{PointStore, RoleStore};
use warden_core::types::{ChannelId, PointEvent, RoleHolder, SubjectId, TimeRange};

// --- Column family names ---

const CF_EVENTS: &str = "events";
const CF_ROLES: &str = "roles";

const ALL_CFS: &[&str] = &[CF_EVENTS, CF_ROLES];

/// Separator after the subject bytes in event keys. Subject wire forms are
/// ASCII digits and `_`, so the zero byte never collides.
const KEY_SEPARATOR: u8 = 0x00;

/// RocksDB-backed durable ledger storage.
pub struct RocksLedger {
    db: DB,
    /// Per-process sequence disambiguating same-second appends. Seeded from
    /// the clock so keys stay unique across restarts.
    sequence: AtomicU64,
}

impl RocksLedger {
    /// Open or create the ledger database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let seed = std::time::UNIX_EPOCH
            .elapsed()
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        Ok(Self { db, sequence: AtomicU64::new(seed) })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Storage(format!("missing column family: {name}")))
    }

    fn event_prefix(subject: &SubjectId) -> Vec<u8> {
        let mut prefix = subject.to_string().into_bytes();
        prefix.push(KEY_SEPARATOR);
        prefix
    }

    fn event_key(&self, subject: &SubjectId, timestamp: u64) -> Vec<u8> {
        let mut key = Self::event_prefix(subject);
        key.extend_from_slice(&timestamp.to_be_bytes());
        key.extend_from_slice(
            &self.sequence.fetch_add(1, Ordering::Relaxed).to_be_bytes(),
        );
        key
    }

    /// Walk a subject's events inside `[range.start, range.end)`, feeding
    /// each decoded event to `visit`.
    fn scan_events(
        &self,
        subject: &SubjectId,
        range: TimeRange,
        mut visit: impl FnMut(&PointEvent),
    ) -> Result<(), StoreError> {
        let cf = self.cf(CF_EVENTS)?;
        let prefix = Self::event_prefix(subject);
        let mut start = prefix.clone();
        start.extend_from_slice(&range.start.to_be_bytes());

        for entry in self
            .db
            .iterator_cf(cf, IteratorMode::From(&start, Direction::Forward))
        {
            let (key, value) = entry.map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let ts_bytes: [u8; 8] = key[prefix.len()..prefix.len() + 8]
                .try_into()
                .map_err(|_| StoreError::QueryFailed("short event key".to_string()))?;
            if u64::from_be_bytes(ts_bytes) >= range.end {
                break;
            }
            let (event, _): (PointEvent, usize) =
                bincode::decode_from_slice(&value, bincode::config::standard())
                    .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            visit(&event);
        }
        Ok(())
    }
}

#[async_trait]
impl PointStore for RocksLedger {
    async fn append_event(&self, event: PointEvent) -> Result<(), StoreError> {
        let cf = self.cf(CF_EVENTS)?;
        let key = self.event_key(&event.subject, event.timestamp);
        let value = bincode::encode_to_vec(event, bincode::config::standard())
            .map_err(|e| StoreError::AppendFailed(e.to_string()))?;
        self.db
            .put_cf(cf, key, value)
            .map_err(|e| StoreError::AppendFailed(e.to_string()))
    }

    async fn sum_points(
        &self,
        subject: &SubjectId,
        range: TimeRange,
    ) -> Result<u64, StoreError> {
        let mut sum = 0u64;
        self.scan_events(subject, range, |event| sum += event.points as u64)?;
        Ok(sum)
    }

    async fn count_events(
        &self,
        subject: &SubjectId,
        range: TimeRange,
        zero_only: bool,
    ) -> Result<u64, StoreError> {
        let mut count = 0u64;
        self.scan_events(subject, range, |event| {
            if !zero_only || event.is_compensating() {
                count += 1;
            }
        })?;
        Ok(count)
    }
}

#[async_trait]
impl RoleStore for RocksLedger {
    async fn role_holder(&self, channel: ChannelId) -> Result<Option<RoleHolder>, StoreError> {
        let cf = self.cf(CF_ROLES)?;
        let value = self
            .db
            .get_cf(cf, channel.0.to_be_bytes())
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        match value {
            None => Ok(None),
            Some(bytes) => {
                let (holder, _): (RoleHolder, usize) =
                    bincode::decode_from_slice(&bytes, bincode::config::standard())
                        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
                Ok(Some(holder))
            }
        }
    }

    async fn set_role_holder(
        &self,
        channel: ChannelId,
        holder: RoleHolder,
    ) -> Result<(), StoreError> {
        let cf = self.cf(CF_ROLES)?;
        let value = bincode::encode_to_vec(holder, bincode::config::standard())
            .map_err(|e| StoreError::AppendFailed(e.to_string()))?;
        self.db
            .put_cf(cf, channel.0.to_be_bytes(), value)
            .map_err(|e| StoreError::AppendFailed(e.to_string()))
    }
}

/// In-memory ledger storage for tests and the simulation binary.
#[derive(Default)]
pub struct MemoryLedger {
    events: Mutex<Vec<PointEvent>>,
    holders: Mutex<HashMap<ChannelId, RoleHolder>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended events, in append order.
    pub fn events(&self) -> Vec<PointEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl PointStore for MemoryLedger {
    async fn append_event(&self, event: PointEvent) -> Result<(), StoreError> {
        self.events.lock().push(event);
        Ok(())
    }

    async fn sum_points(
        &self,
        subject: &SubjectId,
        range: TimeRange,
    ) -> Result<u64, StoreError> {
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| e.subject == *subject && range.contains(e.timestamp))
            .map(|e| e.points as u64)
            .sum())
    }

    async fn count_events(
        &self,
        subject: &SubjectId,
        range: TimeRange,
        zero_only: bool,
    ) -> Result<u64, StoreError> {
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| {
                e.subject == *subject
                    && range.contains(e.timestamp)
                    && (!zero_only || e.is_compensating())
            })
            .count() as u64)
    }
}

#[async_trait]
impl RoleStore for MemoryLedger {
    async fn role_holder(&self, channel: ChannelId) -> Result<Option<RoleHolder>, StoreError> {
        Ok(self.holders.lock().get(&channel).copied())
    }

    async fn set_role_holder(
        &self,
        channel: ChannelId,
        holder: RoleHolder,
    ) -> Result<(), StoreError> {
        self.holders.lock().insert(channel, holder);
        Ok(())
    }
}
