//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use quire_core::journal::{
    EntryAudit, EntryKind, EntryStatus, JournalEntry, JournalLine, NewJournalEntry,
};
use quire_core::store::{
    EntryFilter, EntryStore, ReversalWrite, StatusUpdate, StoreError, TransitionMetadata,
};
use quire_core::{Actor, EngineSettings, JournalEngine};
use quire_shared::types::{EntryId, UserId};
use quire_store::InMemoryEntryStore;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn actor() -> Actor {
    Actor::with_all_capabilities(UserId::new())
}

/// A two-line entry debiting 6100 and crediting 1000.
pub fn new_entry(
    reference: &str,
    on: NaiveDate,
    status: EntryStatus,
    debit: Decimal,
    credit: Decimal,
) -> NewJournalEntry {
    NewJournalEntry {
        reference: reference.to_string(),
        memo: format!("{reference} memo"),
        kind: EntryKind::Journal,
        status,
        date: on,
        lines: vec![
            JournalLine::debit("6100", debit),
            JournalLine::credit("1000", credit),
        ],
        audit: EntryAudit::default(),
    }
}

pub fn memory_engine() -> (Arc<InMemoryEntryStore>, JournalEngine<InMemoryEntryStore>) {
    let store = Arc::new(InMemoryEntryStore::new());
    let engine = JournalEngine::new(Arc::clone(&store), EngineSettings::default());
    (store, engine)
}

pub fn faulty_engine() -> (Arc<FaultyStore>, JournalEngine<FaultyStore>) {
    let store = Arc::new(FaultyStore::default());
    let engine = JournalEngine::new(Arc::clone(&store), EngineSettings::default());
    (store, engine)
}

/// Wraps the in-memory store to count calls and inject failures.
#[derive(Debug)]
pub struct FaultyStore {
    pub inner: InMemoryEntryStore,
    calls: AtomicUsize,
    creates: AtomicUsize,
    get_unavailable: AtomicBool,
    creates_before_outage: AtomicUsize,
    approve_behind_our_back: AtomicBool,
}

impl Default for FaultyStore {
    fn default() -> Self {
        Self {
            inner: InMemoryEntryStore::new(),
            calls: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            get_unavailable: AtomicBool::new(false),
            creates_before_outage: AtomicUsize::new(usize::MAX),
            approve_behind_our_back: AtomicBool::new(false),
        }
    }
}

impl FaultyStore {
    /// Store calls made through this wrapper.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Seeds an entry without counting the call.
    pub async fn seed(&self, entry: NewJournalEntry) -> EntryId {
        self.inner.create(entry).await.unwrap()
    }

    /// Makes every `get` fail.
    pub fn fail_gets(&self) {
        self.get_unavailable.store(true, Ordering::SeqCst);
    }

    /// Lets `n` creates succeed, then reports the store as unavailable.
    pub fn fail_creates_after(&self, n: usize) {
        self.creates_before_outage.store(n, Ordering::SeqCst);
    }

    /// Approves pending entries right after they are read, as a
    /// concurrent writer would.
    pub fn race_approvals(&self) {
        self.approve_behind_our_back.store(true, Ordering::SeqCst);
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl EntryStore for FaultyStore {
    async fn get(&self, ids: &[EntryId]) -> Result<Vec<JournalEntry>, StoreError> {
        self.tick();
        if self.get_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }

        let entries = self.inner.get(ids).await?;
        if self.approve_behind_our_back.load(Ordering::SeqCst) {
            for entry in entries
                .iter()
                .filter(|e| e.status == EntryStatus::PendingApproval)
            {
                self.inner
                    .update_status(StatusUpdate {
                        id: entry.id,
                        expected_status: entry.status,
                        expected_version: entry.version,
                        new_status: EntryStatus::Approved,
                        metadata: TransitionMetadata {
                            actor: UserId::new(),
                            at: Utc::now(),
                            comments: None,
                            reason: None,
                        },
                    })
                    .await?;
            }
        }
        Ok(entries)
    }

    async fn update_status(&self, update: StatusUpdate) -> Result<JournalEntry, StoreError> {
        self.tick();
        self.inner.update_status(update).await
    }

    async fn create(&self, entry: NewJournalEntry) -> Result<EntryId, StoreError> {
        self.tick();
        let n = self.creates.fetch_add(1, Ordering::SeqCst);
        if n >= self.creates_before_outage.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write timeout".to_string()));
        }
        self.inner.create(entry).await
    }

    async fn query(&self, filter: &EntryFilter) -> Result<Vec<JournalEntry>, StoreError> {
        self.tick();
        self.inner.query(filter).await
    }

    async fn reverse(&self, reversal: ReversalWrite) -> Result<EntryId, StoreError> {
        self.tick();
        self.inner.reverse(reversal).await
    }
}
