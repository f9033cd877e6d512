use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{RenewalError, Result};
use crate::import::{BatchImporter, Cell, ImportOutcome};
use crate::renewal::{self, compute_expiry, ExpiryMode, RecordInput, ValidationError};
use crate::storage::{models::RenewalRecord, Persistence};

/// The in-memory record list plus the collaborator that persists it.
///
/// Every mutation builds the next list, saves it, and only then replaces the
/// in-memory copy; a failed save leaves the store exactly as it was.
pub struct RecordStore<P: Persistence> {
    persistence: P,
    records: Vec<RenewalRecord>,
    last_id: i64,
}

impl<P: Persistence> RecordStore<P> {
    /// Load existing records through `persistence`.
    pub fn open(persistence: P) -> Result<Self> {
        let records = persistence.load()?;
        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        debug!("Loaded {} renewal records", records.len());
        Ok(Self {
            persistence,
            records,
            last_id,
        })
    }

    pub fn records(&self) -> &[RenewalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: i64) -> Option<&RenewalRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records whose days remaining are at or below `horizon_days`,
    /// soonest first.
    pub fn flagged(&self, now: DateTime<Utc>, horizon_days: i64) -> Vec<&RenewalRecord> {
        let mut flagged: Vec<&RenewalRecord> = self
            .records
            .iter()
            .filter(|r| r.days_remaining(now) <= horizon_days)
            .collect();
        flagged.sort_by_key(|r| r.expiry_date);
        flagged
    }

    /// Validate a form submission and append it as a new record.
    pub fn create_record(
        &mut self,
        input: &RecordInput,
        mode: ExpiryMode,
        now: DateTime<Utc>,
    ) -> Result<RenewalRecord> {
        let valid = renewal::validate(input)?;
        let expiry = compute_expiry(mode, valid.date, valid.years)?;
        let id = self.reserve_ids(1, now);
        let record = RenewalRecord::new(id, valid, expiry);

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next)?;

        info!("Created record {} for {}", record.id, record.company);
        Ok(record)
    }

    /// Replace the record `id` with a re-validated submission, keeping its id.
    pub fn update_record(
        &mut self,
        id: i64,
        input: &RecordInput,
        mode: ExpiryMode,
    ) -> Result<RenewalRecord> {
        let index = self.index_of(id)?;
        let valid = renewal::validate(input)?;
        let expiry = compute_expiry(mode, valid.date, valid.years)?;
        let record = RenewalRecord::new(id, valid, expiry);

        let mut next = self.records.clone();
        next[index] = record.clone();
        self.commit(next)?;

        info!("Updated record {}", id);
        Ok(record)
    }

    /// Extend record `id` by `years`, counting from its stored expiry.
    pub fn renew_record(&mut self, id: i64, years: u32) -> Result<RenewalRecord> {
        if years < 1 {
            return Err(ValidationError::InvalidTermYears(years.to_string()).into());
        }
        let index = self.index_of(id)?;

        let mut record = self.records[index].clone();
        record.expiry_date = compute_expiry(ExpiryMode::Renewal, record.expiry_date, years)?;
        record.years = years;

        let mut next = self.records.clone();
        next[index] = record.clone();
        self.commit(next)?;

        info!("Renewed record {} until {}", id, record.expiry_string());
        Ok(record)
    }

    pub fn delete_record(&mut self, id: i64) -> Result<RenewalRecord> {
        let index = self.index_of(id)?;

        let mut next = self.records.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!("Deleted record {}", id);
        Ok(removed)
    }

    /// Bulk-ingest decoded spreadsheet rows. See [`BatchImporter`].
    pub fn import_batch(&mut self, rows: &[Vec<Cell>], now: DateTime<Utc>) -> Result<ImportOutcome> {
        BatchImporter::new().import(self, rows, now)
    }

    /// Hand out `count` consecutive ids starting at the returned base.
    ///
    /// Ids are epoch milliseconds when the clock is ahead of every issued id,
    /// otherwise one past the last issued id, so they never collide within a
    /// store even when several batches land in the same millisecond.
    pub(crate) fn reserve_ids(&mut self, count: usize, now: DateTime<Utc>) -> i64 {
        let base = now.timestamp_millis().max(self.last_id + 1);
        if count > 0 {
            self.last_id = base + count as i64 - 1;
        }
        base
    }

    /// Append `new_records` with a single save.
    pub(crate) fn append_all(&mut self, new_records: Vec<RenewalRecord>) -> Result<()> {
        if new_records.is_empty() {
            return Ok(());
        }
        let mut next = Vec::with_capacity(self.records.len() + new_records.len());
        next.extend(self.records.iter().cloned());
        next.extend(new_records);
        self.commit(next)
    }

    fn index_of(&self, id: i64) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(RenewalError::RecordNotFound(id))
    }

    fn commit(&mut self, next: Vec<RenewalRecord>) -> Result<()> {
        if let Err(e) = self.persistence.save(&next) {
            warn!("Failed to persist records: {}", e);
            return Err(e.into());
        }
        self.records = next;
        Ok(())
    }
}
