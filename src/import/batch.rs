use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{RenewalError, Result};
use crate::import::Cell;
use crate::renewal::{self, compute_expiry, ExpiryMode, RecordInput};
use crate::storage::{models::RenewalRecord, Persistence, RecordStore};

/// How many row failures a summary lists before collapsing the rest.
pub const DISPLAYED_FAILURES: usize = 5;

/// One rejected row. `row` is the 1-based sheet row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub reason: String,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.reason)
    }
}

/// Result of one batch import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
    pub imported_ids: Vec<i64>,
}

impl ImportOutcome {
    /// The failures shown to a user; the rest are counted by
    /// [`hidden_failures`](Self::hidden_failures).
    pub fn displayed_failures(&self) -> &[RowFailure] {
        &self.failures[..self.failures.len().min(DISPLAYED_FAILURES)]
    }

    pub fn hidden_failures(&self) -> usize {
        self.failures.len().saturating_sub(DISPLAYED_FAILURES)
    }

    /// Human-readable report of the batch.
    pub fn summary(&self) -> String {
        let mut message = format!("Import complete. Succeeded: {}", self.succeeded);
        if self.failed > 0 {
            message.push_str(&format!(", failed: {}", self.failed));
            message.push_str("\nErrors:");
            for failure in self.displayed_failures() {
                message.push_str(&format!("\n{}", failure));
            }
            if self.hidden_failures() > 0 {
                message.push_str(&format!("\n...and {} more errors", self.hidden_failures()));
            }
        }
        message
    }
}

/// Validates spreadsheet rows and bulk-inserts the good ones.
///
/// Rows are `(payer, company, years, purchase date, email)` after a header
/// row, always read in initial-purchase mode. A bad row is recorded and
/// skipped; it never stops the rows after it.
#[derive(Debug, Default)]
pub struct BatchImporter;

impl BatchImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import<P: Persistence>(
        &self,
        store: &mut RecordStore<P>,
        rows: &[Vec<Cell>],
        now: DateTime<Utc>,
    ) -> Result<ImportOutcome> {
        if rows.len() < 2 {
            return Err(RenewalError::NoRows);
        }

        info!("Importing {} data rows", rows.len() - 1);

        let mut outcome = ImportOutcome::default();
        let mut pending = Vec::new();

        for (index, row) in rows.iter().enumerate().skip(1) {
            let row_number = index + 1;

            let Some(input) = Self::row_input(row) else {
                debug!("Skipping empty row {}", row_number);
                outcome.skipped += 1;
                continue;
            };

            let prepared = renewal::validate(&input).map_err(|e| e.to_string()).and_then(|valid| {
                compute_expiry(ExpiryMode::InitialPurchase, valid.date, valid.years)
                    .map(|expiry| (valid, expiry))
                    .map_err(|e| e.to_string())
            });

            match prepared {
                Ok(entry) => pending.push(entry),
                Err(reason) => {
                    warn!("Row {} rejected: {}", row_number, reason);
                    outcome.failed += 1;
                    outcome.failures.push(RowFailure {
                        row: row_number,
                        reason,
                    });
                }
            }
        }

        let base_id = store.reserve_ids(pending.len(), now);
        let records: Vec<RenewalRecord> = pending
            .into_iter()
            .enumerate()
            .map(|(offset, (valid, expiry))| RenewalRecord::new(base_id + offset as i64, valid, expiry))
            .collect();

        outcome.succeeded = records.len();
        outcome.imported_ids = records.iter().map(|r| r.id).collect();

        store.append_all(records)?;

        info!(
            "Import finished: {} succeeded, {} failed, {} skipped",
            outcome.succeeded, outcome.failed, outcome.skipped
        );

        Ok(outcome)
    }

    /// `None` for rows without a payer value.
    fn row_input(row: &[Cell]) -> Option<RecordInput> {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();

        if cell(0).is_blank() {
            return None;
        }

        Some(RecordInput {
            payer: cell(0).to_text(),
            company: cell(1).to_text(),
            years: cell(2).to_text(),
            date: cell(3).to_date_text(),
            email: cell(4).to_text(),
        })
    }
}
