use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::reminder::composer::{ReminderComposer, ReminderRequest};
use crate::reminder::transport::MailTransport;
use crate::storage::RenewalRecord;

/// Per-record result of a reminder sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepEntry {
    pub record_id: i64,
    pub to: String,
    pub days_remaining: i64,
    pub delivered: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepSummary {
    pub sent: usize,
    pub failed: usize,
    pub entries: Vec<SweepEntry>,
}

/// Sends one reminder per due record through a shared transport.
pub struct ReminderSweep<'a> {
    composer: &'a ReminderComposer,
    transport: &'a dyn MailTransport,
}

impl<'a> ReminderSweep<'a> {
    pub fn new(composer: &'a ReminderComposer, transport: &'a dyn MailTransport) -> Self {
        Self {
            composer,
            transport,
        }
    }

    /// Remind every record in `due`. A failed delivery is counted and the
    /// sweep moves on; `on_progress` runs after each record.
    pub async fn run<F>(&self, due: &[&RenewalRecord], now: DateTime<Utc>, mut on_progress: F) -> SweepSummary
    where
        F: FnMut(&SweepEntry),
    {
        let mut summary = SweepSummary::default();

        for record in due {
            let request = ReminderRequest::for_record(record, now);
            let payload = self
                .composer
                .compose(&request, record.urgency(now), now);

            let delivered = match self.composer.deliver(self.transport, &payload).await {
                Ok(()) => {
                    summary.sent += 1;
                    true
                }
                Err(e) => {
                    warn!("Reminder for record {} not delivered: {}", record.id, e);
                    summary.failed += 1;
                    false
                }
            };

            let entry = SweepEntry {
                record_id: record.id,
                to: record.email.clone(),
                days_remaining: request.days_remaining,
                delivered,
            };
            on_progress(&entry);
            summary.entries.push(entry);
        }

        info!(
            "Reminder sweep complete: {} sent, {} failed",
            summary.sent, summary.failed
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::composer::ReminderPayload;
    use crate::reminder::transport::TransportError;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Mutex;

    /// Records every payload and refuses mail for one address.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<ReminderPayload>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, payload: &ReminderPayload) -> Result<(), TransportError> {
            if payload.to == "bounce@example.com" {
                return Err(TransportError::Rejected {
                    status: 550,
                    body: "no such mailbox".into(),
                });
            }
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn record(id: i64, email: &str, expiry: NaiveDate) -> RenewalRecord {
        RenewalRecord {
            id,
            payer: "Payer".into(),
            company: "Company".into(),
            years: 1,
            expiry_date: expiry,
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_sweep() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let records = vec![
            record(1, "a@example.com", NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()),
            record(2, "bounce@example.com", NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()),
            record(3, "c@example.com", NaiveDate::from_ymd_opt(2025, 6, 25).unwrap()),
        ];
        let due: Vec<&RenewalRecord> = records.iter().collect();

        let composer = ReminderComposer::new("noreply@example.com");
        let transport = RecordingTransport::default();
        let mut seen = Vec::new();

        let summary = ReminderSweep::new(&composer, &transport)
            .run(&due, now, |entry| seen.push(entry.record_id))
            .await;

        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(!summary.entries[1].delivered);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].subject.starts_with("[URGENT]"));
        assert!(sent[1].subject.starts_with("[RENEWAL]"));
    }
}
