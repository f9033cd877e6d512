use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::renewal::{dates, urgency, UrgencyTier, ValidRecord};

/// One tracked payer/company service entry.
///
/// Serialises to the stored wire shape
/// `{id, payer, company, years, expiryDate, email}` with the expiry as
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalRecord {
    pub id: i64,
    pub payer: String,
    pub company: String,
    pub years: u32,
    pub expiry_date: NaiveDate,
    pub email: String,
}

impl RenewalRecord {
    pub fn new(id: i64, valid: ValidRecord, expiry_date: NaiveDate) -> Self {
        Self {
            id,
            payer: valid.payer,
            company: valid.company,
            years: valid.years,
            expiry_date,
            email: valid.email,
        }
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        dates::days_remaining(self.expiry_date, now)
    }

    pub fn urgency(&self, now: DateTime<Utc>) -> UrgencyTier {
        urgency::classify(self.days_remaining(now))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.days_remaining(now) < 0
    }

    /// The normalised `YYYY-MM-DD` expiry.
    pub fn expiry_string(&self) -> String {
        self.expiry_date.format("%Y-%m-%d").to_string()
    }
}
