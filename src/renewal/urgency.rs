use serde::{Deserialize, Serialize};
use std::fmt;

/// Records at or below this many days remaining are flagged for attention.
pub const FLAG_HORIZON_DAYS: i64 = 30;

/// How urgently a record needs renewing. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Normal,
    Medium,
    High,
    Critical,
}

/// Map days remaining to a tier. Expired records are `Critical`.
pub fn classify(days_remaining: i64) -> UrgencyTier {
    match days_remaining {
        d if d <= 7 => UrgencyTier::Critical,
        8..=15 => UrgencyTier::High,
        16..=30 => UrgencyTier::Medium,
        _ => UrgencyTier::Normal,
    }
}

impl UrgencyTier {
    /// Prefix for reminder subject lines.
    pub fn subject_prefix(&self) -> &'static str {
        match self {
            UrgencyTier::Critical => "[URGENT] ",
            UrgencyTier::High => "[IMPORTANT] ",
            UrgencyTier::Medium => "[RENEWAL] ",
            UrgencyTier::Normal => "",
        }
    }

    /// Accent colour used in rendered reminders.
    pub fn color(&self) -> &'static str {
        match self {
            UrgencyTier::Critical => "#F44336",
            UrgencyTier::High => "#FF5722",
            UrgencyTier::Medium | UrgencyTier::Normal => "#FF9800",
        }
    }

    /// Rows in this tier are highlighted in listings.
    pub fn is_flagged(&self) -> bool {
        *self != UrgencyTier::Normal
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyTier::Critical => write!(f, "Critical"),
            UrgencyTier::High => write!(f, "High"),
            UrgencyTier::Medium => write!(f, "Medium"),
            UrgencyTier::Normal => write!(f, "Normal"),
        }
    }
}
