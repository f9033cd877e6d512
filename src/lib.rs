pub mod config;
pub mod error;
pub mod import;
pub mod reminder;
pub mod renewal;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::{PersistenceError, RenewalError, Result};
pub use import::{BatchImporter, Cell, ImportOutcome};
pub use reminder::{ReminderComposer, ReminderPayload, ReminderRequest};
pub use renewal::{ExpiryMode, RecordInput, UrgencyTier};
pub use storage::{Persistence, RecordStore, RenewalRecord};
