pub mod composer;
pub mod sweep;
pub mod transport;

pub use composer::{escape_html, BodyFields, ReminderComposer, ReminderPayload, ReminderRequest};
pub use sweep::{ReminderSweep, SweepEntry, SweepSummary};
pub use transport::{HttpRelayTransport, LogTransport, MailTransport, TransportError};
