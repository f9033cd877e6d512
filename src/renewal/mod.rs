pub mod dates;
pub mod expiry;
pub mod urgency;
pub mod validator;

pub use expiry::{compute_expiry, ExpiryError, ExpiryForm, ExpiryMode};
pub use urgency::{classify, UrgencyTier};
pub use validator::{validate, Field, RecordInput, ValidRecord, ValidationError};
