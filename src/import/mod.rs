pub mod batch;
pub mod cells;
pub mod source;

pub use batch::{BatchImporter, ImportOutcome, RowFailure, DISPLAYED_FAILURES};
pub use cells::Cell;
pub use source::{import_template, JsonRowSource, RowSource, TEMPLATE_HEADER};
