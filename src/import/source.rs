use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::import::Cell;

/// Column headings of the import sheet, in the fixed column order.
pub const TEMPLATE_HEADER: [&str; 5] = ["Payer", "Company", "Years", "Purchase date", "Contact email"];

/// Something that yields decoded spreadsheet rows, header first.
pub trait RowSource {
    fn rows(&self) -> Result<Vec<Vec<Cell>>>;
}

/// Rows stored as a JSON array of arrays, the shape a spreadsheet decoder
/// emits when asked for raw rows.
pub struct JsonRowSource {
    path: PathBuf,
}

impl JsonRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for JsonRowSource {
    fn rows(&self) -> Result<Vec<Vec<Cell>>> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Header plus two example rows, for users to fill in.
pub fn import_template() -> Vec<Vec<Cell>> {
    vec![
        TEMPLATE_HEADER.iter().map(|h| Cell::from(*h)).collect(),
        vec![
            "Zhang San".into(),
            "Test Technology Co., Ltd.".into(),
            "1".into(),
            "2025-01-01".into(),
            "zhangsan@example.com".into(),
        ],
        vec![
            "Li Si".into(),
            "Example Network Co.".into(),
            "2".into(),
            "2025-01-15".into(),
            "lisi@example.com".into(),
        ],
    ]
}
