pub mod db;
pub mod json_file;
pub mod models;
pub mod store;

pub use db::SqlitePersistence;
pub use json_file::JsonFilePersistence;
pub use models::RenewalRecord;
pub use store::RecordStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::PersistenceError;

/// Where the record list lives between runs.
///
/// Both calls are all-or-nothing: `save` either replaces the stored list
/// completely or leaves it as it was.
pub trait Persistence: Send + Sync {
    fn load(&self) -> Result<Vec<RenewalRecord>, PersistenceError>;
    fn save(&self, records: &[RenewalRecord]) -> Result<(), PersistenceError>;
}

impl<T: Persistence + ?Sized> Persistence for Box<T> {
    fn load(&self) -> Result<Vec<RenewalRecord>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, records: &[RenewalRecord]) -> Result<(), PersistenceError> {
        (**self).save(records)
    }
}

/// Open the backend selected in configuration.
pub fn open_backend(config: &StorageConfig) -> Result<Box<dyn Persistence>, PersistenceError> {
    Ok(match config.backend {
        StorageBackend::Json => Box::new(JsonFilePersistence::new(&config.path)),
        StorageBackend::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(SqlitePersistence::new(&config.path)?)
        }
    })
}
