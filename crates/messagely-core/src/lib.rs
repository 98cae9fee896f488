pub mod config;
pub mod convert;
pub mod directory;
pub mod error;
pub mod store;

use std::sync::Arc;

use messagely_db::Database;

pub use config::Config;
pub use directory::UserDirectory;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use store::MessageStore;

/// Opens the database named by `config` and builds the store handle that the
/// request layer holds for the lifetime of the process.
pub fn open(config: &Config) -> anyhow::Result<MessageStore> {
    let db = Arc::new(Database::open(&config.db_path)?);
    Ok(MessageStore::new(db, config.max_body_len))
}
