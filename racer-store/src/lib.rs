pub mod config;
mod store;

pub use config::StoreConfig;
pub use store::{DiskRecords, FileArtifacts, LedgerRow, SqliteLedger};
