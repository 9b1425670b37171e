mod repository;

pub use repository::*;

/// Default ledger file name, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "subscriptions.json";
