#![forbid(unsafe_code)]

mod store;

pub use store::{DB_VERSION, SqliteStore, StoreError, UpgradeOutcome, default_db_path};
pub use store::{CreateRoundRequest, RevealTwistRequest};
