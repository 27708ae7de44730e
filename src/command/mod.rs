mod commands;
mod history;
mod snapshot;

pub use commands::Command;
pub use history::{MAX_HISTORY_DEPTH, SnapshotHistory};
pub use snapshot::Snapshot;
