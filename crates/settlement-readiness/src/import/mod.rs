//! Loading entity records exported by the surrounding application.

mod roster;
mod snapshot;

pub use roster::RosterImporter;
pub use snapshot::EntitySnapshot;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error("threat rating for {settlement}: {field} = {value} is outside 1-5")]
    InvalidThreatRating {
        settlement: String,
        field: &'static str,
        value: u8,
    },
}
