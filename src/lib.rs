pub mod config;
pub mod engine;
pub mod error;

pub use colfold_table::Strength;
pub use config::FoldConfig;
pub use engine::{CollationFolding, FoldOutcome, FoldStatus};
pub use error::FoldError;

/// Opens a folding instance for `locale` at `strength`, reading tables from
/// `COLF_DATA_DIR`.
pub fn open(locale: &str, strength: Strength) -> Result<CollationFolding, FoldError> {
    CollationFolding::open(locale, strength)
}

/// Releases an instance. Equivalent to dropping it.
pub fn close(handle: CollationFolding) {
    drop(handle);
}
