use std::path::PathBuf;

use colfold_table::Strength;
use thiserror::Error;

/// Errors surfaced by the folding runtime.
#[derive(Debug, Error)]
pub enum FoldError {
    /// Null buffer with nonzero size, a length below -1, a negative capacity,
    /// or a size that disagrees with the slice handed in.
    #[error("illegal argument: {0}")]
    IllegalArgument(&'static str),

    /// Destination too small; `needed` includes the terminator.
    #[error("buffer overflow: {needed} code units needed")]
    BufferOverflow { needed: usize },

    #[error("folding data missing: {}", .0.display())]
    ResourceMissing(PathBuf),

    #[error("no folding data is generated for {0} strength")]
    Unsupported(Strength),

    #[error("folding table invariant violated: {0}")]
    Internal(String),

    #[error("cannot load {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },
}
