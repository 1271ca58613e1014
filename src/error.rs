use std::path::PathBuf;

use thiserror::Error;

/// Problems with the structure or word list handed to `Puzzle`.
#[derive(Error, Debug)]
pub enum PuzzleError {
    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("the structure doesn't contain any fillable cells")]
    EmptyStructure,
    #[error("slot of length {length} exceeds the maximum slot length of {max}")]
    SlotTooLong { length: usize, max: usize },
    #[error("structure has {count} slots, more than the maximum of {max}")]
    TooManySlots { count: usize, max: usize },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write image")]
    Image(#[from] image::ImageError),
}
