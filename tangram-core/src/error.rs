use thiserror::Error;

#[derive(Error, Debug)]
pub enum TangramError {
    #[error("invalid shapes file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("shape `{id}` has {count} vertices, at least 3 are required")]
    DegenerateShape { id: String, count: usize },

    #[error("shape catalogue has no pieces")]
    NoPieces,

    #[error("unknown shape id `{0}`")]
    UnknownShape(String),

    #[error("rotation step {0} is outside 0..8")]
    BadRotation(u8),
}
