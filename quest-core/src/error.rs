use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestError {
    #[error("invalid level data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level ids must run 1..={expected_last} without gaps, found {found} at position {position}")]
    NonContiguousLevels {
        expected_last: usize,
        position: usize,
        found: u8,
    },

    #[error("no level with id {0}")]
    UnknownLevel(u8),

    #[error("{field}: {reason}")]
    InvalidTeam {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{what} index {index} is out of range")]
    OutOfRange { what: &'static str, index: usize },

    #[error("crossword cell ({row}, {col}) is not part of the grid")]
    NotEditable { row: usize, col: usize },

    #[error("storage error: {0}")]
    Storage(String),
}
