//! Level catalogue, puzzle rules and run bookkeeping for the escape room.

pub mod error;
pub mod levels;
pub mod progress;
pub mod puzzle;
pub mod team;
pub mod timer;
pub mod widgets;

pub use error::QuestError;
pub use levels::{LevelCatalog, LevelDef, LevelKind, TOTAL_LEVELS};
pub use progress::{
    Completion, MemoryStore, Progress, ProgressStore, QuestSession, taunt,
};
pub use puzzle::{Outcome, Puzzle};
pub use team::Team;
pub use timer::{Countdown, format_elapsed, format_remaining};
