use std::collections::BTreeMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::QuestError;
use crate::levels::{LevelCatalog, LevelDef, TOTAL_LEVELS};
use crate::puzzle::{Outcome, Puzzle};
use crate::team::Team;

pub const TEAM_KEY: &str = "lockstep_team";
pub const LEVEL_KEY: &str = "lockstep_level";
pub const COMPLETION_KEY: &str = "lockstep_completion";
pub const HISTORY_KEY: &str = "lockstep_completion_history";

const TAUNTS: [&str; 5] = [
    "IMPUDENT FOOL! YOU'VE BYPASSED ONE LAYER, BUT MY MAINFRAME REMAINS ABSOLUTE.",
    "DO YOU THINK ONE DECRYPTED NODE MAKES YOU AN AGENT? PATHETIC.",
    "YOU'RE NAVIGATING MY WORLD NOW. DON'T GET COMFORTABLE.",
    "A MINOR SETBACK. MY SYSTEM HAS BILLIONS OF PROCESSES YOU CANNOT COMPREHEND.",
    "INCONSIDERABLE PROGRESS. THE DOOMSDAY CLOCK STILL TICKS.",
];

/// Message shown after clearing `level`.
pub fn taunt(level: u8) -> &'static str {
    TAUNTS[usize::from(level.saturating_sub(1)) % TAUNTS.len()]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub team_name: String,
    pub completion_time_seconds: u64,
    pub completed_at: u64,
    pub start_time: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub team: Team,
    pub current_level: u8,
    pub started_at_ms: u64,
    pub completed: Option<Completion>,
}

impl Progress {
    pub fn new(team: Team, now_ms: u64) -> Self {
        Progress {
            team,
            current_level: 1,
            started_at_ms: now_ms,
            completed: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    fn advance(&mut self, now_ms: u64) -> Option<&Completion> {
        if self.completed.is_some() {
            return None;
        }
        if self.current_level < TOTAL_LEVELS {
            self.current_level += 1;
            return None;
        }
        self.completed = Some(Completion {
            team_name: self.team.name.clone(),
            completion_time_seconds: now_ms.saturating_sub(self.started_at_ms) / 1000,
            completed_at: now_ms,
            start_time: self.started_at_ms,
        });
        self.completed.as_ref()
    }

    /// Move past the current level. Returns the completion record when this
    /// was the last one.
    pub fn record_solve(&mut self, now_ms: u64) -> Option<&Completion> {
        self.advance(now_ms)
    }

    pub fn skip(&mut self, now_ms: u64) -> Option<&Completion> {
        self.advance(now_ms)
    }

    pub fn previous(&mut self) {
        if self.completed.is_none() && self.current_level > 1 {
            self.current_level -= 1;
        }
    }

    pub fn reset_to_first(&mut self) {
        self.current_level = 1;
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamRecord {
    team_name: String,
    agent1: String,
    agent2: String,
    start_time: u64,
}

/// String key/value persistence, `localStorage` style.
pub trait ProgressStore {
    fn read(&self, key: &str) -> Result<Option<String>, QuestError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), QuestError>;
    fn remove(&mut self, key: &str) -> Result<(), QuestError>;

    fn load(&self) -> Result<Option<Progress>, QuestError> {
        let Some(raw) = self.read(TEAM_KEY)? else {
            return Ok(None);
        };
        let record: TeamRecord = serde_json::from_str(&raw)?;
        let current_level = match self.read(LEVEL_KEY)? {
            Some(v) => match v.trim().parse::<u8>() {
                Ok(n) if (1..=TOTAL_LEVELS).contains(&n) => n,
                _ => {
                    warn!("ignoring stored level {v:?}");
                    1
                }
            },
            None => 1,
        };
        // an old completion from an earlier run does not count
        let completed = match self.read(COMPLETION_KEY)? {
            Some(v) => serde_json::from_str::<Completion>(&v)
                .ok()
                .filter(|c| c.start_time == record.start_time),
            None => None,
        };
        Ok(Some(Progress {
            team: Team {
                name: record.team_name,
                agent1: record.agent1,
                agent2: record.agent2,
            },
            current_level,
            started_at_ms: record.start_time,
            completed,
        }))
    }

    fn save(&mut self, progress: &Progress) -> Result<(), QuestError> {
        let record = TeamRecord {
            team_name: progress.team.name.clone(),
            agent1: progress.team.agent1.clone(),
            agent2: progress.team.agent2.clone(),
            start_time: progress.started_at_ms,
        };
        self.write(TEAM_KEY, &serde_json::to_string(&record)?)?;
        self.write(LEVEL_KEY, &progress.current_level.to_string())?;
        if let Some(c) = &progress.completed {
            self.write(COMPLETION_KEY, &serde_json::to_string(c)?)?;
        }
        Ok(())
    }

    /// Log out: forget the team and its level, keep completions.
    fn clear(&mut self) -> Result<(), QuestError> {
        self.remove(TEAM_KEY)?;
        self.remove(LEVEL_KEY)
    }

    fn push_history(&mut self, completion: &Completion) -> Result<(), QuestError> {
        let mut all = self.history()?;
        all.push(completion.clone());
        self.write(HISTORY_KEY, &serde_json::to_string(&all)?)
    }

    fn history(&self) -> Result<Vec<Completion>, QuestError> {
        match self.read(HISTORY_KEY)? {
            Some(v) => Ok(serde_json::from_str(&v)?),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl ProgressStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, QuestError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), QuestError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), QuestError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A team's run through the levels: the catalogue, the live puzzle and
/// the persisted progress.
pub struct QuestSession<S: ProgressStore> {
    catalog: LevelCatalog,
    progress: Progress,
    puzzle: Option<Puzzle>,
    store: S,
}

impl<S: ProgressStore> QuestSession<S> {
    /// Fails when an unfinished run points at a level the catalogue lacks.
    pub fn new(catalog: LevelCatalog, progress: Progress, store: S) -> Result<Self, QuestError> {
        if !progress.is_complete() && catalog.get(progress.current_level).is_none() {
            return Err(QuestError::UnknownLevel(progress.current_level));
        }
        let mut session = QuestSession {
            catalog,
            progress,
            puzzle: None,
            store,
        };
        session.load_puzzle();
        Ok(session)
    }

    /// Register a fresh run and persist it.
    pub fn start(team: Team, now_ms: u64, mut store: S) -> Result<Self, QuestError> {
        let progress = Progress::new(team, now_ms);
        store.save(&progress)?;
        info!("team {} started", progress.team.name);
        Self::new(LevelCatalog::builtin(), progress, store)
    }

    /// Pick up a stored run, if there is one.
    pub fn resume(store: S) -> Result<Option<Self>, QuestError> {
        match store.load()? {
            Some(progress) => Self::new(LevelCatalog::builtin(), progress, store).map(Some),
            None => Ok(None),
        }
    }

    fn load_puzzle(&mut self) {
        self.puzzle = if self.progress.is_complete() {
            None
        } else {
            self.catalog
                .get(self.progress.current_level)
                .map(Puzzle::for_level)
        };
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn level(&self) -> Option<&LevelDef> {
        if self.progress.is_complete() {
            return None;
        }
        self.catalog.get(self.progress.current_level)
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    pub fn puzzle_mut(&mut self) -> Option<&mut Puzzle> {
        self.puzzle.as_mut()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn submit(&mut self, answer: &str, now_ms: u64) -> Result<Outcome, QuestError> {
        let Some(puzzle) = self.puzzle.as_mut() else {
            return Ok(Outcome::Rejected {
                message: "ALL LAYERS BREACHED".to_string(),
            });
        };
        let outcome = puzzle.attempt(answer);
        match &outcome {
            Outcome::Solved { answer } => {
                info!("level {} solved with {answer}", self.progress.current_level);
                self.finish_level(now_ms, false)?;
            }
            Outcome::ResetProgress { .. } => {
                warn!("level {} failed hard, back to 1", self.progress.current_level);
                let mut next = self.progress.clone();
                next.reset_to_first();
                self.commit(next)?;
            }
            Outcome::Rejected { .. } | Outcome::Hint { .. } => {}
        }
        Ok(outcome)
    }

    /// Persist `next`, then make it current. On a failed save the session
    /// keeps its previous progress and puzzle.
    fn commit(&mut self, next: Progress) -> Result<(), QuestError> {
        self.store.save(&next)?;
        self.progress = next;
        self.load_puzzle();
        Ok(())
    }

    fn finish_level(&mut self, now_ms: u64, skipped: bool) -> Result<(), QuestError> {
        let mut next = self.progress.clone();
        let done = if skipped {
            next.skip(now_ms).cloned()
        } else {
            next.record_solve(now_ms).cloned()
        };
        self.commit(next)?;
        if let Some(c) = done {
            info!(
                "team {} finished in {}s",
                c.team_name, c.completion_time_seconds
            );
            self.store.push_history(&c)?;
        }
        Ok(())
    }

    pub fn skip(&mut self, now_ms: u64) -> Result<(), QuestError> {
        if self.progress.is_complete() {
            return Ok(());
        }
        self.finish_level(now_ms, true)
    }

    pub fn previous(&mut self) -> Result<(), QuestError> {
        let mut next = self.progress.clone();
        next.previous();
        if next.current_level != self.progress.current_level {
            self.commit(next)?;
        }
        Ok(())
    }

    /// Forget the team; returns the store so stored history stays reachable.
    pub fn logout(mut self) -> Result<S, QuestError> {
        self.store.clear()?;
        Ok(self.store)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn team() -> Team {
        Team::register("Owls", "Ada", "Linus").unwrap()
    }

    #[test]
    fn advancing_past_last_level_completes() {
        let mut p = Progress::new(team(), 10_000);
        p.current_level = TOTAL_LEVELS;
        let c = p.record_solve(3_671_999 + 10_000).cloned().unwrap();
        assert_eq!(c.completion_time_seconds, 3_671);
        assert_eq!(p.current_level, TOTAL_LEVELS);
        assert!(p.record_solve(99_999_999).is_none());
    }

    #[test]
    fn previous_stops_at_one() {
        let mut p = Progress::new(team(), 0);
        p.previous();
        assert_eq!(p.current_level, 1);
        p.skip(0);
        p.skip(0);
        p.previous();
        assert_eq!(p.current_level, 2);
    }

    #[test]
    fn store_round_trip_uses_game_keys() {
        let mut store = MemoryStore::default();
        let mut p = Progress::new(team(), 42);
        p.current_level = 7;
        store.save(&p).unwrap();
        assert_eq!(store.read(LEVEL_KEY).unwrap().as_deref(), Some("7"));
        let raw = store.read(TEAM_KEY).unwrap().unwrap();
        assert!(raw.contains("\"teamName\":\"Owls\""));
        assert_eq!(store.load().unwrap(), Some(p));
    }

    #[test]
    fn bad_stored_level_falls_back_to_one() {
        let mut store = MemoryStore::default();
        store.save(&Progress::new(team(), 0)).unwrap();
        store.write(LEVEL_KEY, "99").unwrap();
        assert_eq!(store.load().unwrap().unwrap().current_level, 1);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut store = MemoryStore::default();
        let mut old = Progress::new(team(), 0);
        old.current_level = TOTAL_LEVELS;
        old.record_solve(5_000);
        store.save(&old).unwrap();
        store.save(&Progress::new(team(), 9_000)).unwrap();
        assert!(!store.load().unwrap().unwrap().is_complete());
    }

    #[test]
    fn taunts_cycle() {
        assert_eq!(taunt(1), taunt(6));
        assert!(taunt(15).starts_with("INCONSIDERABLE"));
    }
}
