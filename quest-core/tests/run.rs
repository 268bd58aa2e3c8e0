use std::cell::Cell;
use std::f64::consts::SQRT_2;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use quest_core::{
    LevelCatalog, LevelKind, MemoryStore, Outcome, Progress, ProgressStore, Puzzle, QuestError,
    QuestSession, TOTAL_LEVELS, Team,
};
use tangram_core::{Layout, Point, Rect};

fn start(now: u64) -> QuestSession<MemoryStore> {
    let team = Team::register("Night Owls", "Ada", "Linus").unwrap();
    QuestSession::start(team, now, MemoryStore::default()).unwrap()
}

fn solve_tangram(session: &mut QuestSession<MemoryStore>) {
    let board = session
        .puzzle_mut()
        .and_then(Puzzle::tangram_mut)
        .expect("tangram level");
    board.resize(Layout {
        area: Rect::new(0.0, 0.0, 800.0, 400.0),
        scale: 1.0,
        target_center: Point::new(0.0, 170.0),
        tray: Rect::new(400.0, 0.0, 400.0, 400.0),
    });
    board.reset();
    board.place("triangle", Point::new(-140.0, 20.0), 6, false).unwrap();
    board
        .place("pentagon", Point::new(60.0 - 110.0 / SQRT_2, 60.0 - 62.0 / SQRT_2), 1, false)
        .unwrap();
    board.place("long_trap", Point::new(0.0, 260.0), 6, false).unwrap();
    board.place("short_trap", Point::new(124.0, 3.0), 4, true).unwrap();
    // pick the short trapezoid up and nudge it so the release snaps it home
    board.pointer_down(Point::new(150.0, 0.0));
    board.pointer_move(Point::new(148.0, -3.0));
    assert!(board.pointer_up().is_some());
}

#[test]
fn skipping_to_the_tangram_and_solving_it() {
    let mut s = start(1_000);
    for _ in 1..13 {
        s.skip(2_000).unwrap();
    }
    assert_eq!(s.level().map(|l| l.kind), Some(LevelKind::Tangram));
    assert!(matches!(s.submit("", 3_000).unwrap(), Outcome::Rejected { .. }));

    solve_tangram(&mut s);
    assert_eq!(
        s.submit("", 4_000).unwrap(),
        Outcome::Solved {
            answer: "TANGRAM".into()
        }
    );
    assert_eq!(s.progress().current_level, 14);
    assert_eq!(s.store().read("lockstep_level").unwrap().as_deref(), Some("14"));
}

#[test]
fn wrong_consequence_answer_restarts_the_run() {
    let mut s = start(0);
    for _ in 1..14 {
        s.skip(0).unwrap();
    }
    assert_eq!(s.level().map(|l| l.kind), Some(LevelKind::Consequence));
    let outcome = s.submit("11:45", 10).unwrap();
    assert!(matches!(outcome, Outcome::ResetProgress { .. }));
    assert_eq!(s.progress().current_level, 1);
    assert_eq!(s.puzzle().map(Puzzle::kind), Some(LevelKind::Clock));
}

#[test]
fn finishing_records_history_and_resumes_complete() {
    let mut s = start(0);
    for _ in 1..TOTAL_LEVELS {
        s.skip(0).unwrap();
    }
    if let Some(Puzzle::Rotary(dial)) = s.puzzle_mut() {
        for i in 0..dial.wheel_count() {
            dial.turn_wheel(i, -1).unwrap();
        }
    }
    let outcome = s.submit("", 65_000).unwrap();
    assert_eq!(outcome, Outcome::Solved { answer: "ESCAPE".into() });
    assert!(s.progress().is_complete());
    assert!(s.puzzle().is_none());
    assert!(matches!(s.submit("anything", 70_000).unwrap(), Outcome::Rejected { .. }));

    let history = s.store().history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].completion_time_seconds, 65);

    let store = s.store().clone();
    let resumed = QuestSession::resume(store).unwrap().expect("stored run");
    assert!(resumed.progress().is_complete());

    let store = resumed.logout().unwrap();
    assert!(QuestSession::resume(store.clone()).unwrap().is_none());
    assert_eq!(store.history().unwrap().len(), 1);
}

#[test]
fn previous_reloads_the_earlier_puzzle() {
    let mut s = start(0);
    s.previous().unwrap();
    assert_eq!(s.progress().current_level, 1);
    s.skip(0).unwrap();
    s.skip(0).unwrap();
    s.previous().unwrap();
    assert_eq!(s.level().map(|l| l.title.as_str()), Some("URL Cipher"));
    assert_eq!(s.submit("unseal", 0).unwrap(), Outcome::Solved { answer: "UNSEAL".into() });
}

/// Memory store whose writes can be switched to fail, like a full `localStorage`.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    full: Rc<Cell<bool>>,
}

impl ProgressStore for FlakyStore {
    fn read(&self, key: &str) -> Result<Option<String>, QuestError> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), QuestError> {
        if self.full.get() {
            return Err(QuestError::Storage("quota".into()));
        }
        self.inner.write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), QuestError> {
        self.inner.remove(key)
    }
}

#[test]
fn failed_save_keeps_the_current_level() {
    let full = Rc::new(Cell::new(false));
    let store = FlakyStore {
        inner: MemoryStore::default(),
        full: full.clone(),
    };
    let team = Team::register("Night Owls", "Ada", "Linus").unwrap();
    let mut s = QuestSession::start(team, 0, store).unwrap();
    s.skip(0).unwrap();
    assert_eq!(s.progress().current_level, 2);

    full.set(true);
    assert!(matches!(s.submit("unseal", 0), Err(QuestError::Storage(_))));
    assert_eq!(s.progress().current_level, 2);
    assert_eq!(s.puzzle().map(Puzzle::kind), Some(LevelKind::Url));
    assert!(s.submit("unseal", 0).is_err());
    assert_eq!(s.progress().current_level, 2);
    assert!(s.skip(0).is_err());
    assert!(s.previous().is_err());
    assert_eq!(s.progress().current_level, 2);

    full.set(false);
    assert!(s.submit("unseal", 0).unwrap().is_solved());
    assert_eq!(s.progress().current_level, 3);
    assert_eq!(s.puzzle().map(Puzzle::kind), Some(LevelKind::Morse));
    assert_eq!(s.store().read("lockstep_level").unwrap().as_deref(), Some("3"));
}

#[test]
fn session_rejects_a_level_outside_the_catalogue() {
    let team = Team::register("Night Owls", "Ada", "Linus").unwrap();
    let mut progress = Progress::new(team, 0);
    progress.current_level = TOTAL_LEVELS + 1;
    let err = QuestSession::new(LevelCatalog::builtin(), progress, MemoryStore::default())
        .err()
        .expect("level 16 does not exist");
    assert!(matches!(err, QuestError::UnknownLevel(16)));
}
