//! State for the levels that are played by interacting with a board rather
//! than by typing a single answer.

use serde::{Deserialize, Serialize};

use crate::error::QuestError;

/// Four arrows; each click turns one arrow and bumps its counter `0..=9`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDial {
    pub counters: [u8; 4],
}

impl ClockDial {
    pub const CODE: &'static str = "0235";

    pub fn rotate_arrow(&mut self, i: usize) -> Result<u8, QuestError> {
        let c = self
            .counters
            .get_mut(i)
            .ok_or(QuestError::OutOfRange { what: "arrow", index: i })?;
        *c = (*c + 1) % 10;
        Ok(*c)
    }

    pub fn code(&self) -> String {
        self.counters.iter().map(|c| char::from(b'0' + c)).collect()
    }
}

pub const RIDDLES: [(&str, &str); 4] = [
    ("I copy you, I only exist when you stand before me.", "MIRROR"),
    ("I melt as I give light.", "CANDLE"),
    ("I speak without a mouth, I hear as ears, I hold illusion in my screen.", "PHONE"),
    ("I have buttons but I'm not a shirt, I control digital things from afar.", "REMOTE"),
];

/// Multiple-choice frame: pick a riddle, then answer it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiddleFrame {
    pub selected: Option<usize>,
}

impl RiddleFrame {
    /// Select option `1..=4` and return its riddle.
    pub fn select_option(&mut self, option: usize) -> Result<&'static str, QuestError> {
        let &(riddle, _) = option
            .checked_sub(1)
            .and_then(|i| RIDDLES.get(i))
            .ok_or(QuestError::OutOfRange { what: "riddle", index: option })?;
        self.selected = Some(option);
        Ok(riddle)
    }

    pub fn expected(&self) -> Option<&'static str> {
        self.selected.map(|o| RIDDLES[o - 1].1)
    }
}

pub const GRID_SIZE: usize = 7;

/// Words as `(letters, row, col, across)`.
const WORDS: [(&str, usize, usize, bool); 5] = [
    ("LIGHT", 0, 1, true),
    ("BACK", 1, 2, true),
    ("THE", 3, 3, false),
    ("HOME", 3, 1, false),
    ("WAY", 6, 4, true),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossword {
    solution: [[Option<char>; GRID_SIZE]; GRID_SIZE],
    entries: [[Option<char>; GRID_SIZE]; GRID_SIZE],
    complete: bool,
}

impl Default for Crossword {
    fn default() -> Self {
        let mut solution = [[None; GRID_SIZE]; GRID_SIZE];
        for (word, row, col, across) in WORDS {
            for (k, ch) in word.chars().enumerate() {
                let (r, c) = if across { (row, col + k) } else { (row + k, col) };
                solution[r][c] = Some(ch);
            }
        }
        Crossword {
            solution,
            entries: [[None; GRID_SIZE]; GRID_SIZE],
            complete: false,
        }
    }
}

impl Crossword {
    pub const PHRASE: &'static str = "LIGHT THE WAY BACK HOME";

    pub fn is_cell(&self, row: usize, col: usize) -> bool {
        row < GRID_SIZE && col < GRID_SIZE && self.solution[row][col].is_some()
    }

    /// Write a letter, or clear the cell with `None`.
    pub fn fill(&mut self, row: usize, col: usize, ch: Option<char>) -> Result<(), QuestError> {
        if self.complete || !self.is_cell(row, col) {
            return Err(QuestError::NotEditable { row, col });
        }
        self.entries[row][col] = ch
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase());
        Ok(())
    }

    pub fn entry(&self, row: usize, col: usize) -> Option<char> {
        self.entries.get(row)?.get(col).copied().flatten()
    }

    /// Compare every cell; once correct the grid is locked.
    pub fn check_grid(&mut self) -> bool {
        if !self.complete {
            self.complete = self.entries == self.solution;
        }
        self.complete
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

pub const HEX_COUNT: usize = 41;
pub const MAX_LIGHTS: usize = 3;
pub const WINNING_LIGHTS: [[usize; 3]; 3] = [[2, 33, 37], [0, 4, 35], [22, 26, 39]];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightResult {
    /// Placed; this many lights are now on.
    Lit(usize),
    AlreadyLit,
    /// Three lights are down; only a reset helps.
    Locked,
    Solved,
    Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub lit: Vec<usize>,
    pub solved: bool,
}

impl FloorPlan {
    pub fn light(&mut self, hex: usize) -> Result<LightResult, QuestError> {
        if hex >= HEX_COUNT {
            return Err(QuestError::OutOfRange { what: "hexagon", index: hex });
        }
        if self.solved || self.lit.len() >= MAX_LIGHTS {
            return Ok(LightResult::Locked);
        }
        if self.lit.contains(&hex) {
            return Ok(LightResult::AlreadyLit);
        }
        self.lit.push(hex);
        if self.lit.len() < MAX_LIGHTS {
            return Ok(LightResult::Lit(self.lit.len()));
        }
        let mut placed = self.lit.clone();
        placed.sort_unstable();
        self.solved = WINNING_LIGHTS.iter().any(|w| {
            let mut w = *w;
            w.sort_unstable();
            placed == w
        });
        Ok(if self.solved {
            LightResult::Solved
        } else {
            LightResult::Failed
        })
    }

    pub fn reset(&mut self) {
        self.lit.clear();
        self.solved = false;
    }
}

/// Three doors driven by a 3-bit counter; the first door clicked decides
/// which door shows which bit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeDoors {
    first: Option<usize>,
    counter: u8,
    pub solved: bool,
}

impl ThreeDoors {
    pub const OPEN_PATTERNS: [[u8; 3]; 3] = [[1, 0, 1], [1, 1, 0], [0, 1, 1]];

    pub fn click_door(&mut self, door: usize) -> Result<[u8; 3], QuestError> {
        if door >= 3 {
            return Err(QuestError::OutOfRange { what: "door", index: door });
        }
        if self.solved {
            return Ok(self.doors());
        }
        match self.first {
            None => {
                self.first = Some(door);
                self.counter = 1;
            }
            Some(_) if self.counter >= 7 => self.reset(),
            Some(_) => self.counter += 1,
        }
        Ok(self.doors())
    }

    pub fn doors(&self) -> [u8; 3] {
        let bit = |n: u8| (self.counter >> n) & 1;
        match self.first {
            None => [0, 0, 0],
            Some(0) => [bit(0), bit(2), bit(1)],
            Some(1) => [bit(1), bit(0), bit(2)],
            Some(_) => [bit(2), bit(1), bit(0)],
        }
    }

    /// Try the proceed lever with the current door states.
    pub fn proceed(&mut self) -> bool {
        if !self.solved {
            self.solved = Self::OPEN_PATTERNS.contains(&self.doors());
        }
        self.solved
    }

    pub fn reset(&mut self) {
        *self = ThreeDoors::default();
    }
}

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaryDial {
    rings: Vec<Vec<char>>,
    pub positions: Vec<usize>,
}

impl RotaryDial {
    pub const TARGET: &'static str = "ESCAPE";
    pub const DECOY: &'static str = "SYSTEM";

    /// Ring `i` starts with the target letter, then the decoy letter, then
    /// the rest of the alphabet in order.
    pub fn new(positions: &[usize]) -> Self {
        let rings: Vec<Vec<char>> = Self::TARGET
            .chars()
            .zip(Self::DECOY.chars())
            .map(|(t, d)| {
                let mut ring = vec![t, d];
                ring.extend(ALPHABET.chars().filter(|&c| c != t && c != d));
                ring
            })
            .collect();
        let positions = (0..rings.len())
            .map(|i| positions.get(i).copied().unwrap_or(0) % ALPHABET.len())
            .collect();
        RotaryDial { rings, positions }
    }

    pub fn wheel_count(&self) -> usize {
        self.rings.len()
    }

    /// Turn wheel `i` by `delta` faces; returns whether the word now reads correctly.
    pub fn turn_wheel(&mut self, i: usize, delta: i32) -> Result<bool, QuestError> {
        let pos = self
            .positions
            .get_mut(i)
            .ok_or(QuestError::OutOfRange { what: "wheel", index: i })?;
        let n = ALPHABET.len() as i64;
        *pos = (*pos as i64 + i64::from(delta)).rem_euclid(n) as usize;
        Ok(self.is_solved())
    }

    pub fn visible(&self) -> String {
        self.rings
            .iter()
            .zip(&self.positions)
            .map(|(ring, &p)| ring[p])
            .collect()
    }

    pub fn is_solved(&self) -> bool {
        self.visible() == Self::TARGET
    }
}

impl Default for RotaryDial {
    /// Every wheel on its decoy face, so the dial first reads SYSTEM.
    fn default() -> Self {
        RotaryDial::new(&[1; 6])
    }
}
