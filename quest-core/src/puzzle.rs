use log::debug;
use tangram_core::{Layout, Rect, SOLUTION_ANSWER, ShapesCatalog, TangramSession};

use crate::levels::{LevelDef, LevelKind};
use crate::widgets::{ClockDial, Crossword, FloorPlan, RiddleFrame, RotaryDial, ThreeDoors};

/// Board size used until the front-end reports the real canvas.
pub const DEFAULT_BOARD: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

pub const CLOCK_ANSWER: &str = "CLOCK_SOLVED";
pub const KEYPAD_ANSWER: &str = "SHAKTHIMAN";
pub const KEYPAD_DIAL_KEY: &str = "7777442558444446266";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Solved { answer: String },
    Rejected { message: String },
    /// Not a solution, but a nudge in the right direction.
    Hint { message: String },
    /// Wrong in a way that sends the team back to the first level.
    ResetProgress { message: String },
}

impl Outcome {
    fn solved(answer: &str) -> Self {
        Outcome::Solved {
            answer: answer.to_string(),
        }
    }

    fn rejected(message: &str) -> Self {
        Outcome::Rejected {
            message: message.to_string(),
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved { .. })
    }
}

/// One playable level with whatever state it needs between attempts.
#[derive(Clone, Debug)]
pub enum Puzzle {
    Clock(ClockDial),
    Url,
    Morse,
    Video,
    Filesystem,
    Still,
    Mcq(RiddleFrame),
    PhoneKeypad,
    Crossword(Crossword),
    FloorPlan(FloorPlan),
    ThreeDoors(ThreeDoors),
    CodeCracker,
    Tangram(Box<TangramSession>),
    Consequence,
    Rotary(RotaryDial),
}

impl Puzzle {
    pub fn for_level(level: &LevelDef) -> Puzzle {
        match level.kind {
            LevelKind::Clock => Puzzle::Clock(ClockDial::default()),
            LevelKind::Url => Puzzle::Url,
            LevelKind::Morse => Puzzle::Morse,
            LevelKind::Video => Puzzle::Video,
            LevelKind::Filesystem => Puzzle::Filesystem,
            LevelKind::Still => Puzzle::Still,
            LevelKind::Mcq => Puzzle::Mcq(RiddleFrame::default()),
            LevelKind::PhoneKeypad => Puzzle::PhoneKeypad,
            LevelKind::Crossword => Puzzle::Crossword(Crossword::default()),
            LevelKind::FloorPlan => Puzzle::FloorPlan(FloorPlan::default()),
            LevelKind::ThreeDoors => Puzzle::ThreeDoors(ThreeDoors::default()),
            LevelKind::CodeCracker => Puzzle::CodeCracker,
            LevelKind::Tangram => Puzzle::Tangram(Box::new(TangramSession::new(
                ShapesCatalog::builtin(),
                Layout::fit(DEFAULT_BOARD),
            ))),
            LevelKind::Consequence => Puzzle::Consequence,
            LevelKind::Rotary => Puzzle::Rotary(RotaryDial::default()),
        }
    }

    pub fn kind(&self) -> LevelKind {
        match self {
            Puzzle::Clock(_) => LevelKind::Clock,
            Puzzle::Url => LevelKind::Url,
            Puzzle::Morse => LevelKind::Morse,
            Puzzle::Video => LevelKind::Video,
            Puzzle::Filesystem => LevelKind::Filesystem,
            Puzzle::Still => LevelKind::Still,
            Puzzle::Mcq(_) => LevelKind::Mcq,
            Puzzle::PhoneKeypad => LevelKind::PhoneKeypad,
            Puzzle::Crossword(_) => LevelKind::Crossword,
            Puzzle::FloorPlan(_) => LevelKind::FloorPlan,
            Puzzle::ThreeDoors(_) => LevelKind::ThreeDoors,
            Puzzle::CodeCracker => LevelKind::CodeCracker,
            Puzzle::Tangram(_) => LevelKind::Tangram,
            Puzzle::Consequence => LevelKind::Consequence,
            Puzzle::Rotary(_) => LevelKind::Rotary,
        }
    }

    /// Levels solved by manipulating a board; an empty submission checks the board.
    pub fn is_state_driven(&self) -> bool {
        matches!(
            self,
            Puzzle::Clock(_)
                | Puzzle::FloorPlan(_)
                | Puzzle::ThreeDoors(_)
                | Puzzle::Tangram(_)
                | Puzzle::Rotary(_)
        )
    }

    pub fn tangram_mut(&mut self) -> Option<&mut TangramSession> {
        match self {
            Puzzle::Tangram(s) => Some(s.as_mut()),
            _ => None,
        }
    }

    pub fn attempt(&mut self, answer: &str) -> Outcome {
        let answer = answer.trim().to_uppercase();
        if answer.is_empty() && !self.is_state_driven() {
            return Outcome::rejected("ENTER AN ANSWER");
        }
        let outcome = self.check(&answer);
        debug!("{:?} attempt -> {:?}", self.kind(), outcome);
        outcome
    }

    fn check(&mut self, answer: &str) -> Outcome {
        match self {
            Puzzle::Clock(dial) => {
                let code = if answer.is_empty() {
                    dial.code()
                } else {
                    answer.to_string()
                };
                if code == ClockDial::CODE {
                    Outcome::solved(CLOCK_ANSWER)
                } else {
                    Outcome::rejected("ACCESS DENIED")
                }
            }
            Puzzle::Url => exact(answer, &["UNSEAL"], "THE SEAL HOLDS. LOOK AGAIN."),
            Puzzle::Morse => {
                if answer == "MANIPULATION" {
                    Outcome::Hint {
                        message: "UNSCRAMBLE AND FIND THE WORD WITHIN".to_string(),
                    }
                } else {
                    exact(answer, &["PLAN"], "SIGNAL MISREAD. REASSESS THE PATTERN.")
                }
            }
            Puzzle::Video => Outcome::solved(answer),
            Puzzle::Filesystem => exact(answer, &["GATWAY", "ABIN"], "FILE NOT FOUND."),
            Puzzle::Still => exact(answer, &["ILLUSION"], "YOUR EYES DECEIVE YOU."),
            Puzzle::Mcq(frame) => match frame.expected() {
                None => Outcome::rejected("SELECT A RIDDLE FIRST"),
                Some(expected) if answer != expected => Outcome::rejected("INCORRECT. TRY AGAIN."),
                Some("PHONE") => Outcome::solved("PHONE"),
                Some(_) => Outcome::Hint {
                    message: "CORRECT ANSWER, KEEP SEARCHING".to_string(),
                },
            },
            Puzzle::PhoneKeypad => {
                if multi_tap(answer) == KEYPAD_DIAL_KEY {
                    Outcome::solved(KEYPAD_ANSWER)
                } else {
                    Outcome::rejected("INCORRECT. THAT'S NOT THE OUTSIDER.")
                }
            }
            Puzzle::Crossword(cw) => {
                if !cw.is_complete() {
                    Outcome::rejected("COMPLETE THE CROSSWORD FIRST")
                } else {
                    exact(
                        answer,
                        &[Crossword::PHRASE],
                        "SENTENCE STRUCTURE INVALID. REASSEMBLE THE MEANING.",
                    )
                }
            }
            Puzzle::FloorPlan(fp) => {
                if fp.solved {
                    Outcome::solved("SAFEPATH")
                } else {
                    Outcome::rejected("INSUFFICIENT COVERAGE")
                }
            }
            Puzzle::ThreeDoors(doors) => {
                if doors.proceed() {
                    Outcome::solved("BINARY")
                } else {
                    Outcome::rejected("THE DOORS STAY SHUT")
                }
            }
            Puzzle::CodeCracker => {
                if answer.chars().count() != 3 {
                    Outcome::rejected("ENTER ALL 3 DIGITS")
                } else {
                    exact(answer, &["718"], "WRONG CODE. ANALYZE THE CLUES CAREFULLY.")
                }
            }
            Puzzle::Tangram(session) => {
                if session.is_solved() {
                    Outcome::solved(SOLUTION_ANSWER)
                } else {
                    Outcome::rejected("THE SILHOUETTE IS INCOMPLETE")
                }
            }
            Puzzle::Consequence => {
                if answer == "12:15" {
                    Outcome::solved(answer)
                } else {
                    Outcome::ResetProgress {
                        message: "TIMELINE COLLAPSED. RETURNING TO LAYER 01.".to_string(),
                    }
                }
            }
            Puzzle::Rotary(dial) => {
                if dial.is_solved() {
                    Outcome::solved(RotaryDial::TARGET)
                } else {
                    Outcome::rejected("THE DIAL IS LOCKED")
                }
            }
        }
    }
}

fn exact(answer: &str, accepted: &[&str], wrong: &str) -> Outcome {
    if accepted.contains(&answer) {
        Outcome::solved(answer)
    } else {
        Outcome::rejected(wrong)
    }
}

const KEYPAD: [(char, &str); 9] = [
    ('2', "ABC"),
    ('3', "DEF"),
    ('4', "GHI"),
    ('5', "JKL"),
    ('6', "MNO"),
    ('7', "PQRS"),
    ('8', "TUV"),
    ('9', "WXYZ"),
    ('0', " "),
];

/// Old phone multi-tap: each letter becomes its key pressed once per
/// position on the key. Characters without a key pass through.
pub fn multi_tap(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        let up = ch.to_ascii_uppercase();
        match KEYPAD
            .iter()
            .find_map(|(key, letters)| letters.find(up).map(|i| (*key, i + 1)))
        {
            Some((key, presses)) => out.extend(std::iter::repeat_n(key, presses)),
            None => out.push(ch),
        }
    }
    out
}
