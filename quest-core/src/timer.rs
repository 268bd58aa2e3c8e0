use serde::{Deserialize, Serialize};

pub const TIME_LIMIT_MS: i64 = 3 * 60 * 60 * 1000;

/// Minutes remaining at which a warning is raised, largest first.
pub const ALERT_MINUTES: [i64; 4] = [30, 15, 5, 1];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alert {
    pub minutes: i64,
}

impl Alert {
    pub fn message(&self) -> String {
        if self.minutes == 1 {
            "1 MINUTE REMAINING!".to_string()
        } else {
            format!("{} MINUTES REMAINING!", self.minutes)
        }
    }
}

/// Game clock counting down from [`TIME_LIMIT_MS`] and past zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    pub started_at_ms: u64,
    #[serde(skip)]
    alerted: [bool; 4],
}

impl Countdown {
    pub fn new(started_at_ms: u64) -> Self {
        Countdown {
            started_at_ms,
            alerted: [false; 4],
        }
    }

    pub fn remaining(&self, now_ms: u64) -> i64 {
        let elapsed = now_ms as i64 - self.started_at_ms as i64;
        TIME_LIMIT_MS - elapsed
    }

    pub fn is_over(&self, now_ms: u64) -> bool {
        self.remaining(now_ms) <= 0
    }

    /// Returns an alert the first time `now_ms` falls inside the one-second
    /// window just after a threshold is crossed.
    pub fn poll(&mut self, now_ms: u64) -> Option<Alert> {
        let remaining = self.remaining(now_ms);
        for (i, minutes) in ALERT_MINUTES.iter().enumerate() {
            let t = minutes * 60 * 1000;
            if !self.alerted[i] && remaining <= t && remaining > t - 1000 {
                self.alerted[i] = true;
                return Some(Alert { minutes: *minutes });
            }
        }
        None
    }
}

fn hms(ms: i64) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    format!("{h:02}:{m:02}:{s:02}")
}

/// `HH:MM:SS`, prefixed with `-` once the limit has passed.
pub fn format_remaining(ms: i64) -> String {
    if ms <= 0 {
        format!("-{}", hms(-ms))
    } else {
        hms(ms)
    }
}

pub fn format_elapsed(seconds: u64) -> String {
    hms(seconds as i64 * 1000)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(TIME_LIMIT_MS, "03:00:00")]
    #[case(3_599_999, "00:59:59")]
    #[case(1, "00:00:00")]
    #[case(0, "-00:00:00")]
    #[case(-61_000, "-00:01:01")]
    fn formats(#[case] ms: i64, #[case] expected: &str) {
        assert_eq!(format_remaining(ms), expected);
    }

    #[test]
    fn counts_past_zero() {
        let c = Countdown::new(1_000);
        assert_eq!(c.remaining(1_000), TIME_LIMIT_MS);
        assert!(!c.is_over(1_000));
        assert!(c.is_over(1_000 + TIME_LIMIT_MS as u64));
        assert_eq!(c.remaining(2_000 + TIME_LIMIT_MS as u64), -1_000);
    }

    #[test]
    fn alerts_fire_once_inside_window() {
        let mut c = Countdown::new(0);
        let thirty_left = (TIME_LIMIT_MS - 30 * 60 * 1000) as u64;
        assert_eq!(c.poll(thirty_left - 1), None);
        assert_eq!(c.poll(thirty_left + 500), Some(Alert { minutes: 30 }));
        assert_eq!(c.poll(thirty_left + 600), None);
        // a tick that skipped the window never fires
        let fifteen_left = (TIME_LIMIT_MS - 15 * 60 * 1000) as u64;
        assert_eq!(c.poll(fifteen_left + 1_500), None);
        let one_left = (TIME_LIMIT_MS - 60 * 1000) as u64;
        let alert = c.poll(one_left).unwrap();
        assert_eq!(alert.message(), "1 MINUTE REMAINING!");
    }

    #[test]
    fn elapsed_time() {
        assert_eq!(format_elapsed(3_725), "01:02:05");
    }
}
