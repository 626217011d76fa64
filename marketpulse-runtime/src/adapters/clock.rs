//! In-memory `Clock`: wall clock plus a fixed per-symbol session table,
//! mirroring §6's NSE/NYSE example schedules.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use std::collections::HashMap;

use crate::config::SessionWindow;
use crate::traits::Clock;

pub struct FixedSessionClock {
    sessions: HashMap<String, SessionWindow>,
}

impl FixedSessionClock {
    pub fn new(sessions: HashMap<String, SessionWindow>) -> Self {
        Self { sessions }
    }
}

impl Clock for FixedSessionClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn is_session_open(&self, symbol: &str, at: DateTime<Utc>) -> Option<bool> {
        let window = self.sessions.get(symbol)?;
        if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
            return Some(false);
        }
        let minute_of_day = at.hour() * 60 + at.minute();
        Some(minute_of_day >= window.open_minute && minute_of_day < window.close_minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unknown_symbol_returns_none() {
        let clock = FixedSessionClock::new(HashMap::new());
        assert_eq!(clock.is_session_open("NOPE", Utc::now()), None);
    }

    #[test]
    fn weekend_is_closed() {
        let mut sessions = HashMap::new();
        sessions.insert("NIFTY50".to_string(), SessionWindow { open_minute: 555, close_minute: 930 });
        let clock = FixedSessionClock::new(sessions);
        let saturday = Utc.with_ymd_and_hms(2026, 7, 25, 10, 0, 0).unwrap();
        assert_eq!(clock.is_session_open("NIFTY50", saturday), Some(false));
    }

    #[test]
    fn within_window_is_open() {
        let mut sessions = HashMap::new();
        sessions.insert("NIFTY50".to_string(), SessionWindow { open_minute: 555, close_minute: 930 });
        let clock = FixedSessionClock::new(sessions);
        let weekday_midday = Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap();
        assert_eq!(clock.is_session_open("NIFTY50", weekday_midday), Some(true));
    }
}
