use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Asia::Jakarta;

use crate::config::Config;

/// Tracks which IDX trading session (if any) is open.
pub struct SessionManager {
    pub current_session: String,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            current_session: "closed".to_string(),
        }
    }

    pub fn update(&mut self, cfg: &Config, utc_now: Option<DateTime<Utc>>) {
        let utc_now = utc_now.unwrap_or_else(Utc::now);
        let wib_now = utc_now.with_timezone(&Jakarta);
        let current_time = wib_now.hour() * 60 + wib_now.minute();

        self.current_session = "closed".to_string();

        if matches!(wib_now.weekday(), Weekday::Sat | Weekday::Sun) {
            return;
        }

        for (name, times) in &cfg.sessions {
            let start_min = times.start.0 * 60 + times.start.1;
            let end_min = times.end.0 * 60 + times.end.1;

            if current_time >= start_min && current_time < end_min {
                self.current_session = name.clone();
                break;
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.current_session != "closed"
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
