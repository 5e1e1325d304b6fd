//! Domain primitives: PlayerId, TimeMs, GameDate.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Stable player identity issued by the external identity provider
/// (the Telegram user id, kept as an opaque string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a PlayerId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }

    /// Add a millisecond offset, saturating on overflow.
    pub fn plus_ms(&self, ms: i64) -> Self {
        TimeMs(self.0.saturating_add(ms))
    }
}

/// Calendar date (YYYY-MM-DD) in the server's reward timezone.
///
/// Daily-login idempotence is a date comparison, so this wraps a plain
/// NaiveDate rather than an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameDate(pub NaiveDate);

impl GameDate {
    pub fn new(date: NaiveDate) -> Self {
        GameDate(date)
    }

    /// Parse from YYYY-MM-DD.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(GameDate)
    }

    /// The previous calendar day.
    pub fn prev_day(&self) -> Self {
        GameDate(self.0 - Duration::days(1))
    }

    /// The next calendar day.
    pub fn next_day(&self) -> Self {
        GameDate(self.0 + Duration::days(1))
    }
}

impl std::fmt::Display for GameDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        let id = PlayerId::new("123456");
        assert_eq!(id.to_string(), "123456");
        assert_eq!(id.as_str(), "123456");
    }

    #[test]
    fn test_timems_ordering() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(2000);
        assert!(t1 < t2);
        assert_eq!(t1.plus_ms(1000), t2);
    }

    #[test]
    fn test_timems_plus_saturates() {
        let t = TimeMs::new(i64::MAX);
        assert_eq!(t.plus_ms(1), TimeMs::new(i64::MAX));
    }

    #[test]
    fn test_game_date_parse_display_roundtrip() {
        let d = GameDate::parse("2024-10-05").unwrap();
        assert_eq!(d.to_string(), "2024-10-05");
    }

    #[test]
    fn test_game_date_prev_next() {
        let d = GameDate::parse("2024-03-01").unwrap();
        assert_eq!(d.prev_day().to_string(), "2024-02-29");
        assert_eq!(d.prev_day().next_day(), d);
    }

    #[test]
    fn test_game_date_rejects_garbage() {
        assert!(GameDate::parse("not-a-date").is_err());
    }
}
