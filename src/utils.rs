//! Utility functions for the player tracking service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique player ID
pub fn generate_player_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a new unique match report ID
pub fn generate_match_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for the `Expires` attribute of a cookie
pub fn cookie_expiry(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_player_id();
        let id2 = generate_player_id();
        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(&id1).is_ok());

        let match_id1 = generate_match_id();
        let match_id2 = generate_match_id();
        assert_ne!(match_id1, match_id2);
    }

    #[test]
    fn test_cookie_expiry_format() {
        let timestamp = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(cookie_expiry(timestamp), "Wed, 21 Oct 2015 07:28:00 GMT");
    }
}
