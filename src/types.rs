//! Wire types for the hardcourt backend API
//!
//! These mirror the JSON shapes produced by the backend for the bootstrap
//! snapshot, the push feed, and the one-shot browsing queries. Every pushed
//! record is a complete snapshot of one match, never a delta.

use serde::{Deserialize, Serialize};

/// Leverage above this value is considered pivotal in UI affordances
pub const HIGH_LEVERAGE: f64 = 0.3;

/// Lifecycle status of a match
///
/// The engine treats status as an opaque label; unknown labels sent by a
/// newer backend decode into [`MatchStatus::Other`] rather than failing the
/// whole record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Match has not started yet
    Scheduled,
    /// Match is in progress
    Live,
    /// Match has ended
    Finished,
    /// Any label this client does not know about
    #[serde(untagged)]
    Other(String),
}

impl MatchStatus {
    /// Whether this is the privileged `Live` status
    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::Live)
    }

    /// The wire label for this status
    pub fn as_str(&self) -> &str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::Live => "Live",
            MatchStatus::Finished => "Finished",
            MatchStatus::Other(label) => label,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One participant in a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Display name
    pub name: String,
    /// ISO country code
    pub country_code: String,
    /// Current world ranking
    pub rank: i32,
}

/// Current score of a match
///
/// Points are the non-numeric tennis tokens ("0", "15", "30", "40", "AD"),
/// so they travel as strings. `serving` is 0 before the first serve,
/// otherwise 1 or 2.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub sets_p1: u32,
    pub sets_p2: u32,
    pub games_p1: u32,
    pub games_p2: u32,
    pub points_p1: String,
    pub points_p2: String,
    pub serving: u8,
}

/// Aggregate per-match counters
///
/// Monotonically non-decreasing in well-formed input; the client stores
/// whatever the backend last sent and does not enforce monotonicity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchStats {
    pub aces_p1: u32,
    pub aces_p2: u32,
    pub df_p1: u32,
    pub df_p2: u32,
    pub rally_count: u32,
}

/// One in-progress (or finished) contest, as sent by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Stable backend-assigned identifier
    pub id: String,
    /// Owning tournament, used for grouping and surface/year filters
    pub tournament_id: String,
    pub player1: PlayerInfo,
    pub player2: PlayerInfo,
    pub status: MatchStatus,
    /// RFC 3339 start timestamp; opaque to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    pub score: ScoreState,
    pub stats: MatchStats,
    /// Backend-computed win probability for player 1, 0.0 to 1.0
    pub win_prob_p1: f64,
    /// How pivotal the current point is; consumed, not computed, here
    pub leverage_index: f64,
    /// Fatigue estimates, 0 to 100
    pub fatigue_p1: f64,
    pub fatigue_p2: f64,
    /// Monotonic per-match sequence number
    ///
    /// Newer backends stamp each pushed record so stale writes can be
    /// rejected; the legacy feed omits it and relies on arrival order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl MatchRecord {
    /// Whether the match is currently live
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Whether the current point is considered high leverage
    pub fn is_high_leverage(&self) -> bool {
        self.leverage_index > HIGH_LEVERAGE
    }
}

/// A tournament, from the one-shot browsing query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    /// Playing surface: "Hard", "Clay" or "Grass"
    pub surface: String,
    pub city: String,
    pub country: String,
    /// e.g. "Grand Slam", "Masters 1000"
    pub category: String,
    /// "upcoming", "ongoing" or "completed"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize_money: Option<i64>,
}

/// Response envelope for the past-matches query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastMatchesResponse {
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

/// Fully populated record for use across the crate's tests
#[cfg(test)]
pub(crate) fn sample_record(id: &str) -> MatchRecord {
    MatchRecord {
        id: id.to_string(),
        tournament_id: "t1".to_string(),
        player1: PlayerInfo {
            name: "C. Alcaraz".to_string(),
            country_code: "ES".to_string(),
            rank: 1,
        },
        player2: PlayerInfo {
            name: "J. Sinner".to_string(),
            country_code: "IT".to_string(),
            rank: 2,
        },
        status: MatchStatus::Live,
        start_time: Some("2025-07-13T14:00:00Z".to_string()),
        score: ScoreState {
            sets_p1: 1,
            sets_p2: 0,
            games_p1: 4,
            games_p2: 3,
            points_p1: "40".to_string(),
            points_p2: "AD".to_string(),
            serving: 1,
        },
        stats: MatchStats {
            aces_p1: 7,
            aces_p2: 5,
            df_p1: 1,
            df_p2: 2,
            rally_count: 12,
        },
        win_prob_p1: 0.62,
        leverage_index: 0.41,
        fatigue_p1: 35.0,
        fatigue_p2: 42.0,
        seq: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ MatchStatus Tests ============

    #[test]
    fn test_status_roundtrip_known_labels() {
        for (status, label) in [
            (MatchStatus::Scheduled, "\"Scheduled\""),
            (MatchStatus::Live, "\"Live\""),
            (MatchStatus::Finished, "\"Finished\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), label);
            let back: MatchStatus = serde_json::from_str(label).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_status_unknown_label_survives_decode() {
        let status: MatchStatus = serde_json::from_str("\"Suspended\"").unwrap();
        assert_eq!(status, MatchStatus::Other("Suspended".to_string()));
        assert_eq!(status.as_str(), "Suspended");
        assert!(!status.is_live());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MatchStatus::Live.to_string(), "Live");
        assert_eq!(MatchStatus::Other("Walkover".into()).to_string(), "Walkover");
    }

    #[test]
    fn test_status_is_live() {
        assert!(MatchStatus::Live.is_live());
        assert!(!MatchStatus::Scheduled.is_live());
        assert!(!MatchStatus::Finished.is_live());
    }

    // ============ MatchRecord Tests ============

    #[test]
    fn test_record_decodes_backend_shape() {
        let json = r#"{
            "id": "m1",
            "tournament_id": "t1",
            "player1": {"name": "C. Alcaraz", "country_code": "ES", "rank": 1},
            "player2": {"name": "J. Sinner", "country_code": "IT", "rank": 2},
            "status": "Live",
            "start_time": "2025-07-13T14:00:00Z",
            "score": {
                "sets_p1": 1, "sets_p2": 0,
                "games_p1": 4, "games_p2": 3,
                "points_p1": "40", "points_p2": "AD",
                "serving": 2
            },
            "stats": {"aces_p1": 7, "aces_p2": 5, "df_p1": 1, "df_p2": 2, "rally_count": 12},
            "win_prob_p1": 0.62,
            "leverage_index": 0.41,
            "fatigue_p1": 35.0,
            "fatigue_p2": 42.0
        }"#;

        let record: MatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "m1");
        assert_eq!(record.player2.name, "J. Sinner");
        assert_eq!(record.score.points_p2, "AD");
        assert_eq!(record.score.serving, 2);
        assert_eq!(record.stats.rally_count, 12);
        assert!(record.is_live());
        assert!(record.is_high_leverage());
        // Legacy feed carries no sequence numbers
        assert!(record.seq.is_none());
    }

    #[test]
    fn test_record_decodes_seq_when_present() {
        let mut value = serde_json::to_value(sample_record("m1")).unwrap();
        value["seq"] = serde_json::json!(17);
        let record: MatchRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.seq, Some(17));
    }

    #[test]
    fn test_record_missing_start_time_is_none() {
        let mut value = serde_json::to_value(sample_record("m1")).unwrap();
        value.as_object_mut().unwrap().remove("start_time");
        let record: MatchRecord = serde_json::from_value(value).unwrap();
        assert!(record.start_time.is_none());
    }

    #[test]
    fn test_record_high_leverage_threshold() {
        let mut record = sample_record("m1");
        record.leverage_index = 0.3;
        assert!(!record.is_high_leverage());
        record.leverage_index = 0.31;
        assert!(record.is_high_leverage());
    }

    // ============ Tournament Tests ============

    #[test]
    fn test_tournament_decode_with_optional_fields_absent() {
        let json = r#"{
            "id": "t1",
            "name": "Wimbledon",
            "surface": "Grass",
            "city": "London",
            "country": "UK",
            "category": "Grand Slam",
            "status": "ongoing"
        }"#;
        let t: Tournament = serde_json::from_str(json).unwrap();
        assert_eq!(t.surface, "Grass");
        assert!(t.year.is_none());
        assert!(t.prize_money.is_none());
    }

    #[test]
    fn test_past_matches_response_defaults_to_empty() {
        let resp: PastMatchesResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.matches.is_empty());
    }
}
