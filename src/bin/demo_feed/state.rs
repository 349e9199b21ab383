//! Shared state and score simulation for the demo feed

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

use courtside::types::{
    MatchRecord, MatchStats, MatchStatus, PlayerInfo, ScoreState, Tournament,
};

/// Capacity of the fan-out channel feeding connected sockets
const FEED_CAPACITY: usize = 64;

/// Point token progression; deuce and advantage are approximated
const POINT_TOKENS: [&str; 4] = ["0", "15", "30", "40"];

/// Shared state behind the demo endpoints
#[derive(Clone)]
pub struct FeedState {
    matches: Arc<RwLock<HashMap<String, MatchRecord>>>,
    tournaments: Arc<Vec<Tournament>>,
    feed_tx: broadcast::Sender<String>,
}

impl FeedState {
    pub fn new() -> Self {
        let (feed_tx, _) = broadcast::channel(FEED_CAPACITY);
        let matches = seed_matches()
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        Self {
            matches: Arc::new(RwLock::new(matches)),
            tournaments: Arc::new(seed_tournaments()),
            feed_tx,
        }
    }

    pub async fn matches_with_status(&self, status: Option<&str>) -> Vec<MatchRecord> {
        let matches = self.matches.read().await;
        let mut result: Vec<MatchRecord> = matches
            .values()
            .filter(|m| status.map_or(true, |s| m.status.as_str() == s))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    pub fn tournaments(&self) -> Vec<Tournament> {
        self.tournaments.as_ref().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.feed_tx.subscribe()
    }

    /// Advance one live match and push the updated record to the feed
    pub async fn tick(&self) {
        let mut matches = self.matches.write().await;
        let mut live_ids: Vec<String> = matches
            .values()
            .filter(|m| m.is_live())
            .map(|m| m.id.clone())
            .collect();
        live_ids.sort();
        if live_ids.is_empty() {
            return;
        }

        let pick = rand::thread_rng().gen_range(0..live_ids.len());
        if let Some(record) = matches.get_mut(&live_ids[pick]) {
            advance_point(record);
            if let Ok(payload) = serde_json::to_string(record) {
                let _ = self.feed_tx.send(payload);
            }
        }
    }
}

/// Run the simulation loop until the process exits
pub async fn run_simulator(state: FeedState, interval: Duration) {
    info!(interval_ms = interval.as_millis() as u64, "score simulator running");
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        state.tick().await;
    }
}

/// Crude point-by-point progression, enough to exercise a client
fn advance_point(record: &mut MatchRecord) {
    let mut rng = rand::thread_rng();
    let winner_is_p1 = rng.gen_bool(record.win_prob_p1.clamp(0.05, 0.95));

    let (points, other) = if winner_is_p1 {
        (&record.score.points_p1, &record.score.points_p2)
    } else {
        (&record.score.points_p2, &record.score.points_p1)
    };

    let game_won = points.as_str() == "40" || points.as_str() == "AD";
    if game_won {
        record.score.points_p1 = "0".to_string();
        record.score.points_p2 = "0".to_string();
        if winner_is_p1 {
            record.score.games_p1 += 1;
        } else {
            record.score.games_p2 += 1;
        }
        record.score.serving = if record.score.serving == 1 { 2 } else { 1 };
    } else {
        let next = match (points.as_str(), other.as_str()) {
            ("40", "40") => "AD",
            (current, _) => {
                let idx = POINT_TOKENS.iter().position(|t| *t == current).unwrap_or(0);
                POINT_TOKENS[(idx + 1).min(3)]
            }
        };
        if winner_is_p1 {
            record.score.points_p1 = next.to_string();
        } else {
            record.score.points_p2 = next.to_string();
        }
    }

    record.stats.rally_count = rng.gen_range(1..25);
    if rng.gen_bool(0.1) {
        if winner_is_p1 {
            record.stats.aces_p1 += 1;
        } else {
            record.stats.aces_p2 += 1;
        }
    }
    let drift: f64 = rng.gen_range(-0.03..0.03);
    record.win_prob_p1 = (record.win_prob_p1 + drift).clamp(0.01, 0.99);
    record.leverage_index = rng.gen_range(0.0..0.8);
    record.fatigue_p1 = (record.fatigue_p1 + 0.2).min(100.0);
    record.fatigue_p2 = (record.fatigue_p2 + 0.2).min(100.0);
    record.seq = Some(record.seq.unwrap_or(0) + 1);
}

fn player(name: &str, country: &str, rank: i32) -> PlayerInfo {
    PlayerInfo {
        name: name.to_string(),
        country_code: country.to_string(),
        rank,
    }
}

fn seed_matches() -> Vec<MatchRecord> {
    let base_score = ScoreState {
        sets_p1: 0,
        sets_p2: 0,
        games_p1: 0,
        games_p2: 0,
        points_p1: "0".to_string(),
        points_p2: "0".to_string(),
        serving: 1,
    };
    vec![
        MatchRecord {
            id: "demo-m1".to_string(),
            tournament_id: "demo-t1".to_string(),
            player1: player("C. Alcaraz", "ES", 1),
            player2: player("J. Sinner", "IT", 2),
            status: MatchStatus::Live,
            start_time: Some("2026-08-06T13:00:00Z".to_string()),
            score: base_score.clone(),
            stats: MatchStats::default(),
            win_prob_p1: 0.55,
            leverage_index: 0.1,
            fatigue_p1: 0.0,
            fatigue_p2: 0.0,
            seq: Some(0),
        },
        MatchRecord {
            id: "demo-m2".to_string(),
            tournament_id: "demo-t1".to_string(),
            player1: player("N. Djokovic", "RS", 4),
            player2: player("A. Zverev", "DE", 3),
            status: MatchStatus::Live,
            start_time: Some("2026-08-06T14:30:00Z".to_string()),
            score: base_score.clone(),
            stats: MatchStats::default(),
            win_prob_p1: 0.48,
            leverage_index: 0.1,
            fatigue_p1: 0.0,
            fatigue_p2: 0.0,
            seq: Some(0),
        },
        MatchRecord {
            id: "demo-m3".to_string(),
            tournament_id: "demo-t2".to_string(),
            player1: player("I. Swiatek", "PL", 2),
            player2: player("A. Sabalenka", "BY", 1),
            status: MatchStatus::Scheduled,
            start_time: Some("2026-08-07T11:00:00Z".to_string()),
            score: base_score,
            stats: MatchStats::default(),
            win_prob_p1: 0.5,
            leverage_index: 0.0,
            fatigue_p1: 0.0,
            fatigue_p2: 0.0,
            seq: Some(0),
        },
    ]
}

fn seed_tournaments() -> Vec<Tournament> {
    vec![
        Tournament {
            id: "demo-t1".to_string(),
            name: "Cincinnati Open".to_string(),
            surface: "Hard".to_string(),
            city: "Cincinnati".to_string(),
            country: "USA".to_string(),
            category: "Masters 1000".to_string(),
            status: "ongoing".to_string(),
            year: Some(2026),
            start_date: Some("2026-08-02".to_string()),
            end_date: Some("2026-08-10".to_string()),
            prize_money: Some(6_600_000),
        },
        Tournament {
            id: "demo-t2".to_string(),
            name: "Canadian Open".to_string(),
            surface: "Hard".to_string(),
            city: "Montreal".to_string(),
            country: "Canada".to_string(),
            category: "WTA 1000".to_string(),
            status: "upcoming".to_string(),
            year: Some(2026),
            start_date: Some("2026-08-08".to_string()),
            end_date: Some("2026-08-16".to_string()),
            prize_money: Some(5_200_000),
        },
    ]
}
