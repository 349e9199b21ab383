//! WebSocket connection manager for the live match feed

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use rand::Rng;
use tokio::sync::{mpsc, watch, RwLock};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::types::MatchRecord;

/// Capacity of the decoded-record channel
const RECORD_CHANNEL_CAPACITY: usize = 100;

/// Connection state of the stream client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, transport not yet opened
    Idle,
    /// Handshake in progress
    Connecting,
    /// Connected and receiving frames
    Open,
    /// Connection lost, backoff pending before the next attempt
    Reconnecting,
    /// Shut down or retry horizon exhausted; terminal
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "Idle"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Reconnecting => write!(f, "Reconnecting"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Configuration for automatic reconnection
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,
    /// Maximum delay between reconnect attempts
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum number of consecutive failed attempts (None for unlimited)
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    /// Base delay for a given attempt number (0-indexed), before jitter
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = (self.initial_delay.as_millis() as f64 * multiplier) as u64;
        Duration::from_millis(delay_ms).min(self.max_delay)
    }

    /// Delay for a given attempt with jitter applied
    ///
    /// Samples uniformly from the upper half of the base delay so
    /// simultaneously disconnected clients do not retry in lockstep.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let base = self.delay_for_attempt(attempt);
        let base_ms = base.as_millis() as u64;
        if base_ms < 2 {
            return base;
        }
        let jittered = rand::thread_rng().gen_range(base_ms / 2..=base_ms);
        Duration::from_millis(jittered)
    }

    /// Whether another attempt should be made after `attempt` failures
    pub fn should_attempt(&self, attempt: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempt < max,
            None => true,
        }
    }
}

/// Handle to the feed connection task
///
/// Returned by [`StreamClient::start`] together with the decoded-record
/// receiver. Owns the background task: dropping the handle (or calling
/// [`StreamClient::shutdown`]) tears the connection down, and no record is
/// emitted after shutdown is observed.
#[derive(Debug)]
pub struct StreamClient {
    state_rx: watch::Receiver<ConnectionState>,
    connected_rx: watch::Receiver<bool>,
    reconnect_attempts: Arc<AtomicU64>,
    last_error: Arc<RwLock<Option<String>>>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl StreamClient {
    /// Open the feed at `url` and start reading
    ///
    /// Spawns the connection task on the current runtime and returns the
    /// handle plus the channel of decoded records. The task reconnects with
    /// backoff per `reconnect` until shut down or the retry horizon is
    /// exhausted.
    pub fn start(
        url: String,
        reconnect: ReconnectConfig,
    ) -> (Self, mpsc::Receiver<MatchRecord>) {
        let (record_tx, record_rx) = mpsc::channel(RECORD_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (connected_tx, connected_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reconnect_attempts = Arc::new(AtomicU64::new(0));
        let last_error = Arc::new(RwLock::new(None));

        let task = tokio::spawn(run_connection(ConnectionTask {
            url,
            reconnect,
            record_tx,
            state_tx,
            connected_tx,
            shutdown_rx,
            reconnect_attempts: Arc::clone(&reconnect_attempts),
            last_error: Arc::clone(&last_error),
        }));

        (
            Self {
                state_rx,
                connected_rx,
                reconnect_attempts,
                last_error,
                shutdown_tx,
                task: Some(task),
            },
            record_rx,
        )
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Whether the transport is currently open
    pub fn is_connected(&self) -> bool {
        *self.connected_rx.borrow()
    }

    /// Subscribe to connection state changes
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Subscribe to the connectivity flag
    pub fn connected_receiver(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }

    /// Consecutive failed connection attempts since the last successful open
    pub fn reconnect_attempts(&self) -> u64 {
        self.reconnect_attempts.load(Ordering::Relaxed)
    }

    /// Most recent transport or handshake error, if any
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Close the transport and stop the connection task
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

struct ConnectionTask {
    url: String,
    reconnect: ReconnectConfig,
    record_tx: mpsc::Sender<MatchRecord>,
    state_tx: watch::Sender<ConnectionState>,
    connected_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    reconnect_attempts: Arc<AtomicU64>,
    last_error: Arc<RwLock<Option<String>>>,
}

impl ConnectionTask {
    fn set_state(&self, state: ConnectionState) {
        let _ = self.state_tx.send(state);
        let _ = self.connected_tx.send(state == ConnectionState::Open);
    }

    async fn record_error(&self, error: String) {
        *self.last_error.write().await = Some(error);
    }

    fn shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}

/// Outcome of one connection attempt plus read session
enum SessionEnd {
    /// Remote close, EOF or transport error; reconnect applies
    Lost,
    /// Local shutdown or the record receiver went away; terminal
    Stop,
}

/// Resolve once the shutdown flag is raised (or the handle is gone)
async fn wait_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}

async fn run_connection(mut task: ConnectionTask) {
    loop {
        if task.shutting_down() {
            break;
        }
        task.set_state(ConnectionState::Connecting);

        let mut shutdown_rx = task.shutdown_rx.clone();
        let connected = tokio::select! {
            _ = wait_shutdown(&mut shutdown_rx) => break,
            result = connect_async(task.url.as_str()) => result,
        };

        match connected {
            Ok((stream, _response)) => {
                info!(url = %task.url, "live feed connected");
                task.reconnect_attempts.store(0, Ordering::Relaxed);
                task.set_state(ConnectionState::Open);

                match read_session(&mut task, stream).await {
                    SessionEnd::Stop => break,
                    SessionEnd::Lost => {}
                }
            }
            Err(e) => {
                task.record_error(e.to_string()).await;
                debug!(url = %task.url, error = %e, "live feed connect failed");
            }
        }

        if task.shutting_down() {
            break;
        }

        // Backoff gate before the next attempt
        let attempt = task.reconnect_attempts.fetch_add(1, Ordering::Relaxed) as u32;
        if !task.reconnect.should_attempt(attempt) {
            warn!(
                attempts = attempt,
                "live feed retry horizon exhausted, giving up"
            );
            break;
        }
        task.set_state(ConnectionState::Reconnecting);
        let delay = task.reconnect.jittered_delay(attempt);
        info!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "live feed reconnecting");

        let mut shutdown_rx = task.shutdown_rx.clone();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_rx.changed() => {}
        }
    }

    task.set_state(ConnectionState::Closed);
}

async fn read_session<S>(
    task: &mut ConnectionTask,
    mut stream: S,
) -> SessionEnd
where
    S: futures_util::Stream<
            Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>,
        > + Unpin,
{
    let mut shutdown_rx = task.shutdown_rx.clone();
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    return SessionEnd::Stop;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // One JSON-encoded MatchRecord per frame. A bad
                        // frame is dropped; it never kills the connection.
                        match serde_json::from_str::<MatchRecord>(&text) {
                            Ok(record) => {
                                debug!(id = %record.id, "feed record received");
                                if task.record_tx.send(record).await.is_err() {
                                    return SessionEnd::Stop;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "dropping malformed feed payload");
                            }
                        }
                    }
                    // Protocol pings are answered by the transport; nothing
                    // else on this feed carries data.
                    Some(Ok(Message::Close(_))) => {
                        info!("live feed closed by server");
                        task.record_error("closed by server".to_string()).await;
                        return SessionEnd::Lost;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "live feed transport error");
                        task.record_error(e.to_string()).await;
                        return SessionEnd::Lost;
                    }
                    None => {
                        info!("live feed stream ended");
                        task.record_error("stream ended".to_string()).await;
                        return SessionEnd::Lost;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ ConnectionState Tests ============

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Idle.to_string(), "Idle");
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
        assert_eq!(ConnectionState::Open.to_string(), "Open");
        assert_eq!(ConnectionState::Reconnecting.to_string(), "Reconnecting");
        assert_eq!(ConnectionState::Closed.to_string(), "Closed");
    }

    // ============ ReconnectConfig Tests ============

    #[test]
    fn test_reconnect_config_default() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.backoff_multiplier, 2.0);
        assert!(config.max_attempts.is_none());
    }

    #[test]
    fn test_reconnect_delay_doubles_per_attempt() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            max_attempts: None,
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn test_reconnect_delay_capped_at_max() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 10.0,
            max_attempts: None,
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(6), Duration::from_secs(5));
    }

    #[test]
    fn test_jittered_delay_stays_in_bounds() {
        let config = ReconnectConfig::default();
        for attempt in 0..6 {
            let base = config.delay_for_attempt(attempt);
            for _ in 0..50 {
                let jittered = config.jittered_delay(attempt);
                assert!(jittered >= base / 2, "jitter below half base");
                assert!(jittered <= base, "jitter above base");
            }
        }
    }

    #[test]
    fn test_should_attempt_respects_horizon() {
        let unlimited = ReconnectConfig::default();
        assert!(unlimited.should_attempt(0));
        assert!(unlimited.should_attempt(1000));

        let limited = ReconnectConfig {
            max_attempts: Some(3),
            ..Default::default()
        };
        assert!(limited.should_attempt(0));
        assert!(limited.should_attempt(2));
        assert!(!limited.should_attempt(3));
        assert!(!limited.should_attempt(4));
    }

    // ============ StreamClient Tests ============

    #[tokio::test]
    async fn test_start_reports_attempts_against_dead_endpoint() {
        // Nothing listens here; the client should cycle through failed
        // attempts and give up after the configured horizon.
        let config = ReconnectConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            backoff_multiplier: 2.0,
            max_attempts: Some(2),
        };
        let (client, _records) = StreamClient::start(
            "ws://127.0.0.1:9/ws".to_string(),
            config,
        );

        let mut state_rx = client.state_receiver();
        while *state_rx.borrow() != ConnectionState::Closed {
            if state_rx.changed().await.is_err() {
                break;
            }
        }

        assert_eq!(client.state(), ConnectionState::Closed);
        assert!(!client.is_connected());
        // Initial connect plus two retries, all failed
        assert_eq!(client.reconnect_attempts(), 3);
        assert!(client.last_error().await.is_some());
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_terminal() {
        let (client, _records) = StreamClient::start(
            "ws://127.0.0.1:9/ws".to_string(),
            ReconnectConfig::default(),
        );
        let state_rx = client.state_receiver();
        client.shutdown().await;
        assert_eq!(*state_rx.borrow(), ConnectionState::Closed);
    }

    #[test]
    fn test_stream_client_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<StreamClient>();
        assert_sync::<StreamClient>();
    }
}
