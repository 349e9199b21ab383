//! Live match state synchronization engine
//!
//! [`LiveScores`] is the activation object: starting it bootstraps the
//! store from the one-shot snapshot while the push feed streams in
//! concurrently, every record flowing through the reducer under
//! last-write-wins. The handle exposes the presentation-facing triple
//! `{matches, is_connected, is_loading}` and owns every background task;
//! shutting it down (or dropping it) closes the transport and cancels a
//! still-pending snapshot so nothing is applied after teardown.
//!
//! # Example
//!
//! ```ignore
//! use courtside::client::ApiConfig;
//! use courtside::sync::LiveScores;
//!
//! let engine = LiveScores::start(ApiConfig::from_env())?;
//! let mut changes = engine.changes();
//! while changes.changed().await.is_ok() {
//!     render(engine.matches().await, engine.is_connected(), engine.is_loading());
//! }
//! ```

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::{ApiConfig, Client};
use crate::error::Result;
use crate::store::MatchStore;
use crate::types::MatchRecord;
use crate::websocket::{ReconnectConfig, StreamClient};

/// Handle to a running synchronization engine
///
/// Created by [`LiveScores::start`]. The engine keeps the keyed match
/// collection current until the handle is shut down or dropped.
#[derive(Debug)]
pub struct LiveScores {
    store: MatchStore,
    stream: Option<StreamClient>,
    connected_rx: watch::Receiver<bool>,
    loading_rx: watch::Receiver<bool>,
    snapshot_task: Option<JoinHandle<()>>,
    reducer_task: Option<JoinHandle<()>>,
}

impl LiveScores {
    /// Activate the engine with default reconnection behavior
    ///
    /// Must be called within a tokio runtime.
    pub fn start(config: ApiConfig) -> Result<Self> {
        Self::start_with(config, ReconnectConfig::default())
    }

    /// Activate the engine with explicit reconnection behavior
    pub fn start_with(config: ApiConfig, reconnect: ReconnectConfig) -> Result<Self> {
        let client = Client::new(config.clone())?;
        let store = MatchStore::new();
        let (loading_tx, loading_rx) = watch::channel(true);

        let snapshot_task = tokio::spawn(load_snapshot(
            client,
            store.clone(),
            loading_tx,
        ));

        let (stream, record_rx) = StreamClient::start(config.ws_url().to_string(), reconnect);
        let connected_rx = stream.connected_receiver();
        let reducer_task = tokio::spawn(reduce_stream(record_rx, store.clone()));

        Ok(Self {
            store,
            stream: Some(stream),
            connected_rx,
            loading_rx,
            snapshot_task: Some(snapshot_task),
            reducer_task: Some(reducer_task),
        })
    }

    /// Cloned snapshot of the keyed match collection
    pub async fn matches(&self) -> HashMap<String, MatchRecord> {
        self.store.snapshot().await
    }

    /// Latest record for one match id
    pub async fn get(&self, id: &str) -> Option<MatchRecord> {
        self.store.get(id).await
    }

    /// Whether the stream transport is currently open
    pub fn is_connected(&self) -> bool {
        *self.connected_rx.borrow()
    }

    /// Whether the bootstrap snapshot is still pending
    ///
    /// Transitions true to false exactly once per activation, on snapshot
    /// completion regardless of its outcome, and never reverts.
    pub fn is_loading(&self) -> bool {
        *self.loading_rx.borrow()
    }

    /// Count of accepted writes since activation
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Subscribe to store revisions (bumped on every accepted write)
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.store.changes()
    }

    /// Subscribe to the connectivity flag
    pub fn connectivity_receiver(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }

    /// Subscribe to the loading flag
    pub fn loading_receiver(&self) -> watch::Receiver<bool> {
        self.loading_rx.clone()
    }

    /// Consecutive failed stream connection attempts
    pub fn reconnect_attempts(&self) -> u64 {
        self.stream.as_ref().map_or(0, |s| s.reconnect_attempts())
    }

    /// Most recent stream error, if any
    pub async fn last_stream_error(&self) -> Option<String> {
        match &self.stream {
            Some(stream) => stream.last_error().await,
            None => None,
        }
    }

    /// Deactivate: close the transport and cancel pending work
    ///
    /// A snapshot fetch still in flight is aborted so it cannot write into
    /// the store after teardown.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.snapshot_task.take() {
            task.abort();
            let _ = task.await;
        }
        if let Some(stream) = self.stream.take() {
            stream.shutdown().await;
        }
        if let Some(task) = self.reducer_task.take() {
            let _ = task.await;
        }
        info!("live scores engine shut down");
    }
}

impl Drop for LiveScores {
    fn drop(&mut self) {
        if let Some(task) = &self.snapshot_task {
            task.abort();
        }
        if let Some(task) = &self.reducer_task {
            task.abort();
        }
        // StreamClient aborts its own task on drop
    }
}

/// Bootstrap the store from the one-shot snapshot
///
/// Any failure degrades to an empty initial set; the stream will populate
/// the store eventually. The loading flag flips exactly once, whatever the
/// outcome.
async fn load_snapshot(client: Client, store: MatchStore, loading_tx: watch::Sender<bool>) {
    match client.live_matches().await {
        Ok(records) => {
            info!(count = records.len(), "loaded initial matches");
            for record in records {
                store.apply(record).await;
            }
        }
        Err(e) => {
            warn!(error = %e, "initial match fetch failed, waiting for stream");
        }
    }
    let _ = loading_tx.send(false);
}

/// Reduce stream records into the store until the feed task ends
async fn reduce_stream(mut record_rx: mpsc::Receiver<MatchRecord>, store: MatchStore) {
    while let Some(record) = record_rx.recv().await {
        store.apply(record).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_config() -> ApiConfig {
        // Discard port: connections are refused immediately
        ApiConfig::new("http://127.0.0.1:9")
    }

    fn no_retry() -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            backoff_multiplier: 2.0,
            max_attempts: Some(1),
        }
    }

    #[tokio::test]
    async fn test_failed_snapshot_degrades_to_empty() {
        let engine = LiveScores::start_with(unreachable_config(), no_retry()).unwrap();

        let mut loading_rx = engine.loading_receiver();
        while *loading_rx.borrow() {
            loading_rx.changed().await.unwrap();
        }

        assert!(!engine.is_loading());
        assert!(engine.matches().await.is_empty());
        assert_eq!(engine.revision(), 0);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_loading_flag_never_reverts() {
        let engine = LiveScores::start_with(unreachable_config(), no_retry()).unwrap();

        let mut loading_rx = engine.loading_receiver();
        while *loading_rx.borrow() {
            loading_rx.changed().await.unwrap();
        }

        // Give the failed stream cycle time to run out; loading must stay false
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!engine.is_loading());
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_disconnected_engine_reports_not_connected() {
        let engine = LiveScores::start_with(unreachable_config(), no_retry()).unwrap();
        assert!(!engine.is_connected());
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_completes_with_pending_work() {
        let engine = LiveScores::start_with(unreachable_config(), ReconnectConfig::default())
            .unwrap();
        // Shut down while the snapshot fetch and stream backoff may still
        // be in flight
        engine.shutdown().await;
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<LiveScores>();
        assert_sync::<LiveScores>();
    }
}
