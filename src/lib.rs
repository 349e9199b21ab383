//! Live tennis match state synchronization client
//!
//! A client for the hardcourt backend, combining:
//! - A one-shot REST bootstrap snapshot of currently-live matches
//! - A WebSocket push feed of complete per-match state records
//! - A last-write-wins keyed store exposed as `{matches, is_connected,
//!   is_loading}` to presentation code
//! - Pure view projections (filtering, grouping, display state)
//!
//! # Example
//!
//! ```ignore
//! use courtside::client::ApiConfig;
//! use courtside::sync::LiveScores;
//!
//! #[tokio::main]
//! async fn main() -> courtside::Result<()> {
//!     let engine = LiveScores::start(ApiConfig::from_env())?;
//!     let mut changes = engine.changes();
//!     while changes.changed().await.is_ok() {
//!         println!("{} matches tracked", engine.matches().await.len());
//!     }
//!     engine.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod favorites;
pub mod rest;
pub mod store;
pub mod sync;
pub mod types;
pub mod view;
pub mod websocket;

pub use client::{ApiConfig, Client};
pub use error::{Error, Result};
pub use rest::PastMatchesQuery;
pub use store::{Applied, MatchStore};
pub use sync::LiveScores;
pub use types::*;
pub use view::{derive_view, DisplayState, GroupKey, LiveView, MatchFilter, MatchGroup};
pub use websocket::{ConnectionState, ReconnectConfig, StreamClient};
