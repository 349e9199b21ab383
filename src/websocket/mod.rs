//! Streaming transport for the live match feed
//!
//! This module owns the WebSocket connection to the backend's push feed.
//! It handles connection management, automatic reconnection with backoff,
//! and per-frame decoding; decoded records are emitted on a channel for the
//! sync engine to reduce into the store.
//!
//! # Example
//!
//! ```ignore
//! use courtside::websocket::{ReconnectConfig, StreamClient};
//!
//! let (client, mut records) = StreamClient::start(
//!     "ws://localhost:8080/ws".to_string(),
//!     ReconnectConfig::default(),
//! );
//!
//! while let Some(record) = records.recv().await {
//!     // hand to the reducer
//! }
//! # client.shutdown().await;
//! ```

mod client;

pub use client::{ConnectionState, ReconnectConfig, StreamClient};
