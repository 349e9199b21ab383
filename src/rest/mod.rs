//! REST query implementations for the backend API
//!
//! One-shot fetches: the live-matches bootstrap snapshot plus the browsing
//! queries for tournaments and past matches. All of them are plain GETs
//! returning decoded wire types; retry and degrade-to-empty policies live
//! with the caller (the sync engine degrades a failed bootstrap snapshot,
//! browsing callers surface the error).

mod matches;
mod tournaments;

pub use matches::PastMatchesQuery;
