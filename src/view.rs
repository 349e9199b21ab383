//! Pure projections from the match store to renderable views
//!
//! Everything here is a side-effect-free function over
//! `(store snapshot, favorites, filters)`. Rendering code calls
//! [`derive_view`] on every change notification and never mutates shared
//! state; identical inputs always derive an identical view.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{MatchRecord, MatchStatus, Tournament};

/// Group label for matches whose start time is unknown
const UNDATED_GROUP: &str = "Recent";

/// Conjunctive filter over the match collection
///
/// Every populated field must hold for a record to pass; an empty filter
/// passes everything. Surface and year apply through the tournament lookup
/// table, so records whose tournament is unknown fail those two filters.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    /// Keep only matches in the favorites set
    pub favorites_only: bool,
    /// Case-insensitive substring match on either participant name
    pub search: Option<String>,
    /// Exact status match
    pub status: Option<MatchStatus>,
    /// Tournament surface ("Hard", "Clay", "Grass")
    pub surface: Option<String>,
    /// Tournament year
    pub year: Option<i32>,
}

impl MatchFilter {
    /// Filter that passes every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether one record passes every populated predicate
    pub fn accepts(
        &self,
        record: &MatchRecord,
        favorites: &HashSet<String>,
        tournaments: &HashMap<String, Tournament>,
    ) -> bool {
        if self.favorites_only && !favorites.contains(&record.id) {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let p1 = record.player1.name.to_lowercase();
            let p2 = record.player2.name.to_lowercase();
            if !p1.contains(&needle) && !p2.contains(&needle) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if record.status != *status {
                return false;
            }
        }
        if let Some(surface) = &self.surface {
            match tournaments.get(&record.tournament_id) {
                Some(t) if t.surface == *surface => {}
                _ => return false,
            }
        }
        if let Some(year) = self.year {
            match tournaments.get(&record.tournament_id) {
                Some(t) if t.year == Some(year) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Grouping key for the derived view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupKey {
    /// Group by tournament name (falls back to the raw tournament id)
    #[default]
    Tournament,
    /// Group by match status label
    Status,
    /// Group by the date portion of the start time
    StartDate,
}

impl GroupKey {
    fn label_for(
        &self,
        record: &MatchRecord,
        tournaments: &HashMap<String, Tournament>,
    ) -> String {
        match self {
            GroupKey::Tournament => tournaments
                .get(&record.tournament_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| record.tournament_id.clone()),
            GroupKey::Status => record.status.as_str().to_string(),
            GroupKey::StartDate => record
                .start_time
                .as_deref()
                .and_then(|ts| ts.split('T').next())
                .map(str::to_string)
                .unwrap_or_else(|| UNDATED_GROUP.to_string()),
        }
    }
}

/// One group of the derived view, members sorted by match id
#[derive(Debug, Clone, PartialEq)]
pub struct MatchGroup {
    pub label: String,
    pub matches: Vec<MatchRecord>,
}

/// What the screen should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Snapshot not yet complete and nothing in the store
    Loading,
    /// Loaded, but nothing passes the active filters
    Empty,
    /// Loaded with results
    Ready,
}

/// A fully derived, renderable view
#[derive(Debug, Clone, PartialEq)]
pub struct LiveView {
    pub state: DisplayState,
    pub groups: Vec<MatchGroup>,
}

impl LiveView {
    /// Total matches across all groups
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.matches.len()).sum()
    }

    /// Whether no match passed the filters
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Index a tournament list by id for filter and grouping lookups
pub fn index_tournaments(tournaments: Vec<Tournament>) -> HashMap<String, Tournament> {
    tournaments.into_iter().map(|t| (t.id.clone(), t)).collect()
}

/// Records passing the filter, sorted by id
pub fn filter_matches(
    snapshot: &HashMap<String, MatchRecord>,
    favorites: &HashSet<String>,
    tournaments: &HashMap<String, Tournament>,
    filter: &MatchFilter,
) -> Vec<MatchRecord> {
    let mut matches: Vec<MatchRecord> = snapshot
        .values()
        .filter(|record| filter.accepts(record, favorites, tournaments))
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.id.cmp(&b.id));
    matches
}

/// Partition records into groups, groups sorted by label
pub fn group_matches(
    matches: Vec<MatchRecord>,
    tournaments: &HashMap<String, Tournament>,
    group_by: GroupKey,
) -> Vec<MatchGroup> {
    let mut grouped: BTreeMap<String, Vec<MatchRecord>> = BTreeMap::new();
    for record in matches {
        let label = group_by.label_for(&record, tournaments);
        grouped.entry(label).or_default().push(record);
    }
    grouped
        .into_iter()
        .map(|(label, matches)| MatchGroup { label, matches })
        .collect()
}

/// Derive the complete renderable view
///
/// The sole authority for the loading/empty/ready distinction: an empty
/// store mid-load and an empty store after a successful-but-empty snapshot
/// are told apart by `is_loading`, never inferred from store emptiness.
pub fn derive_view(
    snapshot: &HashMap<String, MatchRecord>,
    favorites: &HashSet<String>,
    tournaments: &HashMap<String, Tournament>,
    filter: &MatchFilter,
    group_by: GroupKey,
    is_loading: bool,
) -> LiveView {
    if is_loading && snapshot.is_empty() {
        return LiveView {
            state: DisplayState::Loading,
            groups: Vec::new(),
        };
    }

    let matches = filter_matches(snapshot, favorites, tournaments, filter);
    if matches.is_empty() {
        return LiveView {
            state: DisplayState::Empty,
            groups: Vec::new(),
        };
    }

    LiveView {
        state: DisplayState::Ready,
        groups: group_matches(matches, tournaments, group_by),
    }
}
