//! Favorites persistence
//!
//! A presentation-side collaborator, not part of the sync engine: the set
//! of favorite match ids lives in a JSON-encoded array under a fixed
//! namespace file, read once at mount and rewritten on every toggle. The
//! engine only ever sees the resulting id set as filter input.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// Namespace file holding the favorites array
pub const FAVORITES_FILE: &str = "courtside_favorites.json";

/// Persistent set of favorite match ids
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    ids: HashSet<String>,
}

impl FavoritesStore {
    /// Open the favorites file under `dir`, creating an empty set when the
    /// file does not exist
    ///
    /// A corrupt file is treated as empty rather than failing the mount;
    /// the next toggle rewrites it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(FAVORITES_FILE);
        let ids = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<String>>(&contents) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt favorites file, starting empty");
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, ids })
    }

    /// The current favorite ids
    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    /// Whether a match is a favorite
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of favorites
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no favorites are stored
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flip one id in or out of the set and persist immediately
    ///
    /// Returns whether the id is a favorite after the toggle.
    pub fn toggle(&mut self, id: impl Into<String>) -> Result<bool> {
        let id = id.into();
        let now_favorite = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };
        self.save()?;
        Ok(now_favorite)
    }

    fn save(&self) -> Result<()> {
        let mut list: Vec<&String> = self.ids.iter().collect();
        list.sort();
        std::fs::write(&self.path, serde_json::to_string(&list)?)?;
        Ok(())
    }
}
