//! Linear undo/redo over full-scene snapshots.

use tracing::{debug, trace};

use crate::scene::{Element, Scene};
use crate::terrain::TerrainTileStore;

/// A deep copy of the element list and, when it changed, the terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub elements: Vec<Element>,
    pub terrain: Option<TerrainTileStore>,
}

impl HistorySnapshot {
    /// Captures the elements only; restoring leaves terrain untouched.
    #[must_use]
    pub fn elements_of(scene: &Scene) -> Self {
        Self {
            elements: scene.elements.clone(),
            terrain: None,
        }
    }

    /// Captures elements and terrain.
    #[must_use]
    pub fn full(scene: &Scene) -> Self {
        Self {
            elements: scene.elements.clone(),
            terrain: Some(scene.terrain.clone()),
        }
    }
}

/// A linear sequence of snapshots with a cursor on the current one.
///
/// Committing past the cursor discards the redo tail. When `limit` is non-zero
/// the oldest snapshots are dropped to stay within it.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    snapshots: Vec<HistorySnapshot>,
    cursor: Option<usize>,
    limit: usize,
}

impl HistoryManager {
    /// Creates an empty history; `limit == 0` means unbounded.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: None,
            limit,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the current snapshot, `None` when empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.cursor.and_then(|c| self.snapshots.get(c))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor
            .is_some_and(|c| c + 1 < self.snapshots.len())
    }

    /// Appends a snapshot after the cursor, truncating any redo tail.
    pub fn commit(&mut self, snapshot: HistorySnapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        if keep < self.snapshots.len() {
            debug!(
                discarded = self.snapshots.len() - keep,
                "commit truncates redo history"
            );
            self.snapshots.truncate(keep);
        }
        self.snapshots.push(snapshot);

        if self.limit > 0 && self.snapshots.len() > self.limit {
            let excess = self.snapshots.len() - self.limit;
            // The oldest kept snapshot must carry terrain, or undoing to it
            // would keep whatever terrain is newer.
            if self.snapshots[excess].terrain.is_none() {
                let inherited = self.snapshots[..excess]
                    .iter()
                    .rev()
                    .find_map(|s| s.terrain.clone());
                self.snapshots[excess].terrain = inherited;
            }
            self.snapshots.drain(..excess);
        }
        self.cursor = Some(self.snapshots.len() - 1);
        trace!(cursor = ?self.cursor, len = self.snapshots.len(), "history commit");
    }

    /// Steps back one snapshot. No-op at the first snapshot.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        let c = self.cursor.filter(|&c| c > 0)?;
        self.cursor = Some(c - 1);
        self.snapshots.get(c - 1)
    }

    /// Steps forward one snapshot. No-op at the last snapshot.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        let c = self.cursor.filter(|&c| c + 1 < self.snapshots.len())?;
        self.cursor = Some(c + 1);
        self.snapshots.get(c + 1)
    }

    /// Terrain in effect at the cursor: the newest terrain-bearing snapshot at
    /// or before it.
    #[must_use]
    pub fn terrain_at_cursor(&self) -> Option<&TerrainTileStore> {
        let c = self.cursor?;
        self.snapshots[..=c]
            .iter()
            .rev()
            .find_map(|s| s.terrain.as_ref())
    }
}
