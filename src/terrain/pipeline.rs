use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::debug;

use super::FillShape;

slotmap::new_key_type! {
    /// Token identifying one in-flight fill waiting on its brush texture.
    pub struct FillRequestId;
}

/// Load state of one brush texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureState {
    Loading,
    Ready,
    Failed,
}

/// Per-URL texture load state. The host performs the actual image load.
#[derive(Debug, Clone, Default)]
pub struct TextureCache {
    states: HashMap<String, TextureState>,
}

impl TextureCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, url: &str) -> Option<TextureState> {
        self.states.get(url).copied()
    }

    #[must_use]
    pub fn is_ready(&self, url: &str) -> bool {
        self.state(url) == Some(TextureState::Ready)
    }

    /// Marks `url` as loading. Returns `true` if the caller must issue a new
    /// load, `false` if one is already in flight or finished.
    pub fn begin_load(&mut self, url: &str) -> bool {
        match self.states.get(url) {
            Some(TextureState::Loading | TextureState::Ready) => false,
            Some(TextureState::Failed) | None => {
                self.states.insert(url.to_owned(), TextureState::Loading);
                true
            }
        }
    }

    pub fn mark_ready(&mut self, url: &str) {
        self.states.insert(url.to_owned(), TextureState::Ready);
    }

    pub fn mark_failed(&mut self, url: &str) {
        self.states.insert(url.to_owned(), TextureState::Failed);
    }
}

/// A fill waiting for its texture.
#[derive(Debug, Clone)]
pub struct PendingFill {
    pub shape: FillShape,
    seq: u64,
}

/// Fills deferred until their brush texture has loaded.
///
/// Every request carries its own token, so repeated or overlapping fills never
/// share state. Draining removes requests, which makes a duplicate load
/// notification harmless.
#[derive(Debug, Default)]
pub struct FillQueue {
    pending: SlotMap<FillRequestId, PendingFill>,
    next_seq: u64,
}

impl FillQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: FillRequestId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn enqueue(&mut self, shape: FillShape) -> FillRequestId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.pending.insert(PendingFill { shape, seq });
        debug!(?id, pending = self.pending.len(), "fill deferred until texture loads");
        id
    }

    pub fn cancel(&mut self, id: FillRequestId) -> Option<PendingFill> {
        self.pending.remove(id)
    }

    /// Removes and returns every request waiting on `url`, oldest first.
    pub fn take_for_texture(&mut self, url: &str) -> Vec<(FillRequestId, PendingFill)> {
        let ids: Vec<FillRequestId> = self
            .pending
            .iter()
            .filter(|(_, p)| p.shape.texture_url() == url)
            .map(|(id, _)| id)
            .collect();
        let mut taken: Vec<(FillRequestId, PendingFill)> = ids
            .into_iter()
            .filter_map(|id| self.pending.remove(id).map(|p| (id, p)))
            .collect();
        taken.sort_by_key(|(_, p)| p.seq);
        taken
    }
}
