//! A view over the shared pads: the controller grid or the editor list
//!
//! A session loads the mapping (falling back to the local cache when the store
//! has nothing), subscribes for remote changes, and persists every edit
//! immediately. Remote updates simply replace the local mapping; whichever
//! write is observed last wins.

use crate::local_cache::LocalCache;
use crate::store::SharedPadStore;
use crate::subscription::Subscription;
use parking_lot::RwLock;
use samspeak_core::{Layout, PadMapping, PageView};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, warn};

/// How long an editor status message stays visible.
pub const STATUS_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Tappable grid. Mirrors remote updates into the local cache.
    Controller,
    /// Pad list with add/delete/reorder. Reports save outcomes.
    Editor,
}

/// Transient save feedback, e.g. `✓ Saved` or `✗ Save failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub success: bool,
    shown_at: Instant,
}

impl StatusMessage {
    fn new(success: bool, ok: &str, failed: &str) -> Self {
        let text = if success {
            format!("✓ {}", ok)
        } else {
            format!("✗ {}", failed)
        };
        Self {
            text,
            success,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= STATUS_TTL
    }
}

pub struct PadSession {
    role: SessionRole,
    store: SharedPadStore,
    pads: Arc<watch::Sender<PadMapping>>,
    status: RwLock<Option<StatusMessage>>,
    subscription: Option<Subscription>,
}

impl PadSession {
    /// Load the pads and start listening for remote changes.
    pub async fn open(store: SharedPadStore, cache: Option<Arc<LocalCache>>, role: SessionRole) -> Self {
        let initial = match store.load().await {
            Some(pads) => pads,
            None => match (&cache, role) {
                (Some(cache), SessionRole::Controller) => cache.controller_fallback(),
                (Some(cache), SessionRole::Editor) => cache.editor_fallback(),
                (None, _) => PadMapping::new(),
            },
        };
        info!("Opened {:?} session with {} pads", role, initial.len());

        let (pads, _) = watch::channel(initial);
        let pads = Arc::new(pads);

        let sink = pads.clone();
        let mirror = match role {
            SessionRole::Controller => cache,
            SessionRole::Editor => None,
        };
        let subscription = store.subscribe(move |update| {
            let Some(update) = update else {
                return;
            };
            if let Some(cache) = &mirror {
                if let Err(e) = cache.mirror(&update) {
                    warn!("Failed to mirror pads into local cache: {}", e);
                }
            }
            sink.send_replace(update);
        });

        Self {
            role,
            store,
            pads,
            status: RwLock::new(None),
            subscription: Some(subscription),
        }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    /// Snapshot of the current mapping.
    pub fn pads(&self) -> PadMapping {
        self.pads.borrow().clone()
    }

    /// Notified on every local edit and remote update.
    pub fn changes(&self) -> watch::Receiver<PadMapping> {
        self.pads.subscribe()
    }

    pub fn layout(&self) -> Layout {
        Layout::derive(&self.pads.borrow())
    }

    pub fn page_view(&self, page: usize) -> PageView {
        PageView::build(&self.pads.borrow(), page)
    }

    /// Text spoken when a pad is tapped.
    pub fn label(&self, index: usize) -> String {
        self.pads.borrow().label(index)
    }

    pub async fn set_text(&self, index: usize, text: impl Into<String>) -> bool {
        let text = text.into();
        let edited = self.mutate(|pads| pads.set_text(index, text));
        self.persist(&edited, "Saved", "Save failed").await
    }

    /// Returns the new pad's index and whether it was saved.
    pub async fn add_pad(&self) -> (usize, bool) {
        let mut added = 0;
        let edited = self.mutate(|pads| added = pads.add_pad());
        (added, self.persist(&edited, "Pad added", "Add failed").await)
    }

    pub async fn delete_pad(&self, index: usize) -> bool {
        let edited = self.mutate(|pads| {
            pads.delete_pad(index);
        });
        self.persist(&edited, "Pad deleted", "Delete failed").await
    }

    /// Drag the entry at list position `from` onto position `to`. Nothing is
    /// saved when the move is a no-op.
    pub async fn reorder(&self, from: usize, to: usize) -> bool {
        let mut edited = None;
        self.pads.send_if_modified(|pads| {
            let moved = pads.reorder(from, to);
            if moved {
                edited = Some(pads.clone());
            }
            moved
        });
        match edited {
            Some(edited) => self.persist(&edited, "Reordered", "Reorder failed").await,
            None => false,
        }
    }

    /// Current status message, if one is showing.
    pub fn status(&self) -> Option<StatusMessage> {
        let mut status = self.status.write();
        if status.as_ref().map(StatusMessage::is_expired).unwrap_or(false) {
            *status = None;
        }
        status.clone()
    }

    /// Stop listening for remote changes.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!("Closed {:?} session", self.role);
        }
    }

    /// Apply a local edit and return the mapping exactly as edited. A remote
    /// update may replace the live mapping before it is saved.
    fn mutate(&self, edit: impl FnOnce(&mut PadMapping)) -> PadMapping {
        let mut edited = PadMapping::new();
        self.pads.send_modify(|pads| {
            edit(pads);
            edited = pads.clone();
        });
        edited
    }

    async fn persist(&self, edited: &PadMapping, ok: &str, failed: &str) -> bool {
        let saved = self.store.save(edited).await;
        if self.role == SessionRole::Editor {
            *self.status.write() = Some(StatusMessage::new(saved, ok, failed));
        }
        saved
    }
}

impl Drop for PadSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn test_saves_local_edit_even_if_remote_update_lands_first() {
        let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
        let session = PadSession::open(store.clone(), None, SessionRole::Editor).await;

        let edited = session.mutate(|pads| pads.set_text(0, "Mine"));
        let mut remote = PadMapping::new();
        remote.set_text(0, "Theirs");
        session.pads.send_replace(remote);

        assert!(session.persist(&edited, "Saved", "Save failed").await);
        assert_eq!(store.load().await, Some(edited));
        assert_eq!(session.status().map(|s| s.text), Some("✓ Saved".to_string()));
    }
}
