//! # Collaboration Provider
//!
//! The seam between an editor session and the realtime transport. The
//! transport itself (document sync, awareness propagation, reconnects)
//! lives behind [`CollaborationProvider`]; sessions only consume its
//! event stream and its collaborator list.
//!
//! [`LocalProvider`] is an in-process implementation driven by hand, used
//! by tests and by the CLI simulator.

use crate::presence::LocalUser;
use crate::status::ConnectionStatus;
use blockpad_document::Node;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

/// Events emitted by a provider, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// Connection status transition
    Status(ConnectionStatus),

    /// Initial document sync finished
    Synced,

    /// Provider replaced the document with remote state
    RemoteContent(Node),

    /// Remote awareness state changed; re-read collaborators
    AwarenessChanged,
}

/// A remote party as reported by the provider's awareness state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCollaborator {
    pub client_id: u64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub color: Option<String>,
}

pub trait CollaborationProvider: Send + Sync {
    /// Whether the initial sync already completed
    fn is_synced(&self) -> bool;

    /// Subscribe to provider events; dropping the receiver unsubscribes
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;

    /// Remote parties, or `None` while awareness state is unavailable
    fn collaborators(&self) -> Option<Vec<RawCollaborator>>;

    /// Publish the local user to other parties
    fn set_local_user(&self, user: &LocalUser);
}

const EVENT_CAPACITY: usize = 64;

/// In-process provider driven by explicit calls
#[derive(Debug)]
pub struct LocalProvider {
    events: broadcast::Sender<ProviderEvent>,
    synced: AtomicBool,
    peers: RwLock<Vec<RawCollaborator>>,
    local_user: RwLock<Option<LocalUser>>,
}

impl LocalProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            events,
            synced: AtomicBool::new(false),
            peers: RwLock::new(Vec::new()),
            local_user: RwLock::new(None),
        }
    }

    /// Broadcast an event, returning how many subscribers received it
    pub fn emit(&self, event: ProviderEvent) -> usize {
        if event == ProviderEvent::Synced {
            self.synced.store(true, Ordering::SeqCst);
        }
        debug!(?event, "Provider event");
        // no subscribers is not an error for a provider
        self.events.send(event).unwrap_or(0)
    }

    pub fn set_status(&self, status: ConnectionStatus) -> usize {
        self.emit(ProviderEvent::Status(status))
    }

    pub fn mark_synced(&self) -> usize {
        self.emit(ProviderEvent::Synced)
    }

    /// Simulate a connection failure
    pub fn fail(&self) -> usize {
        self.set_status(ConnectionStatus::Disconnected)
    }

    pub fn push_content(&self, root: Node) -> usize {
        self.emit(ProviderEvent::RemoteContent(root))
    }

    /// Add or replace a remote party
    pub fn join(&self, peer: RawCollaborator) -> usize {
        {
            let mut peers = self.peers.write().unwrap_or_else(PoisonError::into_inner);
            match peers.iter_mut().find(|p| p.client_id == peer.client_id) {
                Some(existing) => *existing = peer,
                None => peers.push(peer),
            }
        }
        self.emit(ProviderEvent::AwarenessChanged)
    }

    pub fn leave(&self, client_id: u64) -> usize {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|p| p.client_id != client_id);
        self.emit(ProviderEvent::AwarenessChanged)
    }

    /// Live subscriptions (sessions that have not been torn down)
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// User published by the attached session, if any
    pub fn local_user(&self) -> Option<LocalUser> {
        self.local_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CollaborationProvider for LocalProvider {
    fn is_synced(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }

    fn collaborators(&self) -> Option<Vec<RawCollaborator>> {
        Some(
            self.peers
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }

    fn set_local_user(&self, user: &LocalUser) {
        *self.local_user.write().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
    }
}
