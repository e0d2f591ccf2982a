//! # Live Session
//!
//! Wires an [`EditorSession`] to an optional collaboration provider.
//!
//! ## Lifecycle
//!
//! ```text
//! start ──► standalone: seed now (if empty) + focus start
//!   │
//!   └────► collaborative: subscribe, arm one-time "synced" observer
//!                │
//!        provider events ──► status cell / presence cell / content
//!                │
//!        first Synced ──► deferred: yield once, seed if still empty
//!                │
//!        drop/close ──► subscription released
//! ```
//!
//! The seed check after sync is deferred rather than run inline: the
//! provider may deliver the remote document in the same batch as its
//! synced event, and seeding in between would clobber it.

use crate::presence::{self, CollaboratorPresence, LocalUser, ANONYMOUS};
use crate::provider::{CollaborationProvider, ProviderEvent};
use crate::session::{EditorSession, SeedOutcome};
use crate::status::{ConnectionStatus, StatusTracker};
use crate::{commands, CommandRegistry, ContentSeed, EditorError};
use blockpad_document::{Document, Node};
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Session handle shared between the UI path and the provider pump
pub type SharedSession = Arc<Mutex<EditorSession>>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Which seed a session starts with
#[derive(Debug, Clone, Default)]
pub enum SeedChoice {
    #[default]
    Builtin,
    Custom(ContentSeed),
    Disabled,
}

#[derive(Default)]
pub struct SessionOptions {
    pub id: Option<String>,
    pub document: Option<Document>,
    pub provider: Option<Arc<dyn CollaborationProvider>>,
    pub user_name: Option<String>,
    pub seed: SeedChoice,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn CollaborationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_seed(mut self, seed: ContentSeed) -> Self {
        self.seed = SeedChoice::Custom(seed);
        self
    }

    pub fn without_seed(mut self) -> Self {
        self.seed = SeedChoice::Disabled;
        self
    }
}

/// Work queued for the next scheduling hop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    SeedIfEmpty,
}

struct ProviderLink {
    provider: Arc<dyn CollaborationProvider>,
    events: broadcast::Receiver<ProviderEvent>,
    synced_observer_armed: bool,
    deferred: VecDeque<Deferred>,
}

impl Drop for ProviderLink {
    fn drop(&mut self) {
        debug!("Released provider subscription");
    }
}

/// An editor session plus its connection status and presence cells
pub struct LiveSession {
    session: SharedSession,
    status: StatusTracker,
    presence: watch::Sender<Vec<CollaboratorPresence>>,
    link: Option<ProviderLink>,
}

impl LiveSession {
    /// Build the session; fails only on an invalid seed
    pub fn start(options: SessionOptions) -> Result<Self, EditorError> {
        let seed = match options.seed {
            SeedChoice::Builtin => Some(ContentSeed::builtin()?),
            SeedChoice::Custom(seed) => Some(seed),
            SeedChoice::Disabled => None,
        };
        let id = options.id.unwrap_or_else(|| {
            format!("session-{}", NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
        });
        let user = LocalUser::new(options.user_name.as_deref().unwrap_or(ANONYMOUS));
        let document = options.document.unwrap_or_else(Document::empty);

        let mut session = EditorSession::new(id, document, seed, user.clone());
        let status = StatusTracker::new(options.provider.is_some());
        let (presence_cell, _) = watch::channel(Vec::new());

        let link = match options.provider {
            Some(provider) => {
                provider.set_local_user(&user);
                let mut link = ProviderLink {
                    events: provider.subscribe(),
                    provider,
                    synced_observer_armed: true,
                    deferred: VecDeque::new(),
                };
                if link.provider.is_synced() {
                    // sync finished before we attached: nothing left to observe
                    link.synced_observer_armed = false;
                    link.deferred.push_back(Deferred::SeedIfEmpty);
                    status.record(ConnectionStatus::Synced);
                }
                presence_cell.send_replace(presence::project(link.provider.collaborators().as_deref()));
                Some(link)
            }
            None => {
                if session.seed_if_empty()? == SeedOutcome::Applied {
                    session.focus_start();
                }
                None
            }
        };

        info!(
            session = %session.id(),
            user = %user.name,
            collaborative = link.is_some(),
            "Started editor session"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            status,
            presence: presence_cell,
            link,
        })
    }

    /// Shared handle for UI code
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Lock the session for direct use; never hold this across an `.await`.
    ///
    /// [`LiveSession::document`] and [`LiveSession::execute`] take this lock
    /// themselves, so calling them while a guard is alive deadlocks.
    pub fn lock(&self) -> MutexGuard<'_, EditorSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.current()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub fn presence(&self) -> Vec<CollaboratorPresence> {
        self.presence.borrow().clone()
    }

    pub fn watch_presence(&self) -> watch::Receiver<Vec<CollaboratorPresence>> {
        self.presence.subscribe()
    }

    pub fn is_collaborative(&self) -> bool {
        self.link.is_some()
    }

    /// Snapshot of the current document. Takes the session lock.
    pub fn document(&self) -> Document {
        self.lock().document().clone()
    }

    /// Run a slash command from `registry` over the trigger text in `range`.
    /// Takes the session lock.
    pub fn execute(
        &self,
        registry: &CommandRegistry,
        key: &str,
        range: Range<usize>,
    ) -> Result<u64, EditorError> {
        let mut session = self.lock();
        commands::execute_by_name(&mut session, registry, key, range)
    }

    /// Process every queued provider event, then run deferred work.
    /// Returns the number of events handled.
    pub fn pump(&mut self) -> Result<usize, EditorError> {
        let handled = self.drain()?;
        self.run_deferred()?;
        Ok(handled)
    }

    /// Wait for the next provider event and process the batch it arrived
    /// with. Returns `false` when there is no provider or it has closed.
    pub async fn next_turn(&mut self) -> Result<bool, EditorError> {
        if self.link.is_none() {
            return Ok(false);
        }

        // work queued at attach time or by a resync must not wait for an event
        if self.has_deferred() {
            tokio::task::yield_now().await;
            self.drain()?;
            self.run_deferred()?;
            return Ok(true);
        }

        let event = loop {
            let Some(link) = self.link.as_mut() else {
                return Ok(false);
            };
            let received = link.events.recv().await;
            match received {
                Ok(event) => break event,
                Err(RecvError::Lagged(skipped)) => self.resync(skipped),
                Err(RecvError::Closed) => return Ok(false),
            }
        };

        self.handle(event)?;
        self.drain()?;

        if self.has_deferred() {
            // one hop so the provider can finish populating the document
            tokio::task::yield_now().await;
            self.drain()?;
            self.run_deferred()?;
        }

        Ok(true)
    }

    /// Tear down, releasing the provider subscription
    pub fn close(mut self) {
        if self.link.take().is_some() {
            info!(session = %self.lock().id(), "Closed collaborative session");
        }
    }

    fn drain(&mut self) -> Result<usize, EditorError> {
        let mut handled = 0;
        loop {
            let Some(link) = self.link.as_mut() else {
                break;
            };
            let event = match link.events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Lagged(skipped)) => {
                    self.resync(skipped);
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            };
            self.handle(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    fn handle(&mut self, event: ProviderEvent) -> Result<(), EditorError> {
        match event {
            ProviderEvent::Status(status) => {
                self.status.record(status);
                if status == ConnectionStatus::Disconnected {
                    self.presence.send_replace(Vec::new());
                } else {
                    self.refresh_presence();
                }
            }
            ProviderEvent::Synced => {
                self.status.record(ConnectionStatus::Synced);
                if let Some(link) = self.link.as_mut() {
                    if link.synced_observer_armed {
                        link.synced_observer_armed = false;
                        link.deferred.push_back(Deferred::SeedIfEmpty);
                    }
                }
            }
            ProviderEvent::RemoteContent(root) => self.apply_remote(root),
            ProviderEvent::AwarenessChanged => self.refresh_presence(),
        }
        Ok(())
    }

    /// Skipped events are gone; rebuild what they would have set from
    /// the provider's current state.
    fn resync(&mut self, skipped: u64) {
        warn!(skipped, "Session fell behind provider events, resyncing");
        let Some(link) = self.link.as_mut() else {
            return;
        };
        if link.synced_observer_armed && link.provider.is_synced() {
            link.synced_observer_armed = false;
            link.deferred.push_back(Deferred::SeedIfEmpty);
            self.status.record(ConnectionStatus::Synced);
        }
        self.refresh_presence();
    }

    fn apply_remote(&self, root: Node) {
        if let Err(err) = self.lock().replace_content(root) {
            warn!(error = %err, "Ignoring malformed remote content");
        }
    }

    fn refresh_presence(&self) {
        let Some(link) = self.link.as_ref() else {
            return;
        };
        let projected = presence::project(link.provider.collaborators().as_deref());
        debug!(collaborators = projected.len(), "Presence updated");
        self.presence.send_replace(projected);
    }

    fn has_deferred(&self) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| !link.deferred.is_empty())
    }

    fn run_deferred(&mut self) -> Result<(), EditorError> {
        let Some(link) = self.link.as_mut() else {
            return Ok(());
        };
        let tasks: Vec<Deferred> = link.deferred.drain(..).collect();

        for task in tasks {
            match task {
                Deferred::SeedIfEmpty => {
                    let outcome = self.lock().seed_if_empty()?;
                    debug!(?outcome, "Deferred seed check");
                }
            }
        }
        Ok(())
    }
}
