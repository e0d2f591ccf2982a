//! # Blockpad Editor
//!
//! Editor session layer: session wiring, connection status, presence and
//! the slash-command palette.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: block tree + mutations            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: session lifecycle                   │
//! │  - Seed blank documents exactly once        │
//! │  - Track provider connection status         │
//! │  - Project collaborator presence            │
//! │  - Dispatch slash commands to mutations     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ provider: realtime transport (external)     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Explicit sessions**: every operation takes the session it acts on
//! 2. **Commands are data**: palette entries carry a tag, not a closure
//! 3. **Provider failure is not fatal**: the session stays editable offline
//! 4. **Seed at most once**: guarded by a two-state machine
//!
//! ## Usage
//!
//! ### Standalone
//!
//! ```rust,ignore
//! use blockpad_editor::{CommandRegistry, LiveSession, SessionOptions};
//!
//! let live = LiveSession::start(SessionOptions::new().with_user_name("Ada"))?;
//! // blank document was seeded and focused
//! live.execute(&CommandRegistry::builtin(), "table", 10..16)?;
//! ```
//!
//! ### Collaborative
//!
//! ```rust,ignore
//! use blockpad_editor::{LiveSession, LocalProvider, SessionOptions};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(LocalProvider::new());
//! let mut live = LiveSession::start(SessionOptions::new().with_provider(provider.clone()))?;
//!
//! while live.next_turn().await? {
//!     println!("{}", live.status());
//! }
//! ```

mod commands;
mod errors;
mod live;
mod presence;
mod provider;
mod seed;
mod session;
mod status;
mod trigger;

pub use commands::{
    execute, execute_by_name, CommandAction, CommandGroup, CommandRegistry, PaletteEntry,
    RegistryError, SlashCommand, BUILTIN_GROUPS,
};
pub use errors::EditorError;
pub use live::{LiveSession, SeedChoice, SessionOptions, SharedSession};
pub use presence::{
    initials, palette_color, project, CollaboratorPresence, LocalUser, ANONYMOUS, PALETTE,
    PLACEHOLDER_INITIALS,
};
pub use provider::{CollaborationProvider, LocalProvider, ProviderEvent, RawCollaborator};
pub use seed::{ContentSeed, DEFAULT_SEED};
pub use session::{EditorSession, SeedOutcome, SeedState, Selection};
pub use status::{ConnectionStatus, StatusTracker};
pub use trigger::{detect as detect_trigger, SlashTrigger};

// Re-export document types for convenience
pub use blockpad_document::{Document, Mutation, Node, NodeKind};
