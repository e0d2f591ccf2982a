//! # Edit Session
//!
//! One client's view of a document: the document itself, the selection
//! and focus state, and the content seed guard.
//!
//! The seed guard is a two-state machine. The only transition,
//! `Unseeded → Seeded`, fires when [`EditorSession::seed_if_empty`] runs
//! against an empty document; every later call is a no-op, so the seed
//! lands at most once per session no matter how often sync completes.

use crate::presence::LocalUser;
use crate::trigger::{self, SlashTrigger};
use crate::{ContentSeed, EditorError};
use blockpad_document::{Document, Mutation, Node};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedState {
    Unseeded,
    Seeded,
}

/// Result of a seed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Applied,
    AlreadySeeded,
    NotEmpty,
    NoSeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// Single edit session
#[derive(Debug)]
pub struct EditorSession {
    id: String,
    document: Document,
    seed: Option<ContentSeed>,
    seed_state: SeedState,
    selection: Selection,
    focused: bool,
    local_user: LocalUser,
}

impl EditorSession {
    pub fn new(
        id: impl Into<String>,
        document: Document,
        seed: Option<ContentSeed>,
        local_user: LocalUser,
    ) -> Self {
        Self {
            id: id.into(),
            document,
            seed,
            seed_state: SeedState::Unseeded,
            selection: Selection::default(),
            focused: false,
            local_user,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn seed_state(&self) -> SeedState {
        self.seed_state
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn local_user(&self) -> &LocalUser {
        &self.local_user
    }

    /// Apply the seed if the document is empty and no seed landed yet
    pub fn seed_if_empty(&mut self) -> Result<SeedOutcome, EditorError> {
        if self.seed_state == SeedState::Seeded {
            return Ok(SeedOutcome::AlreadySeeded);
        }
        let Some(seed) = &self.seed else {
            return Ok(SeedOutcome::NoSeed);
        };
        if !self.document.is_empty() {
            return Ok(SeedOutcome::NotEmpty);
        }

        self.document.set_content(seed.root().clone())?;
        self.seed_state = SeedState::Seeded;
        self.clamp_selection();

        info!(session = %self.id, version = self.document.version, "Applied content seed");
        Ok(SeedOutcome::Applied)
    }

    /// Move the cursor to `pos` (clamped to the document) and take focus
    pub fn focus(&mut self, pos: usize) {
        self.selection = Selection::cursor(pos.min(self.document.content_size()));
        self.focused = true;
    }

    /// Focus the first text position of the document
    pub fn focus_start(&mut self) {
        let start = self.document.start_position();
        self.focus(start);
    }

    /// Focus the first text position at or after `pos`
    pub fn focus_near(&mut self, pos: usize) {
        let target = self.document.next_text_position(pos).unwrap_or(pos);
        self.focus(target);
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditorError> {
        let size = self.document.content_size();
        if selection.to() > size {
            return Err(EditorError::SelectionOutOfRange {
                anchor: selection.anchor,
                head: selection.head,
                size,
            });
        }
        self.selection = selection;
        Ok(())
    }

    /// Apply one mutation
    pub fn apply(&mut self, mutation: &Mutation) -> Result<u64, EditorError> {
        self.apply_all(std::slice::from_ref(mutation))
    }

    /// Apply mutations atomically; on error the document is unchanged
    pub fn apply_all(&mut self, mutations: &[Mutation]) -> Result<u64, EditorError> {
        let version = self.document.apply_all(mutations)?;
        self.clamp_selection();
        Ok(version)
    }

    /// Type text at the cursor, replacing any selected text
    pub fn type_text(&mut self, text: &str) -> Result<u64, EditorError> {
        let selection = self.selection;
        let version = self.apply_all(&[
            Mutation::DeleteRange {
                from: selection.from(),
                to: selection.to(),
            },
            Mutation::InsertText {
                pos: selection.from(),
                text: text.to_string(),
            },
        ])?;
        self.selection = Selection::cursor(selection.from() + text.chars().count());
        Ok(version)
    }

    /// Replace the document with remote state delivered by the provider
    pub fn replace_content(&mut self, root: Node) -> Result<u64, EditorError> {
        let version = self.document.set_content(root)?;
        self.clamp_selection();
        debug!(session = %self.id, version, "Replaced content from provider");
        Ok(version)
    }

    /// Slash trigger ending at the cursor, if the user is typing one
    pub fn trigger_at_cursor(&self) -> Option<SlashTrigger> {
        if !self.selection.is_empty() {
            return None;
        }
        trigger::detect(&self.document, self.selection.head)
    }

    fn clamp_selection(&mut self) {
        let size = self.document.content_size();
        self.selection = Selection {
            anchor: self.selection.anchor.min(size),
            head: self.selection.head.min(size),
        };
    }
}
