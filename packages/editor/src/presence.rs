//! # Presence Projection
//!
//! Turns raw awareness entries into display-ready collaborator badges.
//! Malformed entries never fail: missing names, colors and initials fall
//! back to placeholders.

use crate::provider::RawCollaborator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Initials shown when no usable name exists
pub const PLACEHOLDER_INITIALS: &str = "?";

/// Display name for entries without one
pub const ANONYMOUS: &str = "Anonymous";

/// Cursor colors handed out to collaborators
pub const PALETTE: [&str; 7] = [
    "#958DF1", "#F98181", "#FBBC88", "#FAF594", "#70CFF8", "#94FADB", "#B9F18D",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorPresence {
    pub client_id: u64,
    pub name: String,
    pub color: String,
    pub initials: String,
}

/// The local user as published to the provider's awareness state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub name: String,
    pub color: String,
}

impl LocalUser {
    /// Color is derived from the name so reconnects keep the same color
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let seed = name
            .bytes()
            .fold(0u64, |hash, byte| hash.wrapping_mul(31).wrapping_add(u64::from(byte)));
        Self {
            color: palette_color(seed).to_string(),
            name,
        }
    }
}

pub fn palette_color(seed: u64) -> &'static str {
    PALETTE[(seed % PALETTE.len() as u64) as usize]
}

/// First letter of the first and last whitespace-separated tokens
pub fn initials(name: Option<&str>) -> String {
    let mut tokens = name.unwrap_or_default().split_whitespace();
    let Some(first) = tokens.next() else {
        return PLACEHOLDER_INITIALS.to_string();
    };
    let last = tokens.last().unwrap_or(first);

    first
        .chars()
        .next()
        .into_iter()
        .chain(last.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Project raw provider state; `None` (state unavailable) yields no entries
pub fn project(raw: Option<&[RawCollaborator]>) -> Vec<CollaboratorPresence> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    raw.iter()
        .filter(|peer| seen.insert(peer.client_id))
        .map(|peer| {
            let name = peer
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty());
            let color = peer
                .color
                .as_deref()
                .map(str::trim)
                .filter(|color| !color.is_empty())
                .unwrap_or_else(|| palette_color(peer.client_id));

            CollaboratorPresence {
                client_id: peer.client_id,
                name: name.unwrap_or(ANONYMOUS).to_string(),
                color: color.to_string(),
                initials: initials(name),
            }
        })
        .collect()
}
