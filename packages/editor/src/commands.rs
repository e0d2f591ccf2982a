//! # Slash Commands
//!
//! The command palette as static data. Each [`SlashCommand`] carries a
//! [`CommandAction`] tag instead of a closure; [`CommandAction::mutations`]
//! is the single dispatch point turning a tag into document mutations.
//!
//! Invoking a command removes its trigger text, applies the mutations in
//! the same atomic batch, and leaves the editor focused.

use crate::session::EditorSession;
use crate::EditorError;
use blockpad_document::{Attrs, Mutation, Node, NodeKind};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Range;
use thiserror::Error;
use tracing::info;

/// What a command does to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommandAction {
    Paragraph,
    Heading { level: u8 },
    BulletList,
    OrderedList,
    TaskList,
    Blockquote,
    CodeBlock,
    Table {
        rows: usize,
        cols: usize,
        header_row: bool,
    },
    Image,
    Divider,
}

impl CommandAction {
    /// Mutations that carry out this action at `pos`
    pub fn mutations(&self, pos: usize) -> Vec<Mutation> {
        let mutation = match *self {
            CommandAction::Paragraph => Mutation::SetBlockType {
                pos,
                kind: NodeKind::Paragraph,
                attrs: Attrs::new(),
            },
            CommandAction::Heading { level } => {
                let mut attrs = Attrs::new();
                attrs.insert("level".to_string(), Value::from(level));
                Mutation::SetBlockType {
                    pos,
                    kind: NodeKind::Heading,
                    attrs,
                }
            }
            CommandAction::BulletList => Mutation::ToggleList {
                pos,
                kind: NodeKind::BulletList,
            },
            CommandAction::OrderedList => Mutation::ToggleList {
                pos,
                kind: NodeKind::OrderedList,
            },
            CommandAction::TaskList => Mutation::ToggleList {
                pos,
                kind: NodeKind::TaskList,
            },
            CommandAction::Blockquote => Mutation::Wrap {
                pos,
                kind: NodeKind::Blockquote,
            },
            CommandAction::CodeBlock => Mutation::SetBlockType {
                pos,
                kind: NodeKind::CodeBlock,
                attrs: Attrs::new(),
            },
            CommandAction::Table {
                rows,
                cols,
                header_row,
            } => Mutation::InsertBlock {
                pos,
                node: Node::table(rows, cols, header_row),
            },
            CommandAction::Image => Mutation::InsertBlock {
                pos,
                node: Node::image(None),
            },
            CommandAction::Divider => Mutation::InsertBlock {
                pos,
                node: Node::horizontal_rule(),
            },
        };
        vec![mutation]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    pub name: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    pub action: CommandAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandGroup {
    pub name: &'static str,
    pub title: &'static str,
    pub commands: &'static [SlashCommand],
}

/// Built-in palette, in display order
pub const BUILTIN_GROUPS: &[CommandGroup] = &[
    CommandGroup {
        name: "format",
        title: "Format",
        commands: &[
            SlashCommand {
                name: "text",
                label: "Text",
                icon: "pilcrow",
                description: "Plain paragraph text",
                aliases: &["paragraph", "p"],
                action: CommandAction::Paragraph,
            },
            SlashCommand {
                name: "heading1",
                label: "Heading 1",
                icon: "heading-1",
                description: "Large section heading",
                aliases: &["h1", "title"],
                action: CommandAction::Heading { level: 1 },
            },
            SlashCommand {
                name: "heading2",
                label: "Heading 2",
                icon: "heading-2",
                description: "Medium section heading",
                aliases: &["h2", "subtitle"],
                action: CommandAction::Heading { level: 2 },
            },
            SlashCommand {
                name: "heading3",
                label: "Heading 3",
                icon: "heading-3",
                description: "Small section heading",
                aliases: &["h3"],
                action: CommandAction::Heading { level: 3 },
            },
            SlashCommand {
                name: "bulletList",
                label: "Bullet List",
                icon: "list",
                description: "Unordered list of items",
                aliases: &["ul", "bullets", "unordered"],
                action: CommandAction::BulletList,
            },
            SlashCommand {
                name: "numberedList",
                label: "Numbered List",
                icon: "list-ordered",
                description: "Ordered list of items",
                aliases: &["ol", "ordered", "numbers"],
                action: CommandAction::OrderedList,
            },
            SlashCommand {
                name: "taskList",
                label: "Task List",
                icon: "list-todo",
                description: "Checklist of tasks",
                aliases: &["todo", "checklist", "tasks"],
                action: CommandAction::TaskList,
            },
            SlashCommand {
                name: "blockquote",
                label: "Quote",
                icon: "quote",
                description: "Quoted block of text",
                aliases: &["quote", "cite"],
                action: CommandAction::Blockquote,
            },
            SlashCommand {
                name: "codeBlock",
                label: "Code Block",
                icon: "code",
                description: "Monospaced code snippet",
                aliases: &["code", "pre", "snippet"],
                action: CommandAction::CodeBlock,
            },
        ],
    },
    CommandGroup {
        name: "insert",
        title: "Insert",
        commands: &[
            SlashCommand {
                name: "table",
                label: "Table",
                icon: "table",
                description: "3x3 table with a header row",
                aliases: &["table", "grid"],
                action: CommandAction::Table {
                    rows: 3,
                    cols: 3,
                    header_row: true,
                },
            },
            SlashCommand {
                name: "image",
                label: "Image",
                icon: "image",
                description: "Image placeholder to upload into",
                aliases: &["img", "picture", "photo"],
                action: CommandAction::Image,
            },
            SlashCommand {
                name: "divider",
                label: "Divider",
                icon: "minus",
                description: "Horizontal rule between sections",
                aliases: &["hr", "rule", "separator"],
                action: CommandAction::Divider,
            },
        ],
    },
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Alias '{alias}' is used by both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("Group '{0}' has no commands")]
    EmptyGroup(&'static str),
}

/// Palette row handed to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub aliases: Vec<&'static str>,
    pub group: &'static str,
}

impl PaletteEntry {
    fn new(group: &CommandGroup, command: &SlashCommand) -> Self {
        Self {
            name: command.name,
            label: command.label,
            icon: command.icon,
            description: command.description,
            aliases: command.aliases.to_vec(),
            group: group.name,
        }
    }
}

/// Ordered groups of slash commands
#[derive(Debug, Clone, Copy)]
pub struct CommandRegistry {
    groups: &'static [CommandGroup],
}

impl CommandRegistry {
    pub const fn new(groups: &'static [CommandGroup]) -> Self {
        Self { groups }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_GROUPS)
    }

    pub fn groups(&self) -> &'static [CommandGroup] {
        self.groups
    }

    /// Every command with its group, in display order
    pub fn commands(&self) -> impl Iterator<Item = (&'static CommandGroup, &'static SlashCommand)> {
        let groups = self.groups;
        groups
            .iter()
            .flat_map(|group| group.commands.iter().map(move |command| (group, command)))
    }

    /// Look up a command by name or alias, ignoring case
    pub fn find(&self, key: &str) -> Option<&'static SlashCommand> {
        let key = key.trim().trim_start_matches('/');
        self.commands()
            .map(|(_, command)| command)
            .find(|command| {
                command.name.eq_ignore_ascii_case(key)
                    || command.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(key))
            })
    }

    /// Full palette
    pub fn palette(&self) -> Vec<PaletteEntry> {
        self.commands()
            .map(|(group, command)| PaletteEntry::new(group, command))
            .collect()
    }

    /// Palette rows matching a typed query, in registry order
    pub fn filter(&self, query: &str) -> Vec<PaletteEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.palette();
        }

        self.commands()
            .filter(|(_, command)| {
                command.name.to_lowercase().starts_with(&query)
                    || command.label.to_lowercase().contains(&query)
                    || command
                        .aliases
                        .iter()
                        .any(|alias| alias.to_lowercase().starts_with(&query))
            })
            .map(|(group, command)| PaletteEntry::new(group, command))
            .collect()
    }

    /// Check that every name and alias maps to exactly one command
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut owners: HashMap<String, &'static str> = HashMap::new();

        for group in self.groups {
            if group.commands.is_empty() {
                return Err(RegistryError::EmptyGroup(group.name));
            }

            for command in group.commands {
                let mut keys: Vec<String> = command
                    .aliases
                    .iter()
                    .map(|alias| alias.to_lowercase())
                    .collect();
                keys.push(command.name.to_lowercase());
                keys.sort();
                keys.dedup();

                for key in keys {
                    if let Some(first) = owners.insert(key.clone(), command.name) {
                        return Err(RegistryError::DuplicateAlias {
                            alias: key,
                            first,
                            second: command.name,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Run `command` over the trigger text in `range`
pub fn execute(
    session: &mut EditorSession,
    command: &SlashCommand,
    range: Range<usize>,
) -> Result<u64, EditorError> {
    let mut mutations = vec![Mutation::DeleteRange {
        from: range.start,
        to: range.end,
    }];
    mutations.extend(command.action.mutations(range.start));

    let version = session.apply_all(&mutations)?;
    session.focus_near(range.start);

    info!(
        session = %session.id(),
        command = command.name,
        from = range.start,
        to = range.end,
        version,
        "Executed slash command"
    );
    Ok(version)
}

/// Look up `key` in `registry` and run it
pub fn execute_by_name(
    session: &mut EditorSession,
    registry: &CommandRegistry,
    key: &str,
    range: Range<usize>,
) -> Result<u64, EditorError> {
    let command = registry
        .find(key)
        .ok_or_else(|| EditorError::UnknownCommand(key.to_string()))?;
    execute(session, command, range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_valid() {
        assert_eq!(CommandRegistry::builtin().validate(), Ok(()));
    }

    #[test]
    fn test_aliases_unique_across_registry() {
        let registry = CommandRegistry::builtin();
        let mut seen = std::collections::HashSet::new();

        for (_, command) in registry.commands() {
            for alias in command.aliases {
                assert!(seen.insert(alias.to_lowercase()), "duplicate alias {}", alias);
            }
        }

        assert_eq!(registry.find("h1").map(|c| c.name), Some("heading1"));
    }

    #[test]
    fn test_validate_detects_collision() {
        const CLASHING: &[CommandGroup] = &[
            CommandGroup {
                name: "a",
                title: "A",
                commands: &[SlashCommand {
                    name: "heading1",
                    label: "Heading 1",
                    icon: "heading-1",
                    description: "",
                    aliases: &["h1"],
                    action: CommandAction::Heading { level: 1 },
                }],
            },
            CommandGroup {
                name: "b",
                title: "B",
                commands: &[SlashCommand {
                    name: "big",
                    label: "Big",
                    icon: "heading-1",
                    description: "",
                    aliases: &["H1"],
                    action: CommandAction::Heading { level: 1 },
                }],
            },
        ];

        let result = CommandRegistry::new(CLASHING).validate();
        assert_eq!(
            result,
            Err(RegistryError::DuplicateAlias {
                alias: "h1".to_string(),
                first: "heading1",
                second: "big",
            })
        );
    }

    #[test]
    fn test_validate_detects_empty_group() {
        const EMPTY: &[CommandGroup] = &[CommandGroup {
            name: "nothing",
            title: "Nothing",
            commands: &[],
        }];

        assert_eq!(
            CommandRegistry::new(EMPTY).validate(),
            Err(RegistryError::EmptyGroup("nothing"))
        );
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let registry = CommandRegistry::builtin();

        assert_eq!(registry.find("TABLE").map(|c| c.name), Some("table"));
        assert_eq!(registry.find("/todo").map(|c| c.name), Some("taskList"));
        assert!(registry.find("carousel").is_none());
    }

    #[test]
    fn test_filter_keeps_registry_order() {
        let registry = CommandRegistry::builtin();

        let names: Vec<_> = registry.filter("head").iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["heading1", "heading2", "heading3"]);

        let lists: Vec<_> = registry.filter("list").iter().map(|e| e.name).collect();
        assert_eq!(lists, vec!["bulletList", "numberedList", "taskList"]);

        assert_eq!(registry.filter("").len(), registry.palette().len());
        assert!(registry.filter("zzz").is_empty());
    }

    #[test]
    fn test_palette_entry_shape() {
        let registry = CommandRegistry::builtin();
        let table = registry
            .palette()
            .into_iter()
            .find(|entry| entry.name == "table")
            .unwrap();

        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["group"], "insert");
        assert_eq!(value["aliases"][0], "table");
        assert_eq!(value["icon"], "table");
    }

    #[test]
    fn test_dispatch_heading() {
        let mutations = CommandAction::Heading { level: 2 }.mutations(4);

        match &mutations[..] {
            [Mutation::SetBlockType { pos, kind, attrs }] => {
                assert_eq!(*pos, 4);
                assert_eq!(*kind, NodeKind::Heading);
                assert_eq!(attrs.get("level"), Some(&Value::from(2u8)));
            }
            other => panic!("unexpected mutations: {:?}", other),
        }
    }
}
