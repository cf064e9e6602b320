//! CR-001: Executable entry types.
//!
//! A recipe field that describes an action may be written as a single
//! command, a list of commands, an inline `!script` block, or a named map
//! of sub-events whose values are any of these again. Every shape is
//! normalized into one [`ExecutableEntry`] tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Entries
// ============================================================================

/// Named sub-entries, e.g. the `lifecycle` section of a recipe.
pub type EntriesMap = IndexMap<String, ExecutableEntry>;

/// A normalized, typed action taken from a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutableEntry {
    /// Inline script block, kept opaque
    Script(ScriptBlock),

    /// Single command line, stored verbatim
    Command(String),

    /// Ordered command lines
    Commands(Vec<String>),

    /// Named sub-entries
    Map(EntriesMap),
}

impl ExecutableEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Script(_) => EntryKind::Script,
            Self::Command(_) => EntryKind::Command,
            Self::Commands(_) => EntryKind::Commands,
            Self::Map(_) => EntryKind::Map,
        }
    }

    pub fn as_script(&self) -> Option<&ScriptBlock> {
        match self {
            Self::Script(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_command(&self) -> Option<&str> {
        match self {
            Self::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_commands(&self) -> Option<&[String]> {
        match self {
            Self::Commands(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&EntriesMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a nested entry by a `/`-separated key path.
    ///
    /// An empty path returns `self`. Any segment that lands on a non-map
    /// entry or a missing key yields `None`.
    pub fn find(&self, path: &str) -> Option<&ExecutableEntry> {
        let mut current = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Count the non-map entries in this tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Map(m) => m.values().map(ExecutableEntry::leaf_count).sum(),
            _ => 1,
        }
    }
}

/// Variant tag of an [`ExecutableEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Script,
    Command,
    Commands,
    Map,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => write!(f, "script"),
            Self::Command => write!(f, "command"),
            Self::Commands => write!(f, "commands"),
            Self::Map => write!(f, "map"),
        }
    }
}

// ============================================================================
// Script blocks
// ============================================================================

/// Source of an inline `!script` block.
///
/// Held as an opaque handle: nothing in this crate evaluates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptBlock {
    source: String,
}

impl ScriptBlock {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

// ============================================================================
// Tests
// ============================================================================
