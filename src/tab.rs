//! A single note and its persisted record shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Derived titles longer than this many characters are cut and get [`ELLIPSIS`].
pub const TITLE_MAX_CHARS: usize = 20;
pub const ELLIPSIS: &str = "...";

const ID_PREFIX: &str = "tab_";

/// Largest tab number accepted from storage. Higher ids are treated as
/// corrupt so the allocation counter always has room to grow.
pub const MAX_TAB_NUMBER: u64 = (1 << 53) - 1;

/// Stable tab identifier, rendered as `tab_N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TabId(u64);

impl TabId {
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// The counter value this id was allocated from.
    pub const fn number(self) -> u64 {
        self.0
    }

    /// Whether the number is small enough to come from the allocation counter.
    pub const fn is_allocatable(self) -> bool {
        self.0 <= MAX_TAB_NUMBER
    }

    /// Key of this tab's record in the key-value store.
    pub fn storage_key(self) -> String {
        format!("tab:{self}")
    }

    /// Parse a storage key produced by [`TabId::storage_key`].
    pub fn from_storage_key(key: &str) -> Option<Self> {
        key.strip_prefix("tab:")?.parse().ok()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ID_PREFIX}{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tab id {0:?}, expected tab_<number>")]
pub struct ParseTabIdError(String);

impl FromStr for TabId {
    type Err = ParseTabIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(ID_PREFIX)
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| ParseTabIdError(s.to_string()))
    }
}

impl TryFrom<String> for TabId {
    type Error = ParseTabIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TabId> for String {
    fn from(id: TabId) -> Self {
        id.to_string()
    }
}

/// One note: paired text and markdown content plus metadata.
///
/// Serializes to the `tab:{id}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub markdown_content: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Set once the user renames the tab; content edits then leave the title alone.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub custom_title: bool,
}

impl Tab {
    /// A fresh, empty tab with the default title for `id`.
    pub fn new(id: TabId, created: DateTime<Utc>) -> Self {
        Self {
            id,
            title: default_title(id),
            text_content: String::new(),
            markdown_content: String::new(),
            created,
            modified: None,
            custom_title: false,
        }
    }

    /// Whether both representations are blank.
    pub fn is_blank(&self) -> bool {
        self.text_content.trim().is_empty() && self.markdown_content.trim().is_empty()
    }

    /// Recompute the title from `content` unless the user pinned one.
    ///
    /// Returns true if the title changed.
    pub fn derive_title(&mut self, content: &str) -> bool {
        if self.custom_title {
            return false;
        }
        let title = title_from_content(content).unwrap_or_else(|| default_title(self.id));
        if title == self.title {
            return false;
        }
        self.title = title;
        true
    }

    /// Pin a user-chosen title. Blank titles are rejected.
    pub fn rename(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        self.title = title.to_string();
        self.custom_title = true;
        true
    }
}

pub fn default_title(id: TabId) -> String {
    format!("Note {}", id.number())
}

/// First non-empty line of `content`, cut to [`TITLE_MAX_CHARS`].
pub fn title_from_content(content: &str) -> Option<String> {
    let line = content.lines().map(str::trim).find(|line| !line.is_empty())?;
    if line.chars().count() > TITLE_MAX_CHARS {
        let head: String = line.chars().take(TITLE_MAX_CHARS).collect();
        Some(format!("{head}{ELLIPSIS}"))
    } else {
        Some(line.to_string())
    }
}
