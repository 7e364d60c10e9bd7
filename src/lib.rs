// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::StoreError)
    clippy::module_name_repetitions
)]

//! # Twinpad
//!
//! A multi-tab note editor core with side-by-side plain text and markdown.
//!
//! Every note keeps both representations. Editing one side regenerates the
//! other through a small, deliberately lossy conversion engine:
//! - Short all-caps lines become `## ` headings; bullets and numbered items
//!   become `- ` items
//! - Markdown headings, emphasis, code spans and links are stripped back to
//!   plain text, with `• ` bullets
//!
//! Tabs and editor preferences persist in a key-value store (JSON records,
//! one per key), with debounced auto-save and a transient save status.
//!
//! ## Architecture
//!
//! Twinpad uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Commands and clock ticks
//! - **Update**: State transitions
//! - **View**: Plain-text rendering for the shell
//!
//! ## Modules
//!
//! - [`app`]: Application context, command loop and timers
//! - [`convert`]: Text and markdown conversion engine
//! - [`tab`]: Tab records and title derivation
//! - [`settings`]: Persisted editor preferences
//! - [`store`]: Tab collection on top of a key-value store
//! - [`storage`]: Key-value store trait with file and memory backends
//! - [`preview`]: Markdown to HTML rendering
//! - [`config`]: rc-file defaults

pub mod app;
pub mod config;
pub mod convert;
pub mod preview;
pub mod settings;
pub mod storage;
pub mod store;
pub mod tab;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, EditSource, Message, Model, update};
    pub use crate::convert::{markdown_to_text, text_to_markdown};
    pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
    pub use crate::store::{EmptyTabPolicy, TabStore};
    pub use crate::tab::{Tab, TabId};
}
