//! Application state and the command loop.
//!
//! This module follows The Elm Architecture (TEA):
//! - [`Model`]: the complete application state (tab store, editor buffers,
//!   auto-save timer, save status)
//! - [`Message`]: every command and clock tick
//! - [`update`]: applies a message to the model
//! - [`App::run`]: line-oriented shell over stdin/stdout

mod event_loop;
mod input;
mod model;
mod timers;
mod update;
mod view;

pub use event_loop::{drive_session, run_session, spawn_line_reader};
pub use input::{Command, InputError, parse_command};
pub use model::{EditSource, EditorBuffers, Model, Pane, PaneMode, Timing};
pub use timers::SaveStatus;
pub use update::{Message, update};
pub use view::{status_label, write_active, write_tabs};

use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use crate::preview::{PreviewTheme, render_html};
use crate::storage::FileStore;
use crate::store::{EmptyTabPolicy, TabStore};
use crate::tab::TabId;

/// Entry point that owns the data directory and runs the shell.
pub struct App {
    data_dir: PathBuf,
    timing: Timing,
    policy: EmptyTabPolicy,
}

impl App {
    /// Create an application backed by the given data directory.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            timing: Timing::default(),
            policy: EmptyTabPolicy::default(),
        }
    }

    /// Override auto-save and status timing.
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Choose what happens to empty tabs on save.
    pub const fn with_policy(mut self, policy: EmptyTabPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Open the data directory and load the stored tabs.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_store(&self) -> Result<TabStore<FileStore>> {
        let storage = FileStore::open(self.data_dir.clone())
            .with_context(|| format!("Failed to open data dir {}", self.data_dir.display()))?;
        let store = TabStore::load(storage, self.policy);
        debug!(
            dir = %self.data_dir.display(),
            tabs = store.len(),
            "workspace loaded"
        );
        Ok(store)
    }

    /// Load the workspace into a model, creating a first tab if needed.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_model(&self) -> Result<Model<FileStore>> {
        Ok(Model::new(self.open_store()?, self.timing))
    }

    /// Print the tab list. Reads the workspace only; no record is written.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be opened or `out`
    /// fails.
    pub fn write_tab_list(&self, out: &mut impl Write) -> Result<()> {
        let store = self.open_store()?;
        write_tabs(out, &store).context("Failed to write tab list")
    }

    /// Render a tab's markdown as HTML in the stored theme; `None` picks the
    /// active tab. Reads the workspace only.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be opened or there is
    /// no such open tab.
    pub fn render_tab(&self, id: Option<TabId>) -> Result<String> {
        let store = self.open_store()?;
        let tab = match id {
            Some(id) => store
                .tab(id)
                .with_context(|| format!("No open tab {id}"))?,
            None => store.active_tab().context("No active tab")?,
        };
        Ok(render_html(
            &tab.markdown_content,
            PreviewTheme::from_dark(store.is_dark_theme()),
        ))
    }

    /// Run the interactive shell until `quit` or end of input.
    ///
    /// # Errors
    /// Returns an error if the workspace cannot be opened or the terminal
    /// I/O fails.
    pub fn run(&self) -> Result<()> {
        let model = self.open_model()?;
        let start = Instant::now();
        let clock = move || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut stdout = io::stdout().lock();
        let model = run_session(model, BufReader::new(io::stdin()), &mut stdout, clock)
            .context("Shell I/O failed")?;
        debug!(tabs = model.store().len(), "session ended");
        Ok(())
    }
}
