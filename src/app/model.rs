use tracing::debug;

use crate::config::{DEFAULT_AUTOSAVE_MS, DEFAULT_STATUS_MS};
use crate::convert::{markdown_to_text, text_to_markdown};
use crate::preview::{PreviewTheme, render_html};
use crate::storage::KeyValueStore;
use crate::store::TabStore;
use crate::tab::{Tab, TabId};

use super::timers::{Debouncer, SaveStatus, StatusIndicator};

/// Which editor an edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSource {
    Text,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// Plain text side.
    Left,
    /// Markdown side.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneMode {
    #[default]
    Edit,
    Preview,
}

impl PaneMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Edit => Self::Preview,
            Self::Preview => Self::Edit,
        }
    }
}

/// Live content of the two editors for the active tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorBuffers {
    pub text: String,
    pub markdown: String,
}

/// Timer settings for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub autosave_ms: u64,
    pub status_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            status_ms: DEFAULT_STATUS_MS,
        }
    }
}

/// The complete application state.
///
/// The store owns every tab record; the model only holds the active tab's
/// content in [`EditorBuffers`]. Buffers are the source of truth for the
/// active tab until they are flushed (on switch, save, auto-save, close).
pub struct Model<S> {
    store: TabStore<S>,
    buffers: EditorBuffers,
    autosave: Debouncer,
    status: StatusIndicator,
    now_ms: u64,
    /// Left pane shows the text editor or a preview of the markdown buffer
    pub left_pane: PaneMode,
    /// Right pane shows the markdown editor or a preview converted from text
    pub right_pane: PaneMode,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl<S> std::fmt::Debug for Model<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("buffers", &self.buffers)
            .field("now_ms", &self.now_ms)
            .field("left_pane", &self.left_pane)
            .field("right_pane", &self.right_pane)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> Model<S> {
    /// Build the model around a loaded store.
    ///
    /// An empty store gets a fresh tab so there is always something to edit.
    pub fn new(store: TabStore<S>, timing: Timing) -> Self {
        let mut model = Self {
            store,
            buffers: EditorBuffers::default(),
            autosave: Debouncer::new(timing.autosave_ms),
            status: StatusIndicator::new(timing.status_ms),
            now_ms: 0,
            left_pane: PaneMode::Edit,
            right_pane: PaneMode::Edit,
            should_quit: false,
        };
        if let Some(id) = model.store.ensure_tab() {
            model.persist_tab(id);
            model.persist_settings();
        }
        model.load_buffers();
        model
    }

    pub const fn store(&self) -> &TabStore<S> {
        &self.store
    }

    pub const fn buffers(&self) -> &EditorBuffers {
        &self.buffers
    }

    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// The transient save indicator, if one is showing.
    pub fn status(&self) -> Option<SaveStatus> {
        self.status.current()
    }

    pub const fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn autosave_deadline(&self) -> Option<u64> {
        self.autosave.deadline()
    }

    /// Earliest time a `tick` would change anything: the auto-save or the
    /// status revert.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.autosave.deadline(), self.status.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.store.active_tab()
    }

    /// Copy the buffers into the active tab's record.
    fn flush_buffers(&mut self) {
        if let Some(id) = self.store.active_id() {
            self.store
                .write_content(id, &self.buffers.text, &self.buffers.markdown);
        }
    }

    /// Replace the buffers with the active tab's stored content.
    fn load_buffers(&mut self) {
        self.buffers = self
            .store
            .active_tab()
            .map(|tab| EditorBuffers {
                text: tab.text_content.clone(),
                markdown: tab.markdown_content.clone(),
            })
            .unwrap_or_default();
    }

    fn persist_tab(&mut self, id: TabId) -> bool {
        if self.store.save_tab(id).is_ok() {
            true
        } else {
            self.status.show(SaveStatus::Failed, self.now_ms);
            false
        }
    }

    fn persist_settings(&mut self) -> bool {
        if self.store.save_settings().is_ok() {
            true
        } else {
            self.status.show(SaveStatus::Failed, self.now_ms);
            false
        }
    }

    /// Write the active tab now if an auto-save is queued for it.
    ///
    /// Called before the active tab changes; the debouncer only ever tracks
    /// the tab being edited.
    fn finish_pending_autosave(&mut self) {
        if !self.autosave.is_pending() {
            return;
        }
        self.autosave.cancel();
        if let Some(id) = self.store.active_id() {
            self.persist_tab(id);
        }
    }

    /// Open a new empty tab and make it active.
    pub fn create_tab(&mut self) -> TabId {
        self.flush_buffers();
        self.finish_pending_autosave();
        let id = self.store.create_tab();
        self.load_buffers();
        self.persist_tab(id);
        self.persist_settings();
        id
    }

    /// Soft close: drop the tab from the collection, keep its stored record.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let Some(removed) = self.store.close(id) else {
            return false;
        };
        self.after_removal(removed.was_active, removed.created);
        true
    }

    /// Hard delete: drop the tab and its stored record.
    ///
    /// `confirm` sees the tab before anything happens; returning false makes
    /// this a no-op.
    pub fn delete_tab(&mut self, id: TabId, confirm: impl FnOnce(&Tab) -> bool) -> bool {
        let Some(tab) = self.store.tab(id) else {
            return false;
        };
        if !confirm(tab) {
            debug!(%id, "delete declined");
            return false;
        }
        let Some(removed) = self.store.close(id) else {
            return false;
        };
        if self.store.remove_record(id).is_err() {
            self.status.show(SaveStatus::Failed, self.now_ms);
        }
        self.after_removal(removed.was_active, removed.created);
        true
    }

    fn after_removal(&mut self, was_active: bool, created: Option<TabId>) {
        if was_active || created.is_some() {
            // Unsaved edits belonged to the removed tab.
            self.autosave.cancel();
            self.load_buffers();
        }
        if let Some(id) = created {
            self.persist_tab(id);
        }
        self.persist_settings();
    }

    /// Make `id` the active tab, flushing the outgoing buffers first.
    pub fn switch_to(&mut self, id: TabId) -> bool {
        if self.store.tab(id).is_none() {
            return false;
        }
        let outgoing = self.store.active_id();
        if outgoing == Some(id) {
            return true;
        }
        self.flush_buffers();
        self.finish_pending_autosave();
        self.store.activate(id);
        self.load_buffers();
        self.persist_settings();
        true
    }

    pub fn rename_tab(&mut self, id: TabId, title: &str) -> bool {
        if !self.store.rename(id, title) {
            return false;
        }
        self.persist_tab(id);
        true
    }

    /// Apply an edit from one editor and regenerate the other.
    ///
    /// Re-derives the active tab's title and restarts the auto-save timer.
    pub fn record_edit(&mut self, content: &str, source: EditSource) {
        match source {
            EditSource::Text => {
                self.buffers.markdown = text_to_markdown(content);
                content.clone_into(&mut self.buffers.text);
            }
            EditSource::Markdown => {
                self.buffers.text = markdown_to_text(content);
                content.clone_into(&mut self.buffers.markdown);
            }
        }
        if let Some(id) = self.store.active_id() {
            self.store.derive_title(id, &self.buffers.text);
        }
        self.autosave.queue(self.now_ms);
    }

    /// Flush the buffers and persist every tab plus the settings.
    pub fn save_all(&mut self) -> bool {
        self.flush_buffers();
        self.autosave.cancel();
        let ok = self.store.save_all().is_ok();
        let status = if ok {
            SaveStatus::Saved
        } else {
            SaveStatus::Failed
        };
        self.status.show(status, self.now_ms);
        ok
    }

    fn autosave_active(&mut self) {
        self.flush_buffers();
        let Some(id) = self.store.active_id() else {
            return;
        };
        let status = if self.store.save_tab(id).is_ok() {
            SaveStatus::Saved
        } else {
            SaveStatus::Failed
        };
        debug!(%id, ?status, "auto-save");
        self.status.show(status, self.now_ms);
    }

    pub fn toggle_theme(&mut self) -> bool {
        let dark = self.store.toggle_theme();
        self.persist_settings();
        dark
    }

    pub fn set_font_size(&mut self, size: u16) -> u16 {
        let size = self.store.set_font_size(size);
        self.persist_settings();
        size
    }

    /// Move the tab at position `from` to `to` and persist the new order.
    pub fn reorder_tab(&mut self, from: usize, to: usize) -> bool {
        if from >= self.store.len() {
            return false;
        }
        self.store.reorder(from, to);
        self.persist_settings();
        true
    }

    pub const fn toggle_pane(&mut self, pane: Pane) -> PaneMode {
        let mode = match pane {
            Pane::Left => &mut self.left_pane,
            Pane::Right => &mut self.right_pane,
        };
        *mode = mode.toggled();
        *mode
    }

    pub const fn pane_mode(&self, pane: Pane) -> PaneMode {
        match pane {
            Pane::Left => self.left_pane,
            Pane::Right => self.right_pane,
        }
    }

    /// HTML preview for a pane.
    ///
    /// The left pane renders the markdown buffer; the right pane renders the
    /// text buffer after converting it to markdown.
    pub fn preview_html(&self, pane: Pane) -> String {
        let theme = PreviewTheme::from_dark(self.store.is_dark_theme());
        match pane {
            Pane::Left => render_html(&self.buffers.markdown, theme),
            Pane::Right => render_html(&text_to_markdown(&self.buffers.text), theme),
        }
    }

    /// Remove stored records of tabs no longer in the collection.
    pub fn cleanup_orphans(&mut self) -> usize {
        self.store.cleanup_orphans().unwrap_or_else(|_| {
            self.status.show(SaveStatus::Failed, self.now_ms);
            0
        })
    }

    /// Advance the clock; fires the auto-save and reverts the status when due.
    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
        if self.autosave.take_ready(self.now_ms) {
            self.autosave_active();
        }
        self.status.expire(self.now_ms);
    }

    /// Save everything and ask the loop to stop.
    pub fn window_close(&mut self) {
        self.save_all();
        self.should_quit = true;
    }
}
