use tracing::debug;

use crate::app::Model;
use crate::app::model::{EditSource, Pane};
use crate::storage::KeyValueStore;
use crate::tab::TabId;

/// All possible events and actions in the application.
///
/// These represent user commands, editor input and clock ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Tabs
    /// Open a new empty tab and make it active
    CreateTab,
    /// Soft close: remove from the collection, keep the stored record
    CloseTab(TabId),
    /// Hard delete; only acts when the user confirmed
    DeleteTab { id: TabId, confirmed: bool },
    /// Make a tab active
    SwitchTo(TabId),
    /// Give a tab a pinned title
    RenameTab(TabId, String),
    /// Move the tab at position `from` to position `to`
    ReorderTab { from: usize, to: usize },

    // Editing
    /// Content of one editor changed
    RecordEdit { content: String, source: EditSource },
    /// Save every tab and the settings now
    SaveAll,

    // View
    /// Switch between light and dark theme
    ToggleTheme,
    /// Set the editor font size
    SetFontSize(u16),
    /// Flip a pane between editor and preview
    TogglePane(Pane),

    // Maintenance
    /// Drop stored records of closed tabs
    CleanupOrphans,

    // Clock
    /// Current time in milliseconds; drives auto-save and status expiry
    Tick(u64),

    // Application
    /// Save everything and quit
    WindowClose,
}

/// Apply a message to the model.
///
/// All state transitions happen here. Persistence goes through the store
/// owned by the model; failures surface as the transient save status.
pub fn update<S: KeyValueStore>(mut model: Model<S>, msg: Message) -> Model<S> {
    match msg {
        Message::CreateTab => {
            model.create_tab();
        }
        Message::CloseTab(id) => {
            if !model.close_tab(id) {
                debug!(%id, "close ignored for unknown tab");
            }
        }
        Message::DeleteTab { id, confirmed } => {
            model.delete_tab(id, |_| confirmed);
        }
        Message::SwitchTo(id) => {
            if !model.switch_to(id) {
                debug!(%id, "switch ignored for unknown tab");
            }
        }
        Message::RenameTab(id, title) => {
            model.rename_tab(id, &title);
        }
        Message::ReorderTab { from, to } => {
            model.reorder_tab(from, to);
        }

        Message::RecordEdit { content, source } => model.record_edit(&content, source),
        Message::SaveAll => {
            model.save_all();
        }

        Message::ToggleTheme => {
            model.toggle_theme();
        }
        Message::SetFontSize(size) => {
            model.set_font_size(size);
        }
        Message::TogglePane(pane) => {
            model.toggle_pane(pane);
        }

        Message::CleanupOrphans => {
            let removed = model.cleanup_orphans();
            debug!(removed, "cleaned up orphaned tab records");
        }

        Message::Tick(now_ms) => model.tick(now_ms),

        Message::WindowClose => model.window_close(),
    }
    model
}
