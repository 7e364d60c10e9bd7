//! Plain-text rendering of the model for the shell and the CLI.

use std::io::{self, Write};

use crate::app::Model;
use crate::app::model::{Pane, PaneMode};
use crate::app::timers::SaveStatus;
use crate::storage::KeyValueStore;
use crate::store::TabStore;

/// One line per tab: position, active marker, id and title.
pub fn write_tabs<S: KeyValueStore>(out: &mut impl Write, store: &TabStore<S>) -> io::Result<()> {
    let active = store.active_id();
    for (index, tab) in store.tabs().iter().enumerate() {
        let marker = if Some(tab.id) == active { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {:>2}  {:<8} {}",
            index + 1,
            tab.id.to_string(),
            tab.title
        )?;
    }
    Ok(())
}

/// The active tab with both panes, each as editor text or rendered HTML.
pub fn write_active<S: KeyValueStore>(out: &mut impl Write, model: &Model<S>) -> io::Result<()> {
    let Some(tab) = model.active_tab() else {
        return writeln!(out, "(no tab)");
    };
    let store = model.store();
    let theme = if store.is_dark_theme() { "dark" } else { "light" };
    writeln!(
        out,
        "{} [{}]  theme={theme} font={}",
        tab.title,
        tab.id,
        store.font_size()
    )?;
    write_pane(out, model, Pane::Left)?;
    write_pane(out, model, Pane::Right)
}

fn write_pane<S: KeyValueStore>(out: &mut impl Write, model: &Model<S>, pane: Pane) -> io::Result<()> {
    let name = match pane {
        Pane::Left => "text",
        Pane::Right => "markdown",
    };
    match model.pane_mode(pane) {
        PaneMode::Edit => {
            let body = match pane {
                Pane::Left => &model.buffers().text,
                Pane::Right => &model.buffers().markdown,
            };
            writeln!(out, "--- {name} ---")?;
            writeln!(out, "{body}")
        }
        PaneMode::Preview => {
            writeln!(out, "--- {name} (preview) ---")?;
            write!(out, "{}", model.preview_html(pane))
        }
    }
}

pub const fn status_label(status: SaveStatus) -> &'static str {
    match status {
        SaveStatus::Saved => "saved",
        SaveStatus::Failed => "save failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::model::{EditSource, Timing};
    use crate::storage::MemoryStore;
    use crate::store::EmptyTabPolicy;

    fn model() -> Model<MemoryStore> {
        let store = TabStore::load(MemoryStore::new(), EmptyTabPolicy::Retain);
        Model::new(store, Timing::default())
    }

    fn render(f: impl Fn(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_tabs_marks_active() {
        let mut model = model();
        model.create_tab();
        let listing = render(|out| write_tabs(out, model.store()));
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("   1  tab_1"));
        assert!(lines[1].starts_with("*  2  tab_2"));
        assert!(lines[1].ends_with("Note 2"));
    }

    #[test]
    fn test_write_tabs_on_unopened_store_prints_nothing() {
        let store = TabStore::load(MemoryStore::new(), EmptyTabPolicy::Retain);
        assert_eq!(render(|out| write_tabs(out, &store)), "");
        assert_eq!(store.storage().writes(), 0);
    }

    #[test]
    fn test_write_active_shows_both_buffers() {
        let mut model = model();
        model.record_edit("TODO\n- milk", EditSource::Text);
        let shown = render(|out| write_active(out, &model));
        assert!(shown.contains("--- text ---\nTODO\n- milk"));
        assert!(shown.contains("--- markdown ---\n## TODO\n- milk"));
    }

    #[test]
    fn test_write_active_renders_preview_pane() {
        let mut model = model();
        model.record_edit("## Plan", EditSource::Markdown);
        model.toggle_pane(Pane::Left);
        let shown = render(|out| write_active(out, &model));
        assert!(shown.contains("--- text (preview) ---"));
        assert!(shown.contains("<h2>Plan</h2>"));
    }
}
