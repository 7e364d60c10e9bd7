//! Tab collection, preferences and their persistence.
//!
//! In-memory operations (create, close, activate, reorder, ...) never fail.
//! Persistence is a separate step (`save_*`, `remove_record`) so a failed
//! write leaves the in-memory state intact and the caller decides how to
//! surface it.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::settings::{SETTINGS_KEY, Settings, clamp_font_size};
use crate::storage::{KeyValueStore, StorageError};
use crate::tab::{Tab, TabId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no tab with id {0}")]
    UnknownTab(TabId),
    #[error("{failed} of {total} tabs failed to save")]
    PartialSave { failed: usize, total: usize },
}

/// What happens to a tab record whose text and markdown are both blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyTabPolicy {
    /// Remove the record instead of writing it; blank tabs do not survive a reload.
    #[default]
    Purge,
    /// Always write the record.
    Retain,
}

/// Result of persisting one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    Purged,
}

/// A tab taken out of the collection by [`TabStore::close`].
#[derive(Debug, Clone)]
pub struct Removed {
    pub tab: Tab,
    pub index: usize,
    pub was_active: bool,
    /// Tab created because the collection would otherwise be empty.
    pub created: Option<TabId>,
}

/// Owns the ordered tab collection and the persisted preferences.
#[derive(Debug)]
pub struct TabStore<S> {
    storage: S,
    tabs: Vec<Tab>,
    counter: u64,
    active: Option<TabId>,
    is_dark_theme: bool,
    font_size: u16,
    policy: EmptyTabPolicy,
}

impl<S: KeyValueStore> TabStore<S> {
    /// Load settings and tabs from `storage`.
    ///
    /// Missing or corrupt records are skipped with a warning; loading never
    /// fails. The result may hold no tabs, see [`TabStore::ensure_tab`].
    pub fn load(storage: S, policy: EmptyTabPolicy) -> Self {
        let settings = read_settings(&storage);
        let tab_order: Vec<TabId> = settings
            .tab_order
            .iter()
            .copied()
            .filter(|id| {
                let ok = id.is_allocatable();
                if !ok {
                    warn!(%id, "tab id out of range in tab order, skipping");
                }
                ok
            })
            .collect();
        let mut tabs: Vec<Tab> = Vec::with_capacity(tab_order.len());
        for &id in &tab_order {
            if tabs.iter().any(|tab| tab.id == id) {
                warn!(%id, "duplicate id in tab order, skipping");
                continue;
            }
            if let Some(tab) = read_tab(&storage, id) {
                tabs.push(tab);
            }
        }

        let stored_max = match storage.keys() {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| TabId::from_storage_key(key))
                .filter(|id| {
                    let ok = id.is_allocatable();
                    if !ok {
                        warn!(%id, "stored tab id out of range, ignoring");
                    }
                    ok
                })
                .map(TabId::number)
                .max()
                .unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "could not list stored records");
                0
            }
        };
        let counter = tabs
            .iter()
            .map(|tab| tab.id.number())
            .chain(tab_order.iter().map(|id| id.number()))
            .max()
            .unwrap_or(0)
            .max(stored_max);

        let active = settings
            .active_tab_id
            .filter(|id| tabs.iter().any(|tab| tab.id == *id))
            .or_else(|| tabs.first().map(|tab| tab.id));

        debug!(tabs = tabs.len(), counter, "loaded tab store");
        Self {
            storage,
            tabs,
            counter,
            active,
            is_dark_theme: settings.is_dark_theme,
            font_size: clamp_font_size(settings.font_size),
            policy,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    pub const fn active_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.tab(id))
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Highest id handed out so far.
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    pub const fn is_dark_theme(&self) -> bool {
        self.is_dark_theme
    }

    pub const fn font_size(&self) -> u16 {
        self.font_size
    }

    pub const fn policy(&self) -> EmptyTabPolicy {
        self.policy
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Snapshot of the `settings` record as it would be persisted now.
    pub fn settings(&self) -> Settings {
        Settings {
            is_dark_theme: self.is_dark_theme,
            font_size: self.font_size,
            active_tab_id: self.active,
            tab_order: self.tabs.iter().map(|tab| tab.id).collect(),
        }
    }

    /// Append a new empty tab and make it active.
    pub fn create_tab(&mut self) -> TabId {
        // `load` never seeds the counter above `MAX_TAB_NUMBER`.
        self.counter += 1;
        let id = TabId::new(self.counter);
        self.tabs.push(Tab::new(id, Utc::now()));
        self.active = Some(id);
        debug!(%id, "created tab");
        id
    }

    /// Create a tab if the collection is empty. Returns the new id.
    pub fn ensure_tab(&mut self) -> Option<TabId> {
        if self.tabs.is_empty() {
            Some(self.create_tab())
        } else {
            None
        }
    }

    /// Make `id` the active tab. Unknown ids are ignored.
    pub fn activate(&mut self, id: TabId) -> bool {
        if self.tab(id).is_none() {
            warn!(%id, "cannot activate unknown tab");
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Take `id` out of the collection without touching its stored record.
    ///
    /// If it was active, the tab that slid into its slot becomes active (or
    /// the last tab when it was last). An emptied collection gets a fresh tab.
    pub fn close(&mut self, id: TabId) -> Option<Removed> {
        let index = self.index_of(id)?;
        let tab = self.tabs.remove(index);
        let was_active = self.active == Some(id);
        let mut created = None;
        if self.tabs.is_empty() {
            created = Some(self.create_tab());
        } else if was_active {
            let next = index.min(self.tabs.len() - 1);
            self.active = Some(self.tabs[next].id);
        }
        debug!(%id, index, was_active, "closed tab");
        Some(Removed {
            tab,
            index,
            was_active,
            created,
        })
    }

    /// Copy live editor content into the tab record (in memory only).
    pub fn write_content(&mut self, id: TabId, text: &str, markdown: &str) -> bool {
        let Some(tab) = self.tab_mut(id) else {
            return false;
        };
        text.clone_into(&mut tab.text_content);
        markdown.clone_into(&mut tab.markdown_content);
        true
    }

    /// Give the tab a user-chosen title.
    pub fn rename(&mut self, id: TabId, title: &str) -> bool {
        self.tab_mut(id).is_some_and(|tab| tab.rename(title))
    }

    /// Re-derive an unpinned title from content.
    pub fn derive_title(&mut self, id: TabId, content: &str) -> bool {
        self.tab_mut(id).is_some_and(|tab| tab.derive_title(content))
    }

    /// Move the tab at `from` to `to`. `to` past the end means last.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tabs.len() {
            return false;
        }
        let tab = self.tabs.remove(from);
        let to = to.min(self.tabs.len());
        self.tabs.insert(to, tab);
        debug!(from, to, "reordered tabs");
        from != to
    }

    /// Flip the dark theme flag and return the new value.
    pub const fn toggle_theme(&mut self) -> bool {
        self.is_dark_theme = !self.is_dark_theme;
        self.is_dark_theme
    }

    /// Set the editor font size, clamped to the supported range.
    pub const fn set_font_size(&mut self, size: u16) -> u16 {
        self.font_size = clamp_font_size(size);
        self.font_size
    }

    /// Persist one tab, stamping `modified`.
    ///
    /// Under [`EmptyTabPolicy::Purge`] a blank tab has its record removed
    /// instead.
    ///
    /// # Errors
    /// Returns an error if the tab is unknown or the store rejects the write.
    pub fn save_tab(&mut self, id: TabId) -> Result<SaveOutcome, StoreError> {
        let policy = self.policy;
        let tab = self.tab(id).ok_or(StoreError::UnknownTab(id))?;
        let key = id.storage_key();

        if policy == EmptyTabPolicy::Purge && tab.is_blank() {
            self.storage.remove(&key).inspect_err(|err| {
                warn!(%id, error = %err, "failed to purge empty tab");
            })?;
            debug!(%id, "purged empty tab record");
            return Ok(SaveOutcome::Purged);
        }

        let now = Utc::now();
        let mut record = tab.clone();
        record.modified = Some(now);
        let json = serde_json::to_string(&record).map_err(|source| StorageError::Encode {
            key: key.clone(),
            source,
        })?;
        self.storage.set(&key, &json).inspect_err(|err| {
            warn!(%id, error = %err, "failed to save tab");
        })?;
        if let Some(tab) = self.tab_mut(id) {
            tab.modified = Some(now);
        }
        debug!(%id, "saved tab");
        Ok(SaveOutcome::Written)
    }

    /// Persist the `settings` record.
    ///
    /// # Errors
    /// Returns an error if the store rejects the write.
    pub fn save_settings(&mut self) -> Result<(), StoreError> {
        let settings = self.settings();
        let json = serde_json::to_string(&settings).map_err(|source| StorageError::Encode {
            key: SETTINGS_KEY.to_string(),
            source,
        })?;
        self.storage.set(SETTINGS_KEY, &json).inspect_err(|err| {
            warn!(error = %err, "failed to save settings");
        })?;
        Ok(())
    }

    /// Persist every tab in the collection, then the settings.
    ///
    /// A failing tab does not stop the others from being written.
    ///
    /// # Errors
    /// Returns [`StoreError::PartialSave`] if any tab failed, or the settings
    /// write error.
    pub fn save_all(&mut self) -> Result<(), StoreError> {
        let ids: Vec<TabId> = self.tabs.iter().map(|tab| tab.id).collect();
        let total = ids.len();
        let failed = ids
            .into_iter()
            .filter(|&id| self.save_tab(id).is_err())
            .count();
        let settings = self.save_settings();
        if failed > 0 {
            return Err(StoreError::PartialSave { failed, total });
        }
        settings
    }

    /// Delete the stored record for `id`.
    ///
    /// # Errors
    /// Returns an error if the store cannot remove the record.
    pub fn remove_record(&mut self, id: TabId) -> Result<(), StoreError> {
        self.storage.remove(&id.storage_key()).inspect_err(|err| {
            warn!(%id, error = %err, "failed to delete tab record");
        })?;
        debug!(%id, "deleted tab record");
        Ok(())
    }

    /// Ids with a stored record but no place in the collection, such as
    /// soft-closed tabs.
    ///
    /// # Errors
    /// Returns an error if the store cannot be listed.
    pub fn orphaned_ids(&self) -> Result<Vec<TabId>, StoreError> {
        let mut ids: Vec<TabId> = self
            .storage
            .keys()?
            .iter()
            .filter_map(|key| TabId::from_storage_key(key))
            .filter(|id| self.tab(*id).is_none())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Remove every orphaned record. Returns how many were removed.
    ///
    /// # Errors
    /// Returns an error if the store cannot be listed or a removal fails.
    pub fn cleanup_orphans(&mut self) -> Result<usize, StoreError> {
        let orphans = self.orphaned_ids()?;
        for &id in &orphans {
            self.remove_record(id)?;
        }
        debug!(removed = orphans.len(), "cleaned up orphaned records");
        Ok(orphans.len())
    }
}

fn read_settings<S: KeyValueStore>(storage: &S) -> Settings {
    match storage.get(SETTINGS_KEY) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
            warn!(error = %err, "corrupt settings record, using defaults");
            Settings::default()
        }),
        Ok(None) => Settings::default(),
        Err(err) => {
            warn!(error = %err, "could not read settings, using defaults");
            Settings::default()
        }
    }
}

fn read_tab<S: KeyValueStore>(storage: &S, id: TabId) -> Option<Tab> {
    let json = match storage.get(&id.storage_key()) {
        Ok(Some(json)) => json,
        Ok(None) => {
            debug!(%id, "tab in order has no record, skipping");
            return None;
        }
        Err(err) => {
            warn!(%id, error = %err, "could not read tab, skipping");
            return None;
        }
    };
    match serde_json::from_str::<Tab>(&json) {
        Ok(tab) if tab.id == id => Some(tab),
        Ok(tab) => {
            warn!(%id, found = %tab.id, "tab record id mismatch, skipping");
            None
        }
        Err(err) => {
            warn!(%id, error = %err, "corrupt tab record, skipping");
            None
        }
    }
}
