use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError, validate_key};

const EXTENSION: &str = "json";

/// Directory-backed store: one `<key>.json` file per key.
///
/// `:` is not portable in filenames, so it is stored as `.`; keys can never
/// contain `.` themselves, which keeps the mapping reversible.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self
            .dir
            .join(format!("{}.{EXTENSION}", key.replace(':', "."))))
    }
}

fn key_for(path: &Path) -> Option<String> {
    if path.extension()? != EXTENSION {
        return None;
    }
    let key = path.file_stem()?.to_str()?.replace('.', ":");
    validate_key(&key).ok().map(|()| key)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write beside the target and rename so readers never see a torn record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
            .filter_map(|entry| key_for(&entry.path()))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_through_files() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();
        store.set("tab:tab_1", r#"{"id":"tab_1"}"#).unwrap();
        store.set("settings", "{}").unwrap();

        assert!(dir.path().join("data").join("tab.tab_1.json").exists());
        assert_eq!(
            store.get("tab:tab_1").unwrap().as_deref(),
            Some(r#"{"id":"tab_1"}"#)
        );
        assert_eq!(store.keys().unwrap(), vec!["settings", "tab:tab_1"]);
    }

    #[test]
    fn test_missing_key_reads_as_none_and_removes_cleanly() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("tab:tab_9").unwrap(), None);
        store.remove("tab:tab_9").unwrap();
    }

    #[test]
    fn test_keys_ignore_foreign_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("tab.tab_2.json.tmp"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_key_never_touches_disk() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
