//! File-backed persistence
//!
//! Each storage key is one JSON document, `<data dir>/<key>.json`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use elancart::storage::{Storage, StorageError};

/// [`Storage`] backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path(key);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use elancart::storage::{StorageExt, keys};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn values_persist_across_instances() -> TestResult {
        let dir = tempfile::tempdir()?;
        let root = dir.path().join("state");

        FileStorage::new(&root).write_json(keys::LOCALE, &["en", "INR"])?;

        let restored: Option<Vec<String>> = FileStorage::new(&root).read_json(keys::LOCALE)?;

        assert_eq!(restored, Some(vec!["en".to_string(), "INR".to_string()]));
        assert!(root.join("ecommerce-locale.json").exists());

        Ok(())
    }

    #[test]
    fn absent_key_reads_as_none_and_removes_cleanly() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.get(keys::CART)?, None);

        storage.remove(keys::CART)?;
        storage.set(keys::CART, "{}")?;
        storage.remove(keys::CART)?;

        assert_eq!(storage.get(keys::CART)?, None);

        Ok(())
    }

    #[test]
    fn malformed_file_fails_open() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());
        fs::write(dir.path().join("ecommerce-cart.json"), "{not json")?;

        let restored: Vec<String> = storage.restore_or_default(keys::CART);

        assert!(restored.is_empty());

        Ok(())
    }
}
