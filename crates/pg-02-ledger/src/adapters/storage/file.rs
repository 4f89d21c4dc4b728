use crate::domain::errors::BackendError;
use crate::domain::keys::is_valid_record_key;
use crate::ports::outbound::RecordBackend;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Directory-backed record store: one `<key>.json` file per record.
///
/// Writes go to `<key>.json.tmp`, are synced to disk and then renamed over
/// the live file, so a crash mid-write leaves either the old record or the
/// new one. Leftover temp files are invisible to `keys()`.
#[derive(Debug)]
pub struct FileRecordBackend {
    dir: PathBuf,
}

impl FileRecordBackend {
    const EXTENSION: &'static str = ".json";
    const TEMP_SUFFIX: &'static str = ".json.tmp";

    /// Open (creating if needed) the ledger directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, BackendError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| BackendError::io(dir.display().to_string(), e))?;

        tracing::info!("[pg-02] ledger directory ready at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, BackendError> {
        if !is_valid_record_key(key) {
            return Err(BackendError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}{}", key, Self::EXTENSION)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}", key, Self::TEMP_SUFFIX))
    }

    fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

impl RecordBackend for FileRecordBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let path = self.record_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::io(key, e)),
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), BackendError> {
        let path = self.record_path(key)?;
        let temp_path = self.temp_path(key);

        // Write atomically via temp file
        if let Err(e) = Self::write_synced(&temp_path, bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(BackendError::io(key, e));
        }

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            BackendError::io(key, e)
        })
    }

    fn remove(&mut self, key: &str) -> Result<bool, BackendError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BackendError::io(key, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| BackendError::io(self.dir.display().to_string(), e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("[pg-02] skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.ends_with(Self::TEMP_SUFFIX) {
                continue;
            }
            if let Some(key) = name.strip_suffix(Self::EXTENSION) {
                if is_valid_record_key(key) {
                    keys.push(key.to_string());
                }
            }
        }

        Ok(keys)
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.record_path(key)?.is_file())
    }
}
