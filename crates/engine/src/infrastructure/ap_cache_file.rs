//! JSON file store for cached AP ledgers.
//!
//! The file is one flat object keyed by character id, each value a ledger
//! with camelCase fields. It is always rewritten whole through a temp file
//! in the same directory, so readers never see a half-written cache.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use heroforge_domain::{ApLedger, CharacterId};

use crate::infrastructure::ports::{ApCacheStore, CacheError};

pub struct JsonApCacheFile {
    path: PathBuf,
}

impl JsonApCacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn parse(&self, contents: &str) -> Result<BTreeMap<CharacterId, ApLedger>, CacheError> {
        let raw: BTreeMap<String, ApLedger> = serde_json::from_str(contents)
            .map_err(|e| CacheError::malformed(self.location(), e))?;

        raw.into_iter()
            .map(|(key, ledger)| {
                key.parse::<CharacterId>()
                    .map(|id| (id, ledger))
                    .map_err(|e| {
                        CacheError::malformed(self.location(), format!("bad key {key:?}: {e}"))
                    })
            })
            .collect()
    }

    fn atomic_write(&self, data: &[u8]) -> Result<(), CacheError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| {
            CacheError::write(self.location(), format!("failed to create {}: {e}", dir.display()))
        })?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| {
            CacheError::write(
                self.location(),
                format!("failed to create temp file in {}: {e}", dir.display()),
            )
        })?;
        temp.write_all(data)
            .and_then(|()| temp.flush())
            .map_err(|e| CacheError::write(self.location(), e))?;
        temp.persist(&self.path)
            .map_err(|e| CacheError::write(self.location(), e.error))?;
        Ok(())
    }
}

impl ApCacheStore for JsonApCacheFile {
    fn load(&self) -> Result<BTreeMap<CharacterId, ApLedger>, CacheError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => self.parse(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(CacheError::read(self.location(), e)),
        }
    }

    fn save(&self, ledgers: &BTreeMap<CharacterId, ApLedger>) -> Result<(), CacheError> {
        let keyed: BTreeMap<String, &ApLedger> = ledgers
            .iter()
            .map(|(id, ledger)| (id.to_string(), ledger))
            .collect();
        let contents = serde_json::to_string_pretty(&keyed)
            .map_err(|e| CacheError::write(self.location(), e))?;
        self.atomic_write(contents.as_bytes())
    }
}
