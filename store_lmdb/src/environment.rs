//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::{LmdbAccountStore, LmdbError, LmdbSessionStore};

pub(crate) const ACCOUNTS_DB: &str = "accounts";
pub(crate) const FINGERPRINTS_DB: &str = "fingerprints";
pub(crate) const SESSIONS_DB: &str = "sessions";

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    path: PathBuf,
    /// account id → bincode `AccountRecord`
    pub(crate) accounts_db: Database<Bytes, Bytes>,
    /// fingerprint hex → holder account id
    pub(crate) fingerprints_db: Database<Bytes, Bytes>,
    /// owner account id → bincode latest `VerificationSession`
    pub(crate) sessions_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path per process; callers
        // own the data directory exclusively.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let accounts_db = env.create_database(&mut wtxn, Some(ACCOUNTS_DB))?;
        let fingerprints_db = env.create_database(&mut wtxn, Some(FINGERPRINTS_DB))?;
        let sessions_db = env.create_database(&mut wtxn, Some(SESSIONS_DB))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
            accounts_db,
            fingerprints_db,
            sessions_db,
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush dirty pages to disk.
    pub fn force_sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }

    pub fn account_store(&self) -> LmdbAccountStore {
        LmdbAccountStore {
            env: Arc::clone(&self.env),
            accounts_db: self.accounts_db,
            fingerprints_db: self.fingerprints_db,
        }
    }

    pub fn session_store(&self) -> LmdbSessionStore {
        LmdbSessionStore {
            env: Arc::clone(&self.env),
            sessions_db: self.sessions_db,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db");
        let env = LmdbEnvironment::open(&path, 10 * 1024 * 1024).unwrap();
        assert!(path.join("data.mdb").exists());
        assert_eq!(env.path(), path.as_path());
    }
}
