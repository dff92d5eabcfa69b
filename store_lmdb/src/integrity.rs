//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before the service accepts
//! webhooks. Besides counting entries, the check cross-validates the
//! fingerprint index against the account records it points at.

use std::path::Path;

use kycgate_store::AccountRecord;

use crate::codec::{decode, decode_account_id, read_account};
use crate::environment::{ACCOUNTS_DB, FINGERPRINTS_DB, SESSIONS_DB};
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub verified_accounts: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check database integrity.
///
/// Read failures and index inconsistencies are recorded in the report rather
/// than causing a hard error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = env.env().read_txn()?;

    for (name, db) in [
        (ACCOUNTS_DB, &env.accounts_db),
        (FINGERPRINTS_DB, &env.fingerprints_db),
        (SESSIONS_DB, &env.sessions_db),
    ] {
        report.databases_checked += 1;
        match db.len(&rtxn) {
            Ok(count) => report.total_entries += count,
            Err(e) => report
                .errors
                .push(format!("failed to read database '{name}': {e}")),
        }
    }

    // Every verified account must be the registered holder of its fingerprint.
    for entry in env.accounts_db.iter(&rtxn)? {
        let (key, value) = entry?;
        let record: AccountRecord = match decode(value) {
            Ok(r) => r,
            Err(e) => {
                report.errors.push(format!(
                    "undecodable account '{}': {e}",
                    String::from_utf8_lossy(key)
                ));
                continue;
            }
        };
        if !record.is_verified() {
            continue;
        }
        report.verified_accounts += 1;
        let Some(fp) = &record.fingerprint else {
            report
                .errors
                .push(format!("verified account {} has no fingerprint", record.id));
            continue;
        };
        let holder = env
            .fingerprints_db
            .get(&rtxn, fp.as_str().as_bytes())?
            .map(decode_account_id);
        match holder {
            Some(Ok(h)) if h == record.id => {}
            _ => report.errors.push(format!(
                "fingerprint {} of account {} is not indexed to it",
                fp.short(),
                record.id
            )),
        }
    }

    // Every index entry must point at a verified account holding it.
    for entry in env.fingerprints_db.iter(&rtxn)? {
        let (key, value) = entry?;
        let fp = String::from_utf8_lossy(key);
        let holder = match decode_account_id(value) {
            Ok(h) => h,
            Err(e) => {
                report.errors.push(format!("fingerprint index entry {fp}: {e}"));
                continue;
            }
        };
        let consistent = read_account(&env.accounts_db, &rtxn, &holder)
            .ok()
            .flatten()
            .is_some_and(|r| {
                r.is_verified() && r.fingerprint.as_ref().map(|f| f.as_str()) == Some(&*fp)
            });
        if !consistent {
            report
                .errors
                .push(format!("fingerprint index entry for {holder} is stale"));
        }
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
