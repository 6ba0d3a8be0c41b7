//! hearth-storage-json
//!
//! Filesystem-backed [`HouseholdStore`] keeping the whole household in one JSON file,
//! with timestamped backups taken before every overwrite.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use hearth_core::{
    storage::{
        ensure_at_most_one_open, ensure_new_user, ensure_single_open_period, HouseholdStore,
        UserEdit,
    },
    CoreError,
};
use hearth_domain::{HouseholdSnapshot, PeriodRecord, UserProfile};

const SNAPSHOT_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "household";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBackup {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

pub struct JsonHouseholdStore {
    snapshot_path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    write_lock: Mutex<()>,
}

impl JsonHouseholdStore {
    pub fn new(snapshot_path: PathBuf, backups_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(snapshot_path, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        snapshot_path: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        if let Some(parent) = snapshot_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            snapshot_path,
            backups_dir,
            retention: retention.max(1),
            write_lock: Mutex::new(()),
        })
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Copies the current snapshot file into the backups directory.
    pub fn backup(&self, note: Option<&str>) -> Result<Option<SnapshotBackup>, CoreError> {
        let _guard = self.lock()?;
        self.backup_current(note)
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<SnapshotBackup>, CoreError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(SnapshotBackup {
                    name: name.to_string(),
                    created_at: parse_backup_timestamp(name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by(|a, b| {
            Reverse(a.created_at)
                .cmp(&Reverse(b.created_at))
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }

    /// Replaces the live snapshot with the named backup.
    pub fn restore_backup(&self, name: &str) -> Result<HouseholdSnapshot, CoreError> {
        let _guard = self.lock()?;
        let path = self.backups_dir.join(name);
        if !path.exists() {
            return Err(CoreError::Storage(format!("backup `{name}` not found")));
        }
        let snapshot = read_snapshot(&path)?;
        self.backup_current(Some("pre-restore"))?;
        write_snapshot(&self.snapshot_path, &snapshot)?;
        info!(backup = name, "restored household snapshot");
        Ok(snapshot)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("snapshot write lock poisoned".into()))
    }

    fn read_current(&self) -> Result<HouseholdSnapshot, CoreError> {
        if !self.snapshot_path.exists() {
            debug!(path = %self.snapshot_path.display(), "no snapshot yet, starting empty");
            return Ok(HouseholdSnapshot::default());
        }
        read_snapshot(&self.snapshot_path)
    }

    /// Backs up then writes. Callers hold the write lock.
    fn replace(&self, snapshot: &HouseholdSnapshot) -> Result<(), CoreError> {
        self.backup_current(None)?;
        write_snapshot(&self.snapshot_path, snapshot)
    }

    fn backup_current(&self, note: Option<&str>) -> Result<Option<SnapshotBackup>, CoreError> {
        if !self.snapshot_path.exists() {
            return Ok(None);
        }
        let created = Utc::now();
        let stamp = created.format(BACKUP_TIMESTAMP_FORMAT);
        let name = match sanitize_backup_note(note) {
            Some(label) => format!("{BACKUP_PREFIX}_{stamp}_{label}.{SNAPSHOT_EXTENSION}"),
            None => format!("{BACKUP_PREFIX}_{stamp}.{SNAPSHOT_EXTENSION}"),
        };
        let path = self.backups_dir.join(&name);
        fs::copy(&self.snapshot_path, &path)?;
        self.prune_backups();
        Ok(Some(SnapshotBackup {
            created_at: parse_backup_timestamp(&name),
            name,
            path,
        }))
    }

    fn prune_backups(&self) {
        let entries = match self.list_backups() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "unable to list snapshot backups for pruning");
                return;
            }
        };
        for stale in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale.path) {
                warn!(backup = %stale.name, error = %err, "failed to prune snapshot backup");
            }
        }
    }
}

impl HouseholdStore for JsonHouseholdStore {
    fn load_snapshot(&self) -> Result<HouseholdSnapshot, CoreError> {
        self.read_current()
    }

    fn save_snapshot(&self, snapshot: &HouseholdSnapshot) -> Result<(), CoreError> {
        let _guard = self.lock()?;
        self.replace(snapshot)
    }

    fn insert_period(&self, user_id: Uuid, record: PeriodRecord) -> Result<(), CoreError> {
        let _guard = self.lock()?;
        let mut snapshot = self.read_current()?;
        let user = snapshot
            .user_mut(user_id)
            .ok_or(CoreError::UserNotFound(user_id))?;
        ensure_single_open_period(user, &record)?;
        info!(user_id = %user_id, period_id = %record.id, "storing budget period");
        user.budget_periods.push(record);
        self.replace(&snapshot)
    }

    fn update_user(
        &self,
        user_id: Uuid,
        edit: &mut UserEdit<'_>,
    ) -> Result<UserProfile, CoreError> {
        let _guard = self.lock()?;
        let mut snapshot = self.read_current()?;
        let mut user = snapshot
            .user(user_id)
            .cloned()
            .ok_or(CoreError::UserNotFound(user_id))?;
        edit(&snapshot, &mut user)?;
        ensure_at_most_one_open(&user)?;
        match snapshot.user_mut(user_id) {
            Some(slot) => *slot = user.clone(),
            None => return Err(CoreError::UserNotFound(user_id)),
        }
        debug!(user_id = %user_id, "updated user profile");
        self.replace(&snapshot)?;
        Ok(user)
    }

    fn insert_user(&self, user: UserProfile) -> Result<(), CoreError> {
        let _guard = self.lock()?;
        let mut snapshot = self.read_current()?;
        ensure_new_user(&snapshot, &user)?;
        info!(user_id = %user.id, "storing user profile");
        snapshot.users.push(user);
        self.replace(&snapshot)
    }
}

/// Reads a snapshot from an arbitrary path.
pub fn read_snapshot(path: &Path) -> Result<HouseholdSnapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Writes a snapshot through a sibling temp file and a rename.
pub fn write_snapshot(path: &Path, snapshot: &HouseholdSnapshot) -> Result<(), CoreError> {
    let json =
        serde_json::to_string_pretty(snapshot).map_err(|err| CoreError::Serde(err.to_string()))?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    let trimmed = sanitized.trim_end_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(BACKUP_PREFIX)?.strip_prefix('_')?;
    let raw = rest.get(..15)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_round_trip_their_timestamp() {
        let parsed = parse_backup_timestamp("household_20240105_093000_pre-restore.json");
        assert_eq!(
            parsed.map(|ts| ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Some("2024-01-05T09:30:00".into())
        );
        assert_eq!(parse_backup_timestamp("household.json"), None);
    }

    #[test]
    fn notes_are_slugged() {
        assert_eq!(
            sanitize_backup_note(Some("Before  Import!")),
            Some("before-import".into())
        );
        assert_eq!(sanitize_backup_note(Some("   ")), None);
    }
}
