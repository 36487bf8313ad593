use std::{
    cmp::Reverse,
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::RwLock,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shopbook_core::{CoreError, FieldUpdates, RecordStore};
use shopbook_domain::{lenient, Table};

const BOOK_FILE: &str = "book.json";
const BACKUP_PREFIX: &str = "book_";
const BACKUP_SUFFIX: &str = ".json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const STAGING_SUFFIX: &str = ".tmp";
const DEFAULT_RETENTION: usize = 5;
const SCHEMA_VERSION: u32 = 1;

/// Where the book document and its backups live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub book_file: PathBuf,
    pub backup_root: PathBuf,
}

impl StorePaths {
    /// `<root>/book.json` with backups in `<root>/backups`.
    pub fn under(root: &Path) -> Self {
        Self {
            book_file: root.join(BOOK_FILE),
            backup_root: root.join("backups"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    schema_version: u32,
    #[serde(default)]
    tables: BTreeMap<String, Vec<Value>>,
}

impl StoreDocument {
    fn rows_mut(&mut self, table: Table) -> &mut Vec<Value> {
        self.tables.entry(table.as_str().to_string()).or_default()
    }
}

/// Filesystem-backed [`RecordStore`]: every table lives in one JSON document
/// that is rewritten atomically after each change.
pub struct JsonRecordStore {
    paths: StorePaths,
    retention: usize,
    document: RwLock<StoreDocument>,
}

impl JsonRecordStore {
    pub fn open(paths: StorePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StorePaths, retention: usize) -> Result<Self, CoreError> {
        if let Some(parent) = paths.book_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&paths.backup_root)?;
        let document = if paths.book_file.exists() {
            load_document(&paths.book_file)?
        } else {
            StoreDocument {
                schema_version: SCHEMA_VERSION,
                ..StoreDocument::default()
            }
        };
        tracing::debug!(path = %paths.book_file.display(), "opened json store");
        Ok(Self {
            paths,
            retention: retention.max(1),
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.paths.book_file
    }

    /// Copies the current document into the backup folder and prunes old copies.
    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let file_name = match note.and_then(backup_label) {
            Some(label) => format!("{BACKUP_PREFIX}{stamp}_{label}{BACKUP_SUFFIX}"),
            None => format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}"),
        };
        let path = self.paths.backup_root.join(&file_name);
        let data = {
            let document = self
                .document
                .read()
                .map_err(|_| CoreError::LockPoisoned("backup"))?;
            serialize_document(&document)?
        };
        replace_file(&path, &data)?;
        self.prune_backups()?;
        tracing::info!(backup = %file_name, "created backup");
        Ok(BackupInfo {
            id: file_name.clone(),
            created_at: parse_backup_timestamp(&file_name),
            size_bytes: data.len() as u64,
            path,
        })
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.paths.backup_root.exists() {
            return Ok(Vec::new());
        }
        let mut entries: Vec<BackupInfo> = fs::read_dir(&self.paths.backup_root)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let id = entry.file_name().into_string().ok()?;
                if !id.starts_with(BACKUP_PREFIX) || !id.ends_with(BACKUP_SUFFIX) {
                    return None;
                }
                Some(BackupInfo {
                    created_at: parse_backup_timestamp(&id),
                    size_bytes: entry.metadata().map(|meta| meta.len()).unwrap_or(0),
                    path: entry.path(),
                    id,
                })
            })
            .collect();
        entries.sort_by_key(|info| (Reverse(info.created_at), Reverse(info.id.clone())));
        Ok(entries)
    }

    /// Replaces the live document with a backup's contents.
    pub fn restore_backup(&self, backup: &BackupInfo) -> Result<(), CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let restored = load_document(&backup.path)?;
        let mut document = self
            .document
            .write()
            .map_err(|_| CoreError::LockPoisoned("restore"))?;
        *document = restored;
        self.persist(&document)?;
        tracing::info!(backup = %backup.id, "restored backup");
        Ok(())
    }

    pub fn delete_backup(&self, backup_id: &str) -> Result<(), CoreError> {
        let path = self.paths.backup_root.join(backup_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for entry in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(backup = %entry.id, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }

    fn persist(&self, document: &StoreDocument) -> Result<(), CoreError> {
        replace_file(&self.paths.book_file, &serialize_document(document)?)
    }
}

impl RecordStore for JsonRecordStore {
    fn list_all(&self, table: Table) -> Result<Vec<Value>, CoreError> {
        let document = self
            .document
            .read()
            .map_err(|_| CoreError::LockPoisoned("read"))?;
        Ok(document
            .tables
            .get(table.as_str())
            .cloned()
            .unwrap_or_default())
    }

    fn insert(&self, table: Table, record: Value) -> Result<(), CoreError> {
        if !record.is_object() {
            return Err(CoreError::Validation(format!(
                "{table} rows must be JSON objects"
            )));
        }
        let mut document = self
            .document
            .write()
            .map_err(|_| CoreError::LockPoisoned("write"))?;
        document.rows_mut(table).push(record);
        self.persist(&document)
    }

    fn update_field(&self, table: Table, id: &str, fields: FieldUpdates) -> Result<(), CoreError> {
        let mut document = self
            .document
            .write()
            .map_err(|_| CoreError::LockPoisoned("write"))?;
        let row = document
            .rows_mut(table)
            .iter_mut()
            .find(|row| row.get("id").map(lenient::coerce_text).as_deref() == Some(id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| CoreError::Storage(format!("{table} row `{id}` not found")))?;
        row.extend(fields);
        self.persist(&document)
    }
}

/// Reads a store document. Flat documents with one top-level array per table
/// (`credits`, `credit_payments`, ...) are accepted too.
fn load_document(path: &Path) -> Result<StoreDocument, CoreError> {
    let data = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&data)?;
    if raw.get("tables").is_some() {
        return Ok(serde_json::from_value(raw)?);
    }
    let mut document = StoreDocument {
        schema_version: SCHEMA_VERSION,
        ..StoreDocument::default()
    };
    for table in Table::ALL {
        let rows = [table.as_str(), flat_key(table)]
            .into_iter()
            .find_map(|key| raw.get(key).and_then(Value::as_array));
        if let Some(rows) = rows {
            document.rows_mut(table).extend(rows.iter().cloned());
        }
    }
    tracing::info!(path = %path.display(), "imported flat book document");
    Ok(document)
}

fn flat_key(table: Table) -> &'static str {
    match table {
        Table::CustomerCredits => "credits",
        Table::CustomerPayments => "credit_payments",
        other => other.as_str(),
    }
}

/// Lower-case ASCII words of a backup note, joined by dashes.
fn backup_label(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("-"))
}

/// `book_YYYYMMDD_HHMM[_label].json`
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.get(..13)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Stages `data` beside `path`, then renames it into place.
fn replace_file(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut staging = path.as_os_str().to_owned();
    staging.push(STAGING_SUFFIX);
    let staging = PathBuf::from(staging);
    let mut file = File::create(&staging)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(&staging, path)?;
    Ok(())
}

fn serialize_document(document: &StoreDocument) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_notes_are_slugged() {
        assert_eq!(
            backup_label("  Before March close! ").as_deref(),
            Some("before-march-close")
        );
        assert_eq!(backup_label("***"), None);
    }

    #[test]
    fn backup_timestamps_parse_with_or_without_note() {
        assert!(parse_backup_timestamp("book_20240301_0930.json").is_some());
        assert!(parse_backup_timestamp("book_20240301_0930_pre-import.json").is_some());
        assert!(parse_backup_timestamp("book_2024_0930.json").is_none());
        assert!(parse_backup_timestamp("notes.txt").is_none());
    }

    #[test]
    fn replace_file_leaves_no_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("book.json");
        replace_file(&path, "{}").expect("write");
        replace_file(&path, "{\"tables\": {}}").expect("overwrite");
        assert_eq!(fs::read_to_string(&path).expect("read"), "{\"tables\": {}}");
        assert!(!dir.path().join("nested").join("book.json.tmp").exists());
    }
}
