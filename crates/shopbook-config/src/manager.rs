use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "config_";
const BACKUP_SUFFIX: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// A saved copy of the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackup {
    pub name: String,
    /// `None` when the file name does not carry a readable timestamp.
    pub taken_at: Option<DateTime<Utc>>,
}

/// Loads, saves and versions [`Config`] under `<base>/config`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// `<base>/config/config.json` with backups under `<base>/config/backups`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let dir = base.join("config");
        let manager = Self::new(dir.join(CONFIG_FILE), dir.join("backups"));
        fs::create_dir_all(&manager.backups_dir)?;
        Ok(manager)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Missing files yield [`Config::default`].
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        replace_file(&self.config_path, config)
    }

    /// Changes one setting: the current file is backed up, then the updated
    /// settings are saved and returned.
    pub fn update(&self, current: &Config, key: &str, value: &str) -> Result<Config, ConfigError> {
        let mut updated = current.clone();
        updated.set(key, value)?;
        self.backup(current, Some(&format!("before {key}")))?;
        self.save(&updated)?;
        Ok(updated)
    }

    /// Snapshots `config`, keeping at most `config.backup_retention` copies.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<ConfigBackup, ConfigError> {
        let taken_at = Utc::now();
        let mut name = format!("{BACKUP_PREFIX}{}", taken_at.format(STAMP_FORMAT));
        if let Some(label) = note.and_then(note_slug) {
            name = format!("{name}_{label}");
        }
        name.push_str(BACKUP_SUFFIX);
        replace_file(&self.backups_dir.join(&name), config)?;

        let keep = config.backup_retention.max(1);
        for stale in self.list_backups()?.into_iter().skip(keep) {
            let _ = fs::remove_file(self.backups_dir.join(&stale.name));
        }
        Ok(ConfigBackup {
            taken_at: parse_stamp(&name),
            name,
        })
    }

    /// Makes the named backup the active configuration again.
    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let data = fs::read_to_string(self.backups_dir.join(backup_name)).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::BackupNotFound(backup_name.to_string())
            } else {
                err.into()
            }
        })?;
        let config: Config = serde_json::from_str(&data)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Newest first.
    pub fn list_backups(&self) -> Result<Vec<ConfigBackup>, ConfigError> {
        if !self.backups_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut backups: Vec<ConfigBackup> = fs::read_dir(&self.backups_dir)?
            .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
            .filter(|name| name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX))
            .map(|name| ConfigBackup {
                taken_at: parse_stamp(&name),
                name,
            })
            .collect();
        backups.sort_by_key(|backup| (Reverse(backup.taken_at), Reverse(backup.name.clone())));
        Ok(backups)
    }
}

/// Lower-case ASCII words joined by single dashes.
fn note_slug(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("-"))
}

/// Reads `YYYYMMDD_HHMM` right after the `config_` prefix.
fn parse_stamp(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.get(..13)?;
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Writes next to `path` and renames over it so readers never see a partial file.
fn replace_file(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    fs::write(&staging, serde_json::to_string_pretty(config)?)?;
    fs::rename(&staging, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_and_stamps() {
        assert_eq!(note_slug("Before  Tax-Change!").as_deref(), Some("before-tax-change"));
        assert_eq!(note_slug(" -- "), None);
        assert!(parse_stamp("config_20240301_0915_before-set.json").is_some());
        assert!(parse_stamp("config_notes.json").is_none());
    }
}
