use crate::errors::AppError;
use crate::models::{AchievementUnlock, Entry, Goal, Journal, StreakRecord};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

/// A collection persisted as one JSON document under a fixed key.
pub trait Document: Serialize + DeserializeOwned + Default {
    const KEY: &'static str;
}

impl Document for Vec<Entry> {
    const KEY: &'static str = "mindful_entries";
}

impl Document for Vec<Goal> {
    const KEY: &'static str = "mindful_goals";
}

impl Document for Vec<AchievementUnlock> {
    const KEY: &'static str = "mindful_achievements";
}

impl Document for StreakRecord {
    const KEY: &'static str = "mindful_streak";
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Missing documents load as empty; unreadable or malformed ones are errors.
    pub async fn try_load<T: Document>(&self) -> Result<T, AppError> {
        match fs::read(self.path_for(T::KEY)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| AppError::Parse { key: T::KEY, source }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Like [`JsonStore::try_load`] but never fails: a corrupt document is
    /// moved aside to `<key>.json.corrupt` and the collection starts empty.
    pub async fn load<T: Document>(&self) -> T {
        match self.try_load::<T>().await {
            Ok(data) => data,
            Err(err @ AppError::Parse { .. }) => {
                error!("failed to parse data file: {err}");
                self.quarantine(T::KEY).await;
                T::default()
            }
            Err(err) => {
                error!("failed to read data file {}: {err}", T::KEY);
                T::default()
            }
        }
    }

    pub async fn persist<T: Document>(&self, data: &T) -> Result<(), AppError> {
        let (key, payload) = encode(data)?;
        self.write_document(key, &payload).await
    }

    pub async fn load_journal(&self) -> Journal {
        Journal {
            entries: self.load().await,
            goals: self.load().await,
            achievements: self.load().await,
            streak: self.load().await,
        }
    }

    /// Replaces all four documents with `next`. Every document is staged
    /// before any is moved into place; if a move fails, the documents already
    /// replaced are rewritten from `previous`.
    pub async fn replace_journal(&self, next: &Journal, previous: &Journal) -> Result<(), AppError> {
        let next = encode_journal(next)?;
        let previous = encode_journal(previous)?;

        let mut staged: Vec<(&'static str, PathBuf)> = Vec::with_capacity(next.len());
        for (key, payload) in &next {
            let tmp = self.staging_path(key);
            if let Err(err) = fs::write(&tmp, payload).await {
                discard(&tmp).await;
                for (_, path) in &staged {
                    discard(path).await;
                }
                return Err(err.into());
            }
            staged.push((key, tmp));
        }

        for (index, (key, tmp)) in staged.iter().enumerate() {
            if let Err(err) = fs::rename(tmp, self.path_for(key)).await {
                error!("failed to replace {key}: {err}");
                for (_, rest) in &staged[index..] {
                    discard(rest).await;
                }
                for (restored, payload) in &previous[..index] {
                    if let Err(restore_err) = self.write_document(restored, payload).await {
                        error!("failed to restore {restored}: {restore_err}");
                    }
                }
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.tmp"))
    }

    async fn write_document(&self, key: &str, payload: &[u8]) -> Result<(), AppError> {
        let tmp = self.staging_path(key);
        let written = match fs::write(&tmp, payload).await {
            Ok(()) => fs::rename(&tmp, self.path_for(key)).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            discard(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn quarantine(&self, key: &str) {
        let from = self.path_for(key);
        let to = self.dir.join(format!("{key}.json.corrupt"));
        if let Err(err) = fs::rename(&from, &to).await {
            warn!("could not move corrupt {} aside: {err}", from.display());
        }
    }
}

fn encode<T: Document>(data: &T) -> Result<(&'static str, Vec<u8>), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::Encode)?;
    Ok((T::KEY, payload))
}

fn encode_journal(journal: &Journal) -> Result<Vec<(&'static str, Vec<u8>)>, AppError> {
    Ok(vec![
        encode(&journal.entries)?,
        encode(&journal.goals)?,
        encode(&journal.achievements)?,
        encode(&journal.streak)?,
    ])
}

async fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!("could not remove {}: {err}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn missing_documents_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let journal = store.load_journal().await;
        assert_eq!(journal, Journal::default());
    }

    #[tokio::test]
    async fn collections_are_stored_independently() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let streak = StreakRecord {
            count: 4,
            last_check_date: NaiveDate::from_ymd_opt(2026, 3, 2),
        };

        store.persist(&streak).await.unwrap();

        assert!(store.path_for("mindful_streak").exists());
        assert!(!store.path_for("mindful_entries").exists());
        let loaded: StreakRecord = store.load().await;
        assert_eq!(loaded, streak);
    }

    #[tokio::test]
    async fn corrupt_document_is_reported_then_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        std::fs::write(store.path_for("mindful_goals"), b"[{not json").unwrap();

        let err = store.try_load::<Vec<Goal>>().await.unwrap_err();
        assert!(matches!(err, AppError::Parse { key: "mindful_goals", .. }));

        let goals: Vec<Goal> = store.load().await;
        assert!(goals.is_empty());
        assert!(dir.path().join("mindful_goals.json.corrupt").exists());
        assert!(!store.path_for("mindful_goals").exists());
    }

    #[tokio::test]
    async fn persist_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        store.persist(&StreakRecord::default()).await.unwrap();
        assert!(!dir.path().join("mindful_streak.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_replace_restores_earlier_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let previous = Journal {
            streak: StreakRecord {
                count: 2,
                last_check_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            },
            ..Journal::default()
        };
        store.replace_journal(&previous, &Journal::default()).await.unwrap();

        // A directory where the goals document belongs makes its move fail.
        std::fs::remove_file(store.path_for("mindful_goals")).unwrap();
        std::fs::create_dir(store.path_for("mindful_goals")).unwrap();

        let next = Journal {
            entries: vec![sample_entry()],
            streak: StreakRecord::default(),
            ..Journal::default()
        };
        assert!(store.replace_journal(&next, &previous).await.is_err());

        let entries = store.try_load::<Vec<Entry>>().await.unwrap();
        assert!(entries.is_empty());
        let streak = store.try_load::<StreakRecord>().await.unwrap();
        assert_eq!(streak, previous.streak);
        for key in ["mindful_entries", "mindful_goals", "mindful_achievements", "mindful_streak"] {
            assert!(!dir.path().join(format!("{key}.json.tmp")).exists(), "{key} left staged");
        }
    }

    fn sample_entry() -> Entry {
        use crate::models::{Mood, SleepQuality};
        use chrono::{TimeZone, Utc};

        Entry {
            id: 1,
            date: Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
            mood: Mood::Happy,
            journal: "sunny".into(),
            activities: Vec::new(),
            sleep_quality: SleepQuality::Good,
        }
    }
}
