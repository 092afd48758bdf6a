use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use time::{macros::format_description, Date, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;

use super::repo_types::{DailyLog, MealSnapshot};

/// Whole-document persistence for the daily log.
///
/// `append` is a plain read-modify-write. Two concurrent appends for the same
/// log can race and one of them may be lost.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Returns an empty log when nothing has been saved yet.
    async fn load(&self) -> anyhow::Result<DailyLog>;

    async fn save(&self, log: &DailyLog) -> anyhow::Result<()>;

    async fn append(&self, day: &str, meal: MealSnapshot) -> anyhow::Result<()> {
        let mut log = self.load().await?;
        log.push(day, meal);
        self.save(&log).await
    }
}

/// JSON file on disk, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Writes `bytes` to a uniquely named file beside `path`, then renames it over
/// `path`. Readers see either the old or the new document, never a partial one.
fn replace_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(bytes).context("write meal log")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replace meal log {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl LogStore for JsonFileStore {
    async fn load(&self) -> anyhow::Result<DailyLog> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no meal log yet");
                return Ok(DailyLog::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read meal log {}", self.path.display()))
            }
        };
        serde_json::from_slice(&bytes)
            .with_context(|| format!("decode meal log {}", self.path.display()))
    }

    async fn save(&self, log: &DailyLog) -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        log.serialize(&mut ser).context("encode meal log")?;

        let len = buf.len();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &buf))
            .await
            .context("meal log writer task")??;
        debug!(path = %self.path.display(), bytes = len, "meal log saved");
        Ok(())
    }
}

/// In-process log, used when no file should be touched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    log: Mutex<DailyLog>,
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn load(&self) -> anyhow::Result<DailyLog> {
        Ok(self.log.lock().await.clone())
    }

    async fn save(&self, log: &DailyLog) -> anyhow::Result<()> {
        *self.log.lock().await = log.clone();
        Ok(())
    }
}

/// Today's local date as a log key. Falls back to UTC when the local
/// offset cannot be determined.
pub fn today_key() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    day_key(now.date())
}

pub fn day_key(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use std::sync::Arc;
    use tempfile::tempdir;
    use time::macros::date;

    fn meal(name: &str, calories: f64) -> MealSnapshot {
        let mut fields = Map::new();
        fields.insert("Dish_Name".into(), json!(name));
        fields.insert("Calories".into(), json!(calories));
        MealSnapshot::from_fields(fields)
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("calorie_log.json"));
        let log = store.load().await.unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn append_creates_file_and_day() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("calorie_log.json");
        let store = JsonFileStore::new(&path);

        store.append("2024-05-01", meal("Idli", 58.0)).await.unwrap();
        store.append("2024-05-01", meal("Vada", 97.0)).await.unwrap();

        let log = store.load().await.unwrap();
        let names: Vec<_> = log.day("2024-05-01").iter().map(|m| m.dish_name()).collect();
        assert_eq!(names, vec!["Idli", "Vada"]);
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["calorie_log.json"]);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n        {"), "expected 4-space indent: {raw}");
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("log.json"));

        let mut log = DailyLog::default();
        log.push("2024-05-01", meal("Idli", 58.0));
        log.push("2024-05-02", meal("Poha", 180.0));
        store.save(&log).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, log);
        store.save(&loaded).await.unwrap();
        assert_eq!(store.load().await.unwrap(), log);
    }

    #[tokio::test]
    async fn concurrent_saves_leave_a_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.json");
        let store = Arc::new(JsonFileStore::new(&path));

        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let mut log = DailyLog::default();
                for _ in 0..=i {
                    log.push("2024-05-01", meal("Idli", 58.0));
                }
                store.save(&log).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let log = store.load().await.unwrap();
        assert!((1..=16).contains(&log.day("2024-05-01").len()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope").join("log.json"));
        let err = store.save(&DailyLog::default()).await.unwrap_err();
        assert!(err.to_string().contains("create temp file"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(err.to_string().contains("decode meal log"));
    }

    #[tokio::test]
    async fn memory_store_appends() {
        let store = MemoryStore::default();
        store.append("2024-05-01", meal("Idli", 58.0)).await.unwrap();
        assert_eq!(store.load().await.unwrap().day("2024-05-01").len(), 1);
    }

    #[test]
    fn day_key_is_iso_date() {
        assert_eq!(day_key(date!(2024 - 03 - 07)), "2024-03-07");
        let today = today_key();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[4..5], "-");
    }
}
