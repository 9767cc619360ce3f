use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::entities::HabitEntity;

/// File inside the application directory holding the whole habit sequence.
pub const STATE_FILE_NAME: &str = "habits.json";

/// Interface for abstracting storage of the habit sequence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitStorage: Send + Sync + 'static {
    /// Reads the stored sequence. Missing or unreadable state comes back as an empty sequence.
    async fn load(&self) -> Result<Vec<HabitEntity>>;

    /// Overwrites the stored sequence with the given one.
    async fn save(&self, habits: &[HabitEntity]) -> Result<()>;
}

/// The main realization of [HabitStorage]. The whole sequence lives in one json document that is
/// rewritten in full after every mutation.
pub struct JsonHabitStorage {
    state_path: PathBuf,
}

impl JsonHabitStorage {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            state_path: dir.join(STATE_FILE_NAME),
        })
    }

    async fn read_state(path: &Path) -> Result<Vec<HabitEntity>, std::io::Error> {
        debug!("Extracting {path:?}");
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut raw = String::new();
        let read_result = file.read_to_string(&mut raw).await;
        file.unlock_async().await?;
        read_result?;

        match serde_json::from_str::<Vec<HabitEntity>>(&raw) {
            Ok(habits) => Ok(habits),
            Err(e) => {
                // ignore illegal state. Might happen after shutdowns
                warn!("During parsing in path {path:?} found illegal json: {e}");
                Ok(vec![])
            }
        }
    }
}

#[async_trait]
impl HabitStorage for JsonHabitStorage {
    async fn load(&self) -> Result<Vec<HabitEntity>> {
        Ok(Self::read_state(&self.state_path).await?)
    }

    async fn save(&self, habits: &[HabitEntity]) -> Result<()> {
        let mut buffer = serde_json::to_vec(habits)?;
        buffer.push(b'\n');

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.state_path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let write_result = async {
            file.write_all(&buffer).await?;
            file.flush().await?;
            Ok::<_, std::io::Error>(())
        }
        .await;
        file.unlock_async().await?;
        write_result?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::store::entities::HabitEntity;

    use super::{HabitStorage, JsonHabitStorage, STATE_FILE_NAME};

    fn test_habits() -> Vec<HabitEntity> {
        vec![
            HabitEntity {
                id: 1736899200000,
                name: "Meditate".into(),
                streak: 1,
                last_completed: NaiveDate::from_ymd_opt(2025, 1, 15),
                completed_days: 7,
            },
            HabitEntity::new(1736899200001, "Stretch".into()),
        ]
    }

    #[tokio::test]
    async fn test_missing_state_loads_empty() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().to_owned())?;

        assert!(storage.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().to_owned())?;
        let habits = test_habits();

        storage.save(&habits).await?;

        assert_eq!(storage.load().await?, habits);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_state() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonHabitStorage::new(dir.path().to_owned())?;
        let habits = test_habits();

        storage.save(&habits).await?;
        storage.save(&habits[..1]).await?;

        assert_eq!(storage.load().await?, habits[..1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_state_loads_empty() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(STATE_FILE_NAME), "{not json")?;
        let storage = JsonHabitStorage::new(dir.path().to_owned())?;

        assert!(storage.load().await?.is_empty());
        Ok(())
    }
}
