// storage protocol:
// recommendations/[user_id] -> json RecommendationSet, the one live set of the user
// profiles/[user_id] -> json ProfileRecord
//
// every record is a single key, so an upsert is one atomic write and concurrent
// writers for the same user resolve last-write-wins

use crate::catalog::{Course, UserProfile};
use anyhow::{Context, Result};
use opendal::services::Sled;
use opendal::{ErrorKind, Operator};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub user_id: u64,
    pub courses: Vec<Course>,
    pub top_n: usize,
}

/// Persisted profile of a learner. Only the first three fields drive ranking.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub career_goals: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub job_role: Option<String>,
    pub interested_courses: Option<String>,
    pub liked_courses: Option<String>,
}

impl From<&ProfileRecord> for UserProfile {
    fn from(record: &ProfileRecord) -> Self {
        UserProfile {
            career_goals: record.career_goals.clone(),
            skills: record.skills.clone(),
            interests: record.interests.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Storage {
    pub operator: Operator,
}

impl Storage {
    pub fn new(datadir: &str) -> Result<Self> {
        let mut builder = Sled::default();
        builder.datadir(datadir);

        let operator = Operator::new(builder)
            .with_context(|| format!("failed to open storage at {}", datadir))?
            .finish();
        Ok(Storage { operator })
    }

    pub async fn upsert(&self, user_id: u64, set: &RecommendationSet) -> Result<()> {
        self.put(&recommendations_key(user_id), set).await?;
        debug!(
            "store recommendations: user_id: {}, courses: {}",
            user_id,
            set.courses.len()
        );
        Ok(())
    }

    pub async fn get(&self, user_id: u64) -> Result<Option<RecommendationSet>> {
        self.fetch(&recommendations_key(user_id)).await
    }

    pub async fn put_profile(&self, user_id: u64, profile: &ProfileRecord) -> Result<()> {
        self.put(&profile_key(user_id), profile).await
    }

    pub async fn get_profile(&self, user_id: u64) -> Result<Option<ProfileRecord>> {
        self.fetch(&profile_key(user_id)).await
    }

    async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.operator
            .write(key, bytes)
            .await
            .with_context(|| format!("failed to write {}", key))?;
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let bytes = match self.operator.read(key).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("failed to read {}", key)))
            }
        };
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("corrupted record at {}", key))?;
        Ok(Some(value))
    }
}

fn recommendations_key(user_id: u64) -> String {
    "recommendations/".to_string() + &user_id.to_string()
}

fn profile_key(user_id: u64) -> String {
    "profiles/".to_string() + &user_id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().expect("temp dir");
        let storage = Storage::new(dir.path().to_str().expect("utf-8 path")).expect("open storage");
        (dir, storage)
    }

    fn set(user_id: u64, titles: &[&str]) -> RecommendationSet {
        RecommendationSet {
            user_id,
            courses: titles
                .iter()
                .enumerate()
                .map(|(i, t)| Course::new(i, t, "", ""))
                .collect(),
            top_n: titles.len(),
        }
    }

    #[tokio::test]
    async fn missing_set_is_none() {
        let (_dir, storage) = temp_storage();
        assert_eq!(storage.get(7).await.unwrap(), None);
        assert_eq!(storage.get_profile(7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_replaces_previous_set() {
        let (_dir, storage) = temp_storage();
        storage.upsert(1, &set(1, &["rust", "go"])).await.unwrap();
        storage.upsert(1, &set(1, &["cooking"])).await.unwrap();

        assert_eq!(storage.get(1).await.unwrap(), Some(set(1, &["cooking"])));
    }

    #[tokio::test]
    async fn users_are_independent() {
        let (_dir, storage) = temp_storage();
        storage.upsert(1, &set(1, &["rust"])).await.unwrap();
        storage.upsert(2, &set(2, &["go"])).await.unwrap();

        assert_eq!(storage.get(1).await.unwrap(), Some(set(1, &["rust"])));
        assert_eq!(storage.get(2).await.unwrap(), Some(set(2, &["go"])));
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let (_dir, storage) = temp_storage();
        let record = ProfileRecord {
            skills: Some("sql".to_string()),
            age: Some(31),
            liked_courses: Some("Intro to SQL".to_string()),
            ..Default::default()
        };
        storage.put_profile(3, &record).await.unwrap();

        let loaded = storage.get_profile(3).await.unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(UserProfile::from(&loaded), UserProfile::new(None, Some("sql"), None));
    }
}
