//! Song loading: from a `songs.json` file or from the `songs` collection.

use std::path::Path;

use chrono::{Datelike, Local, NaiveDateTime};
use choir_core::{Song, WeeklySong, build_weekly_view, normalize_songs, select_upcoming_at};
use serde_json::Value;
use tracing::{debug, info};

use crate::records::Collection;
use crate::{DocumentStore, StoreClient, StoreError};

/// Read a song file shaped either `{"songs": [...]}` or as a bare array.
///
/// Records that cannot be normalized are skipped and logged.
pub async fn load_song_file(path: impl AsRef<Path>) -> Result<Vec<Song>, StoreError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let value: Value = serde_json::from_slice(&bytes)?;
    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut obj) => match obj.remove("songs") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(StoreError::Validation(format!(
                    "{} has no `songs` array",
                    path.display()
                )));
            }
        },
        _ => {
            return Err(StoreError::Validation(format!(
                "{} is not a song list",
                path.display()
            )));
        }
    };
    let songs = normalize_songs(&records, Local::now().year());
    info!(
        path = %path.display(),
        records = records.len(),
        songs = songs.len(),
        "loaded song file"
    );
    Ok(songs)
}

/// Schedule views over the `songs` collection.
pub struct SongCatalog<B> {
    client: StoreClient<B>,
    reference_year: i32,
}

impl<B: DocumentStore> SongCatalog<B> {
    pub fn new(client: StoreClient<B>) -> Self {
        Self {
            client,
            reference_year: Local::now().year(),
        }
    }

    /// Year used for legacy `M/D` dates.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn client(&self) -> &StoreClient<B> {
        &self.client
    }

    pub async fn songs(&self) -> Result<Vec<Song>, StoreError> {
        let documents = self.client.list(Collection::Songs.name()).await?;
        Ok(normalize_songs(&documents, self.reference_year))
    }

    pub async fn weekly_view(&self) -> Result<Vec<WeeklySong>, StoreError> {
        Ok(build_weekly_view(&self.songs().await?))
    }

    pub async fn upcoming(&self, limit: usize) -> Result<Vec<Song>, StoreError> {
        self.upcoming_at(limit, Local::now().naive_local()).await
    }

    pub async fn upcoming_at(
        &self,
        limit: usize,
        now: NaiveDateTime,
    ) -> Result<Vec<Song>, StoreError> {
        Ok(select_upcoming_at(&self.songs().await?, limit, now))
    }

    /// Write `songs` into the collection, replacing documents with the same id.
    /// Returns how many were newly created.
    pub async fn seed(&self, songs: &[Song]) -> Result<usize, StoreError> {
        let collection = Collection::Songs.name();
        let mut created = 0;
        for song in songs {
            let document = serde_json::to_value(song)?;
            if self.client.read(collection, &song.id).await?.is_some() {
                debug!(id = %song.id, "replacing song");
                self.client.replace(collection, &song.id, document).await?;
            } else {
                self.client.create(collection, document).await?;
                created += 1;
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryStore, StoreConfig};
    use chrono::NaiveDate;
    use choir_core::SchemaVersion;
    use choir_core::song::{PracticeType, classify_practice_type};
    use serde_json::json;

    fn catalog() -> SongCatalog<InMemoryStore> {
        SongCatalog::new(StoreClient::new(StoreConfig::default(), InMemoryStore::new()))
            .with_reference_year(2024)
    }

    #[tokio::test]
    async fn reads_both_shapes_from_the_collection() {
        let catalog = catalog();
        let client = catalog.client();
        client
            .create("songs", json!({"id": "cur", "title": "현재", "date": "2024-09-29"}))
            .await
            .unwrap();
        client
            .create(
                "songs",
                json!({"id": "old", "title": "예전", "date": "9/22", "hasScore": false}),
            )
            .await
            .unwrap();
        client
            .create("songs", json!({"id": "broken"}))
            .await
            .unwrap();

        let songs = catalog.songs().await.unwrap();
        assert_eq!(songs.len(), 2);

        let view = catalog.weekly_view().await.unwrap();
        let ids: Vec<_> = view.iter().map(|w| w.song.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "cur"]);
    }

    #[tokio::test]
    async fn seed_creates_then_replaces() {
        let catalog = catalog();
        let song = Song::new("s1", "찬양").with_date(NaiveDate::from_ymd_opt(2024, 10, 6).unwrap());
        assert_eq!(catalog.seed(std::slice::from_ref(&song)).await.unwrap(), 1);

        let renamed = Song {
            title: "새 찬양".into(),
            ..song
        };
        assert_eq!(catalog.seed(&[renamed]).await.unwrap(), 0);

        let songs = catalog.songs().await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "새 찬양");
        assert_eq!(songs[0].date, NaiveDate::from_ymd_opt(2024, 10, 6));
    }

    #[tokio::test]
    async fn seeded_legacy_song_keeps_video_precedence() {
        let catalog = catalog();
        let legacy = normalize_songs(
            &[json!({
                "id": "old",
                "title": "예전",
                "date": "9/22",
                "videos": {"합창": "https://youtu.be/abc"},
                "files": {"soprano": "/data/soprano.mp3"}
            })],
            2024,
        );
        assert_eq!(classify_practice_type(&legacy[0]), PracticeType::Video);

        catalog.seed(&legacy).await.unwrap();
        let songs = catalog.songs().await.unwrap();
        assert_eq!(songs[0].schema, SchemaVersion::Legacy);
        assert_eq!(classify_practice_type(&songs[0]), PracticeType::Video);
    }

    #[tokio::test]
    async fn seed_drops_fields_missing_from_the_new_song() {
        let catalog = catalog();
        catalog
            .client()
            .create(
                "songs",
                json!({
                    "id": "s1",
                    "title": "old",
                    "translation": "Old EN",
                    "videos": {"합창": "https://youtu.be/stale"}
                }),
            )
            .await
            .unwrap();

        assert_eq!(catalog.seed(&[Song::new("s1", "new")]).await.unwrap(), 0);

        let stored = catalog.client().read("songs", "s1").await.unwrap().unwrap();
        assert!(stored.get("translation").is_none());
        assert!(stored.get("videos").is_none());

        let songs = catalog.songs().await.unwrap();
        assert_eq!(songs[0].title, "new");
        assert_eq!(songs[0].translation, None);
        assert_eq!(songs[0].schema, SchemaVersion::Current);
        assert!(songs[0].practice.is_empty());
    }

    #[tokio::test]
    async fn upcoming_from_an_empty_collection_is_empty() {
        let now = NaiveDate::from_ymd_opt(2024, 9, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(catalog().upcoming_at(5, now).await.unwrap().is_empty());
        assert!(catalog().weekly_view().await.unwrap().is_empty());
    }
}
