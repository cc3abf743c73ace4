//! Maps raw song documents of either external shape onto [`Song`].
//!
//! Two shapes exist in stored data:
//! - current: `date` is ISO or `null`, nested `score { url, type }` and
//!   `practice { <part>: { type, url } }`
//! - legacy: `date` is `M/D` or `미정`, flat `hasScore` / `scoreUrl`, and two
//!   part-keyed URL mappings `videos` and `files`
//!
//! Both end up in the same [`Song`]; the originating shape is kept in
//! [`Song::schema`] because practice classification differs between them.
//! A document carrying an explicit `schemaVersion` (as written by
//! serializing a [`Song`]) is taken at its word.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::CoreError;
use crate::dates::{self, UNSCHEDULED};
use crate::song::{PracticeItem, PracticeMap, SchemaVersion, Score, Song, SongKind, VoicePart};

const LEGACY_FIELDS: [&str; 5] = ["hasScore", "scoreUrl", "hasAudio", "videos", "files"];
const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "m4a", "wav", "ogg", "aac", "flac"];

/// `id` and `title` are non-empty strings.
pub fn is_valid_song(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| {
        non_empty_str(obj.get("id")).is_some() && non_empty_str(obj.get("title")).is_some()
    })
}

/// Legacy records additionally require a non-empty `date` string.
pub fn is_valid_legacy_song(value: &Value) -> bool {
    is_valid_song(value)
        && value
            .as_object()
            .is_some_and(|obj| non_empty_str(obj.get("date")).is_some())
}

/// Normalize one raw record. `reference_year` anchors legacy `M/D` dates.
pub fn normalize_song(value: &Value, reference_year: i32) -> Result<Song, CoreError> {
    let Some(obj) = value.as_object() else {
        return Err(CoreError::InvalidRecord(format!(
            "expected an object, got {value}"
        )));
    };
    let schema = detect_schema(obj);

    let id = obj
        .get("id")
        .and_then(id_string)
        .or_else(|| obj.get("docId").and_then(id_string))
        .ok_or_else(|| CoreError::InvalidRecord("missing id".into()))?;
    let title = non_empty_str(obj.get("title"))
        .ok_or_else(|| CoreError::InvalidRecord(format!("song {id} has no title")))?
        .to_string();
    let date = parse_song_date(obj.get("date"), reference_year)?;

    let kind = match obj.get("type").and_then(Value::as_str) {
        Some("cantata") => SongKind::Cantata,
        _ => SongKind::Song,
    };

    let voice_parts = match obj.get("voiceParts").and_then(Value::as_array) {
        Some(parts) => {
            let mut parsed: Vec<VoicePart> = Vec::with_capacity(parts.len());
            for part in parts.iter().filter_map(Value::as_str) {
                match VoicePart::parse(part) {
                    Some(p) if !parsed.contains(&p) => parsed.push(p),
                    Some(_) => {}
                    None => debug!(song = %id, part, "ignoring unknown voice part"),
                }
            }
            parsed
        }
        None if schema == SchemaVersion::Legacy => VoicePart::SECTIONS.to_vec(),
        None => Vec::new(),
    };

    let score = match obj.get("score") {
        Some(Value::Object(score)) => Some(Score {
            url: opt_string(score.get("url")),
            media_type: opt_string(score.get("type")),
        }),
        _ => non_empty_str(obj.get("scoreUrl")).map(|url| Score {
            url: Some(url.to_string()),
            media_type: Some("pdf".into()),
        }),
    };

    Ok(Song {
        practice: collect_practice(obj, &id),
        id,
        title,
        date,
        composer: opt_string(obj.get("composer")),
        translation: opt_string(obj.get("translation")),
        kind,
        voice_parts,
        score,
        schema,
    })
}

/// Normalize a batch, skipping (and logging) records that cannot be read.
pub fn normalize_songs(values: &[Value], reference_year: i32) -> Vec<Song> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match normalize_song(value, reference_year) {
            Ok(song) => Some(song),
            Err(e) => {
                warn!(index, error = %e, "skipping song record");
                None
            }
        })
        .collect()
}

fn detect_schema(obj: &Map<String, Value>) -> SchemaVersion {
    match obj.get("schemaVersion").and_then(Value::as_str) {
        Some("legacy") => return SchemaVersion::Legacy,
        Some("current") => return SchemaVersion::Current,
        _ => {}
    }
    let legacy_date = obj
        .get("date")
        .and_then(Value::as_str)
        .is_some_and(|d| d.trim() == UNSCHEDULED || d.contains('/'));
    if legacy_date || LEGACY_FIELDS.iter().any(|f| obj.contains_key(*f)) {
        SchemaVersion::Legacy
    } else {
        SchemaVersion::Current
    }
}

fn parse_song_date(
    value: Option<&Value>,
    reference_year: i32,
) -> Result<Option<chrono::NaiveDate>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || s == UNSCHEDULED {
                return Ok(None);
            }
            dates::parse_iso(s)
                .or_else(|| dates::parse_display_date_in(s, reference_year))
                .map(Some)
                .ok_or_else(|| CoreError::InvalidDate(s.to_string()))
        }
        Some(other) => Err(CoreError::InvalidDate(other.to_string())),
    }
}

fn collect_practice(obj: &Map<String, Value>, id: &str) -> PracticeMap {
    let mut practice = PracticeMap::new();

    // every key counts as material, even without a usable type or url
    if let Some(Value::Object(entries)) = obj.get("practice") {
        for (part, item) in entries {
            let media_type = non_empty_str(item.get("type")).unwrap_or_default();
            let url = non_empty_str(item.get("url")).unwrap_or_default();
            if media_type.is_empty() || url.is_empty() {
                debug!(song = %id, part = %part, "incomplete practice entry");
            }
            practice.insert(part.clone(), PracticeItem::new(media_type, url));
        }
    }

    for (part, url) in url_mapping(obj.get("videos")) {
        practice
            .entry(part)
            .or_insert_with(|| PracticeItem::new("youtube", url));
    }
    for (part, url) in url_mapping(obj.get("files")) {
        if practice.contains_key(&part) {
            warn!(song = %id, part = %part, "practice file shadowed by video for the same part");
            continue;
        }
        let media_type = audio_extension(&url).unwrap_or("audio");
        practice.insert(part, PracticeItem::new(media_type, url));
    }

    practice
}

fn url_mapping(value: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|(part, url)| {
            url.as_str()
                .filter(|u| !u.is_empty())
                .map(|u| (part.clone(), u.to_string()))
        })
        .collect()
}

fn audio_extension(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let (_, ext) = path.rsplit_once('.')?;
    AUDIO_EXTENSIONS
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(ext))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn opt_string(value: Option<&Value>) -> Option<String> {
    non_empty_str(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::{PracticeType, classify_practice_type, has_practice_material, has_score};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn is_valid_song_checks_id_and_title() {
        assert!(is_valid_song(&json!({"id": "test-id", "title": "Test Song"})));
        assert!(!is_valid_song(&json!({"title": "Test Song"})));
        assert!(!is_valid_song(&json!({"id": "test-id"})));
        assert!(!is_valid_song(&json!({"id": 1, "title": "Test Song"})));
        assert!(!is_valid_song(&json!({"id": "test-id", "title": 123})));
        assert!(!is_valid_song(&json!({"id": "", "title": "x"})));
        assert!(!is_valid_song(&Value::Null));
    }

    #[test]
    fn legacy_validity_requires_date() {
        assert!(!is_valid_legacy_song(&json!({"id": "a", "title": "b"})));
        assert!(is_valid_legacy_song(&json!({"id": "a", "title": "b", "date": "미정"})));
        assert!(!is_valid_legacy_song(&json!({"id": "a", "title": "b", "date": ""})));
    }

    #[test]
    fn normalizes_current_record() {
        let song = normalize_song(
            &json!({
                "id": "2024-09-22-강하고담대하라",
                "date": "2024-09-22",
                "title": "강하고 담대하라",
                "composer": "김영광",
                "voiceParts": ["soprano", "alto", "tenor", "bass"],
                "score": {"url": "https://example.com/song1.pdf", "type": "pdf"},
                "practice": {
                    "합창": {"type": "youtube", "url": "https://youtu.be/qSKgDGN5FBM"},
                    "soprano": {"type": "youtube", "url": "https://youtu.be/Fnvx0EC14v0"}
                }
            }),
            2024,
        )
        .expect("normalize");

        assert_eq!(song.schema, SchemaVersion::Current);
        assert_eq!(song.date, NaiveDate::from_ymd_opt(2024, 9, 22));
        assert_eq!(song.composer.as_deref(), Some("김영광"));
        assert_eq!(song.practice.len(), 2);
        assert!(has_score(&song));
        assert_eq!(classify_practice_type(&song), PracticeType::Video);
    }

    #[test]
    fn normalizes_legacy_record() {
        let song = normalize_song(
            &json!({
                "docId": 17,
                "date": "9/29",
                "title": "새 노래로 찬양",
                "hasScore": true,
                "scoreUrl": "/data/score.pdf",
                "videos": {"합창": "https://youtu.be/abc"},
                "files": {"soprano": "/data/soprano.mp3", "alto": "/data/alto"}
            }),
            2024,
        )
        .expect("normalize");

        assert_eq!(song.schema, SchemaVersion::Legacy);
        assert_eq!(song.id, "17");
        assert_eq!(song.date, NaiveDate::from_ymd_opt(2024, 9, 29));
        assert_eq!(song.voice_parts.len(), 4);
        assert!(has_score(&song));
        assert_eq!(song.practice["합창"].media_type, "youtube");
        assert_eq!(song.practice["soprano"].media_type, "mp3");
        assert_eq!(song.practice["alto"].media_type, "audio");
        assert_eq!(classify_practice_type(&song), PracticeType::Video);
    }

    #[test]
    fn legacy_has_score_flag_alone_is_not_a_score() {
        let song = normalize_song(
            &json!({"id": "a", "title": "b", "date": "미정", "hasScore": true, "scoreUrl": null}),
            2024,
        )
        .expect("normalize");
        assert!(!song.is_scheduled());
        assert!(!has_score(&song));
    }

    #[test]
    fn video_wins_legacy_key_collision() {
        let song = normalize_song(
            &json!({
                "id": "a", "title": "b",
                "videos": {"soprano": "https://youtu.be/x"},
                "files": {"soprano": "/data/soprano.mp3"}
            }),
            2024,
        )
        .expect("normalize");
        assert_eq!(song.practice.len(), 1);
        assert_eq!(song.practice["soprano"].media_type, "youtube");
    }

    #[test]
    fn rejects_missing_fields_and_bad_dates() {
        assert!(matches!(
            normalize_song(&json!({"title": "x"}), 2024),
            Err(CoreError::InvalidRecord(_))
        ));
        assert!(matches!(
            normalize_song(&json!({"id": "a"}), 2024),
            Err(CoreError::InvalidRecord(_))
        ));
        assert_eq!(
            normalize_song(&json!({"id": "a", "title": "b", "date": "soon"}), 2024),
            Err(CoreError::InvalidDate("soon".into()))
        );
        assert!(normalize_song(&json!("song"), 2024).is_err());
    }

    #[test]
    fn normalize_songs_skips_bad_records() {
        let songs = normalize_songs(
            &[
                json!({"id": "a", "title": "A", "date": "2024-09-22"}),
                json!(null),
                json!({"id": "b"}),
                json!({"id": "c", "title": "C"}),
            ],
            2024,
        );
        let ids: Vec<_> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn keeps_incomplete_practice_entries_and_drops_unknown_parts() {
        let song = normalize_song(
            &json!({
                "id": "a", "title": "b",
                "voiceParts": ["soprano", "piano", "소프라노"],
                "practice": {"soprano": {"type": "mp3"}, "alto": {"type": "mp3", "url": "/a.mp3"}}
            }),
            2024,
        )
        .expect("normalize");
        assert_eq!(song.voice_parts, vec![VoicePart::Soprano]);
        assert_eq!(song.practice.keys().collect::<Vec<_>>(), vec!["alto", "soprano"]);
        assert_eq!(song.practice["soprano"].url, "");
    }

    #[test]
    fn practice_entry_with_empty_url_still_counts() {
        let song = normalize_song(
            &json!({"id": "a", "title": "b", "practice": {"soprano": {"type": "mp3", "url": ""}}}),
            2024,
        )
        .expect("normalize");
        assert!(has_practice_material(&song));
        assert_eq!(classify_practice_type(&song), PracticeType::Audio);

        let untyped = normalize_song(
            &json!({"id": "a", "title": "b", "practice": {"alto": {}}}),
            2024,
        )
        .expect("normalize");
        assert!(has_practice_material(&untyped));
        assert_eq!(classify_practice_type(&untyped), PracticeType::None);
    }

    #[test]
    fn explicit_schema_version_wins_over_shape() {
        let song = normalize_song(
            &json!({
                "id": "a", "title": "b", "date": "2024-09-22", "schemaVersion": "legacy",
                "practice": {
                    "합창": {"type": "youtube", "url": "https://youtu.be/x"},
                    "soprano": {"type": "mp3", "url": "/s.mp3"}
                }
            }),
            2024,
        )
        .expect("normalize");
        assert_eq!(song.schema, SchemaVersion::Legacy);
        assert_eq!(classify_practice_type(&song), PracticeType::Video);
    }
}
