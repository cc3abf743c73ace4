//! Canonical song record and the per-song predicates used by the schedule views.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates;

/// Practice material keyed by voice part (`soprano`, `합창`, ...).
pub type PracticeMap = BTreeMap<String, PracticeItem>;

/// English part keys and their Korean display labels.
pub const VOICE_PART_LABELS: [(&str, &str); 5] = [
    ("soprano", "소프라노"),
    ("alto", "앨토"),
    ("tenor", "테너"),
    ("bass", "베이스"),
    ("합창", "합창"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VoicePart {
    Soprano,
    Alto,
    Tenor,
    Bass,
    /// Whole-choir (unison) material.
    Choir,
}

impl VoicePart {
    /// The four section parts, without the whole-choir label.
    pub const SECTIONS: [VoicePart; 4] = [
        VoicePart::Soprano,
        VoicePart::Alto,
        VoicePart::Tenor,
        VoicePart::Bass,
    ];

    pub fn key(self) -> &'static str {
        match self {
            VoicePart::Soprano => "soprano",
            VoicePart::Alto => "alto",
            VoicePart::Tenor => "tenor",
            VoicePart::Bass => "bass",
            VoicePart::Choir => "합창",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoicePart::Soprano => "소프라노",
            VoicePart::Alto => "앨토",
            VoicePart::Tenor => "테너",
            VoicePart::Bass => "베이스",
            VoicePart::Choir => "합창",
        }
    }

    /// Accepts an English key (any case) or a Korean label.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        [
            VoicePart::Soprano,
            VoicePart::Alto,
            VoicePart::Tenor,
            VoicePart::Bass,
            VoicePart::Choir,
        ]
        .into_iter()
        .find(|part| part.key().eq_ignore_ascii_case(s) || part.label() == s)
    }
}

impl TryFrom<String> for VoicePart {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VoicePart::parse(&value).ok_or_else(|| format!("unknown voice part: {value}"))
    }
}

impl From<VoicePart> for String {
    fn from(part: VoicePart) -> Self {
        part.key().to_string()
    }
}

/// Korean label for a practice key, or the key itself when it is not a known part.
pub fn part_label(key: &str) -> &str {
    VoicePart::parse(key).map(VoicePart::label).unwrap_or(key)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongKind {
    #[default]
    Song,
    Cantata,
}

/// Which external record shape a song was read from.
///
/// Stored as `schemaVersion` so a legacy song written back to a store keeps its
/// practice classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Nested `score` / `practice` objects.
    #[default]
    Current,
    /// Flat `hasScore` / `scoreUrl` fields and separate video and file mappings.
    Legacy,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
}

impl Score {
    pub fn resolved_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PracticeKind {
    Video,
    Audio,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeItem {
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub url: String,
}

impl PracticeItem {
    pub fn new(media_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            url: url.into(),
        }
    }

    /// `None` for media types that are neither streamed video nor audio files.
    pub fn kind(&self) -> Option<PracticeKind> {
        match self.media_type.to_ascii_lowercase().as_str() {
            "youtube" | "video" => Some(PracticeKind::Video),
            "mp3" | "audio" => Some(PracticeKind::Audio),
            _ => None,
        }
    }
}

/// How a song's practice material is made up.
///
/// Legacy records never classify as `Mixed`: any video wins over audio files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PracticeType {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "youtube")]
    Video,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "mixed")]
    Mixed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    /// `None` means the song is not scheduled yet.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: SongKind,
    #[serde(default)]
    pub voice_parts: Vec<VoicePart>,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub practice: PracticeMap,
    #[serde(default, rename = "schemaVersion")]
    pub schema: SchemaVersion,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<PracticeMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PracticeMap>::deserialize(deserializer)?.unwrap_or_default())
}

impl Song {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: None,
            composer: None,
            translation: None,
            kind: SongKind::Song,
            voice_parts: Vec::new(),
            score: None,
            practice: PracticeMap::new(),
            schema: SchemaVersion::Current,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn iso_date(&self) -> Option<String> {
        self.date.as_ref().map(dates::format_date_iso)
    }

    pub fn is_scheduled(&self) -> bool {
        self.date.is_some()
    }
}

pub fn score_url(song: &Song) -> Option<&str> {
    song.score.as_ref().and_then(Score::resolved_url)
}

/// True iff a non-empty score URL is present.
pub fn has_score(song: &Song) -> bool {
    score_url(song).is_some()
}

pub fn has_practice_material(song: &Song) -> bool {
    !song.practice.is_empty()
}

/// Entries of `material` whose media type belongs to `kind`.
pub fn filter_by_kind(material: Option<&PracticeMap>, kind: PracticeKind) -> PracticeMap {
    let Some(material) = material else {
        return PracticeMap::new();
    };
    material
        .iter()
        .filter(|(_, item)| item.kind() == Some(kind))
        .map(|(part, item)| (part.clone(), item.clone()))
        .collect()
}

pub fn classify_practice_type(song: &Song) -> PracticeType {
    let has_videos = song
        .practice
        .values()
        .any(|item| item.kind() == Some(PracticeKind::Video));
    let has_files = song
        .practice
        .values()
        .any(|item| item.kind() == Some(PracticeKind::Audio));

    match (song.schema, has_videos, has_files) {
        (_, false, false) => PracticeType::None,
        (SchemaVersion::Current, true, true) => PracticeType::Mixed,
        (_, true, _) => PracticeType::Video,
        (_, false, true) => PracticeType::Audio,
    }
}

/// Remote iff the URL starts with an `http://` or `https://` scheme.
pub fn is_external_url(url: Option<&str>) -> bool {
    let Some(url) = url else {
        return false;
    };
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn practice(entries: &[(&str, &str)]) -> PracticeMap {
        entries
            .iter()
            .map(|(part, kind)| (part.to_string(), PracticeItem::new(*kind, "url")))
            .collect()
    }

    fn song_with_practice(schema: SchemaVersion, entries: &[(&str, &str)]) -> Song {
        let mut song = Song::new("s", "Song");
        song.schema = schema;
        song.practice = practice(entries);
        song
    }

    #[test]
    fn voice_part_labels() {
        assert_eq!(VoicePart::Soprano.label(), "소프라노");
        assert_eq!(VoicePart::Alto.label(), "앨토");
        assert_eq!(VoicePart::Tenor.label(), "테너");
        assert_eq!(VoicePart::Bass.label(), "베이스");
        assert_eq!(part_label("합창"), "합창");
        assert_eq!(part_label("piano"), "piano");
        for (key, label) in VOICE_PART_LABELS {
            assert_eq!(part_label(key), label);
        }
    }

    #[test]
    fn voice_part_parses_keys_and_labels() {
        assert_eq!(VoicePart::parse("Soprano"), Some(VoicePart::Soprano));
        assert_eq!(VoicePart::parse("베이스"), Some(VoicePart::Bass));
        assert_eq!(VoicePart::parse("piano"), None);
    }

    #[test]
    fn has_score_requires_a_url() {
        let mut song = Song::new("a", "b");
        assert!(!has_score(&song));

        song.score = Some(Score::default());
        assert!(!has_score(&song));

        song.score = Some(Score {
            url: Some(String::new()),
            media_type: Some("pdf".into()),
        });
        assert!(!has_score(&song));

        song.score = Some(Score {
            url: Some("x".into()),
            media_type: None,
        });
        assert!(has_score(&song));
    }

    #[test]
    fn has_practice_material_requires_an_entry() {
        assert!(!has_practice_material(&Song::new("a", "b")));
        let song = song_with_practice(SchemaVersion::Current, &[("soprano", "mp3")]);
        assert!(has_practice_material(&song));
    }

    #[test]
    fn filter_by_kind_splits_video_and_audio() {
        let material = practice(&[("합창", "youtube"), ("soprano", "mp3"), ("alto", "audio")]);

        let videos = filter_by_kind(Some(&material), PracticeKind::Video);
        assert_eq!(videos.len(), 1);
        assert!(videos.contains_key("합창"));

        let files = filter_by_kind(Some(&material), PracticeKind::Audio);
        assert_eq!(files.len(), 2);
        assert!(!files.contains_key("합창"));

        assert!(filter_by_kind(None, PracticeKind::Audio).is_empty());
    }

    #[test]
    fn classify_current_schema_reports_mixed() {
        let cur = SchemaVersion::Current;
        assert_eq!(classify_practice_type(&song_with_practice(cur, &[])), PracticeType::None);
        assert_eq!(
            classify_practice_type(&song_with_practice(cur, &[("합창", "youtube")])),
            PracticeType::Video
        );
        assert_eq!(
            classify_practice_type(&song_with_practice(cur, &[("soprano", "mp3")])),
            PracticeType::Audio
        );
        assert_eq!(
            classify_practice_type(&song_with_practice(
                cur,
                &[("합창", "youtube"), ("soprano", "mp3")]
            )),
            PracticeType::Mixed
        );
        assert_eq!(
            classify_practice_type(&song_with_practice(cur, &[("soprano", "pdf")])),
            PracticeType::None
        );
    }

    #[test]
    fn classify_legacy_schema_prefers_video() {
        let legacy = SchemaVersion::Legacy;
        assert_eq!(
            classify_practice_type(&song_with_practice(
                legacy,
                &[("합창", "youtube"), ("soprano", "mp3")]
            )),
            PracticeType::Video
        );
        assert_eq!(
            classify_practice_type(&song_with_practice(legacy, &[("soprano", "mp3")])),
            PracticeType::Audio
        );
        assert_eq!(
            classify_practice_type(&song_with_practice(legacy, &[])),
            PracticeType::None
        );
    }

    #[test]
    fn external_urls_need_an_http_scheme() {
        assert!(is_external_url(Some("https://x")));
        assert!(is_external_url(Some("http://example.com/file.pdf")));
        assert!(is_external_url(Some("HTTPS://EXAMPLE.COM")));
        assert!(!is_external_url(Some("/data/x")));
        assert!(!is_external_url(Some("./local/file.pdf")));
        assert!(!is_external_url(Some("")));
        assert!(!is_external_url(None));
    }

    #[test]
    fn song_deserializes_current_shape_with_nulls() {
        let song: Song = serde_json::from_value(json!({
            "id": "2024-00-00-주님의은혜",
            "date": null,
            "title": "주님의 은혜",
            "composer": null,
            "voiceParts": ["soprano", "alto", "tenor", "bass"],
            "score": null,
            "practice": null
        }))
        .expect("deserialize song");
        assert!(!song.is_scheduled());
        assert!(song.practice.is_empty());
        assert_eq!(song.voice_parts, VoicePart::SECTIONS.to_vec());
        assert_eq!(song.schema, SchemaVersion::Current);
    }

    #[test]
    fn schema_version_survives_serialization() {
        let mut song = Song::new("old", "예전 찬양");
        song.schema = SchemaVersion::Legacy;
        let value = serde_json::to_value(&song).expect("serialize");
        assert_eq!(value["schemaVersion"], "legacy");

        let back: Song = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back.schema, SchemaVersion::Legacy);
    }

    #[test]
    fn practice_type_serializes_to_labels() {
        assert_eq!(json!(PracticeType::Video), json!("youtube"));
        assert_eq!(json!(PracticeType::Mixed), json!("mixed"));
    }
}
