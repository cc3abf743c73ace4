//! Inputs for the score download and practice-file share actions.
//!
//! The UI performs the actual download or share; these helpers only decide the
//! URL, file name and messages to hand it.

use serde::Serialize;

use crate::song::{PracticeItem, Song, is_external_url, part_label, score_url};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScoreDownload {
    /// Remote score, opened in a new window.
    External { url: String },
    /// Score served by the app, saved under `filename`.
    Local { url: String, filename: String },
    Unavailable,
}

impl ScoreDownload {
    pub fn notice(&self, title: &str) -> String {
        match self {
            ScoreDownload::Unavailable => format!("\"{title}\" 악보가 준비되지 않았습니다."),
            _ => format!("\"{title}\" 악보를 다운로드합니다."),
        }
    }
}

pub fn score_download(song: &Song) -> ScoreDownload {
    match score_url(song) {
        None => ScoreDownload::Unavailable,
        Some(url) if is_external_url(Some(url)) => ScoreDownload::External {
            url: url.to_string(),
        },
        Some(url) => ScoreDownload::Local {
            url: url.to_string(),
            filename: format!("{}.pdf", song.title),
        },
    }
}

/// Share-sheet payload for a practice file, with a download fallback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PracticeShare {
    pub title: String,
    pub text: String,
    pub url: String,
    /// Name used when sharing is unavailable and the file is downloaded instead.
    pub filename: String,
}

impl PracticeShare {
    pub fn download_notice(&self, part: &str) -> String {
        format!("\"{}\" 파트 연습 파일을 다운로드합니다.", part_label(part))
    }
}

pub fn practice_share(item: &PracticeItem, part: &str) -> PracticeShare {
    let label = part_label(part);
    PracticeShare {
        title: format!("{label} 파트 연습 파일"),
        text: format!("{label} 파트 연습용 오디오 파일입니다."),
        url: item.url.clone(),
        filename: format!("{label}.{}", item.media_type),
    }
}
