//! Song records, schedule dates and the weekly view for the choir schedule.
//!
//! Everything here is pure: functions take records by reference and return new
//! values. Loading records from a store lives in `choir_store`.

use thiserror::Error;

pub mod adapter;
pub mod dates;
pub mod schedule;
pub mod share;
pub mod song;

pub use adapter::{is_valid_legacy_song, is_valid_song, normalize_song, normalize_songs};
pub use dates::SundayPolicy;
pub use schedule::{WeeklySong, build_weekly_view, select_upcoming, select_upcoming_at};
pub use song::{
    PracticeItem, PracticeKind, PracticeMap, PracticeType, SchemaVersion, Score, Song, SongKind,
    VoicePart,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid song record: {0}")]
    InvalidRecord(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
}
