//! Derived schedule views over a list of songs.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::dates;
use crate::song::Song;

pub const THIS_WEEK_LABEL: &str = "이번 주 찬양곡";
pub const NEXT_WEEK_LABEL: &str = "다음 주 찬양곡";

/// A scheduled song with its display date and week label.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySong {
    #[serde(flatten)]
    pub song: Song,
    pub display_date: String,
    pub week_label: &'static str,
}

fn schedule_key(song: &Song) -> (bool, NaiveDate) {
    (
        song.date.is_none(),
        song.date.unwrap_or_else(dates::unscheduled_sort_date),
    )
}

/// Songs ordered by date with unscheduled songs last; ties keep input order.
pub fn sort_by_schedule(songs: &[Song]) -> Vec<&Song> {
    let mut sorted: Vec<&Song> = songs.iter().collect();
    sorted.sort_by_key(|song| schedule_key(song));
    sorted
}

/// Dated songs in ascending date order, the first labelled as this week's.
pub fn build_weekly_view(songs: &[Song]) -> Vec<WeeklySong> {
    sort_by_schedule(songs)
        .into_iter()
        .filter(|song| song.is_scheduled())
        .enumerate()
        .map(|(index, song)| WeeklySong {
            display_date: dates::format_display(song.iso_date().as_deref()),
            week_label: if index == 0 {
                THIS_WEEK_LABEL
            } else {
                NEXT_WEEK_LABEL
            },
            song: song.clone(),
        })
        .collect()
}

/// At most `limit` songs that are still ahead of today or not yet scheduled.
pub fn select_upcoming(songs: &[Song], limit: usize) -> Vec<Song> {
    select_upcoming_at(songs, limit, Local::now().naive_local())
}

pub fn select_upcoming_at(songs: &[Song], limit: usize, now: NaiveDateTime) -> Vec<Song> {
    sort_by_schedule(songs)
        .into_iter()
        .filter(|song| match song.date {
            Some(date) => !dates::is_past_on(date, now),
            None => true,
        })
        .take(limit)
        .cloned()
        .collect()
}
