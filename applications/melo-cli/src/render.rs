//! Plain-text rendering of catalog data for the terminal

use chrono::{DateTime, Utc};
use melo_core::format::{duration_label, published_ago, view_count_label};
use melo_core::{DownloadProgressTracker, PlaylistMetadata, SearchHit, Song};
use melo_playback::TransportTimes;

/// `title - artist (album)`
pub fn song_line(song: &Song) -> String {
    if song.album.is_empty() {
        format!("{} - {}", song.title, song.artist)
    } else {
        format!("{} - {} ({})", song.title, song.artist, song.album)
    }
}

/// `[id] title` followed by the description when there is one
pub fn playlist_line(meta: &PlaylistMetadata) -> String {
    if meta.description.is_empty() {
        format!("[{}] {}", meta.id, meta.title)
    } else {
        format!("[{}] {}: {}", meta.id, meta.title, meta.description)
    }
}

/// One external search hit, with counts and dates relative to `now`
pub fn hit_line(hit: &SearchHit, now: DateTime<Utc>) -> String {
    let duration = duration_label(hit.duration_secs());
    match hit {
        SearchHit::Song(song) => format!(
            "song   {} - {} ({}) [{}]",
            song.title, song.artist, song.album, duration
        ),
        SearchHit::Video(video) => format!(
            "video  {} [{}] {} · {} views · {}  id={}",
            video.title,
            duration,
            video.channel_title,
            view_count_label(video.view_count),
            published_ago(video.published_at, now),
            video.id
        ),
    }
}

/// `elapsed [=====     ] remaining`
pub fn transport_line(times: &TransportTimes) -> String {
    const WIDTH: usize = 20;
    let filled = ((times.progress / 100.0) * WIDTH as f64).round() as usize;
    let filled = filled.min(WIDTH);
    format!(
        "{} [{}{}] {}",
        times.elapsed_label,
        "=".repeat(filled),
        " ".repeat(WIDTH - filled),
        times.remaining_label
    )
}

/// `Download 42% · Extract done`
pub fn progress_line(tracker: &DownloadProgressTracker) -> String {
    tracker
        .steps()
        .iter()
        .map(|step| {
            if step.done {
                format!("{} done", step.step)
            } else {
                format!("{} {:.0}%", step.step, step.progress)
            }
        })
        .collect::<Vec<_>>()
        .join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use melo_core::{CatalogSong, DownloadUpdate, StepProgress, VideoResult};
    use std::time::Duration;

    #[test]
    fn song_line_omits_empty_album() {
        let song = Song::new("s1", "So What", "Miles Davis");
        assert_eq!(song_line(&song), "So What - Miles Davis");

        let song = song.with_album("Kind of Blue");
        assert_eq!(song_line(&song), "So What - Miles Davis (Kind of Blue)");
    }

    #[test]
    fn hit_lines_use_labels() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let video = SearchHit::Video(VideoResult {
            id: "abc".to_string(),
            thumbnail: String::new(),
            published_at: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            title: "Live".to_string(),
            view_count: 1_240_000,
            duration: 185,
            channel_title: "Channel".to_string(),
        });
        assert_eq!(
            hit_line(&video, now),
            "video  Live [3:05] Channel · 1.2M views · 2 years ago  id=abc"
        );

        let song = SearchHit::Song(CatalogSong {
            title: "Live".to_string(),
            album: "Album".to_string(),
            artwork: String::new(),
            artist: "Band".to_string(),
            duration: 3600,
        });
        assert_eq!(hit_line(&song, now), "song   Live - Band (Album) [1:00:00]");
    }

    #[test]
    fn transport_line_fills_proportionally() {
        let times = TransportTimes::new(Duration::from_secs(30), Some(Duration::from_secs(60)));
        assert_eq!(transport_line(&times), "0:30 [==========          ] 0:30");

        let unknown = TransportTimes::new(Duration::from_secs(5), None);
        assert_eq!(transport_line(&unknown), "0:05 [                    ] 00:00");
    }

    #[test]
    fn progress_line_marks_done_steps() {
        let mut tracker = DownloadProgressTracker::new();
        tracker.apply(&DownloadUpdate::Steps {
            steps: vec!["Download".to_string(), "Extract".to_string()],
        });
        tracker.apply(&DownloadUpdate::Progress(StepProgress {
            step: "Download".to_string(),
            progress: 100.0,
            done: true,
        }));
        tracker.apply(&DownloadUpdate::Progress(StepProgress {
            step: "Extract".to_string(),
            progress: 42.4,
            done: false,
        }));
        assert_eq!(progress_line(&tracker), "Download done · Extract 42%");
    }
}
