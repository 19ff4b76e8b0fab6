use serde::Deserialize;
use services::MediaEvent;

/// One poll of the media element, as returned by the monitor script.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct MediaSnapshot {
    pub position: f64,
    pub duration: f64,
    pub paused: bool,
    pub ended: bool,
    pub waiting: bool,
}

/// Turns a polled snapshot into the discrete events the playback
/// controller consumes. `had_metadata` suppresses repeat
/// `MetadataLoaded` events once the duration is known.
#[must_use]
pub fn snapshot_events(snapshot: &MediaSnapshot, had_metadata: bool) -> Vec<MediaEvent> {
    let mut events = Vec::new();
    if !had_metadata && snapshot.duration.is_finite() && snapshot.duration > 0.0 {
        events.push(MediaEvent::MetadataLoaded {
            duration: snapshot.duration,
        });
    }
    events.push(MediaEvent::TimeUpdate {
        position: snapshot.position,
    });
    if snapshot.ended {
        events.push(MediaEvent::Ended);
    } else if snapshot.waiting {
        events.push(MediaEvent::Waiting);
    } else if !snapshot.paused {
        events.push(MediaEvent::Playing);
    }
    events
}

/// `m:ss` label; junk and negative inputs render as `0:00`.
#[must_use]
pub fn format_media_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_owned();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `elapsed / total` label, with `0:00` standing in until the duration
/// is known.
#[must_use]
pub fn time_display(position: f64, duration: Option<f64>) -> String {
    format!(
        "{} / {}",
        format_media_time(position),
        format_media_time(duration.unwrap_or(0.0))
    )
}
