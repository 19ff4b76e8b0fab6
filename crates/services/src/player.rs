//! Playback state and the command surface toward the media element.
//!
//! The controller owns what the app believes about playback (playing,
//! volume, rate, playhead) and turns user intent into transport
//! commands. The actual media element reports back through
//! [`MediaEvent`]; the controller never blocks on it.

use std::sync::Arc;

use academy_core::model::{PlaybackError, PlaybackRate, Progress, Volume};

use crate::resume::resume_start_time;

/// Fire-and-forget command sink for a media element.
///
/// The desktop UI implements this over a script bridge; tests record the
/// calls. Implementations must not block.
pub trait MediaTransport: Send + Sync {
    fn load(&self, url: &str);
    fn play(&self);
    fn pause(&self);
    /// Seek to an absolute position in seconds.
    fn seek(&self, seconds: f64);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
    fn set_rate(&self, rate: f64);
}

/// What the media element reports back.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum MediaEvent {
    /// Duration is known; seeking by fraction becomes possible.
    MetadataLoaded { duration: f64 },
    TimeUpdate { position: f64 },
    Playing,
    Waiting,
    Ended,
}

/// Playback state machine for a single media element.
pub struct PlaybackController {
    transport: Arc<dyn MediaTransport>,
    source: Option<String>,
    playing: bool,
    buffering: bool,
    volume: Volume,
    muted: bool,
    rate: PlaybackRate,
    position: f64,
    duration: Option<f64>,
    /// Seek requested before the duration was known, as a fraction.
    pending_seek: Option<f64>,
}

impl PlaybackController {
    #[must_use]
    pub fn new(transport: Arc<dyn MediaTransport>) -> Self {
        Self {
            transport,
            source: None,
            playing: false,
            buffering: false,
            volume: Volume::FULL,
            muted: false,
            rate: PlaybackRate::default(),
            position: 0.0,
            duration: None,
            pending_seek: None,
        }
    }

    /// Attaches a media source and resets per-source state.
    pub fn load(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.transport.load(&url);
        self.source = Some(url);
        self.playing = false;
        self.buffering = false;
        self.position = 0.0;
        self.duration = None;
        self.pending_seek = None;
    }

    /// Toggles between play and pause. Inert until a source is attached.
    pub fn toggle_play(&mut self) {
        if self.source.is_none() {
            return;
        }
        if self.playing {
            self.transport.pause();
        } else {
            self.transport.play();
        }
        self.playing = !self.playing;
    }

    /// Seeks to a fraction of the duration, clamped to `[0, 1]`.
    ///
    /// Before the duration is known the request is remembered and
    /// applied once metadata arrives. Inert until a source is attached.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if self.source.is_none() || !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        match self.duration {
            Some(duration) if duration > 0.0 => {
                let seconds = fraction * duration;
                self.transport.seek(seconds);
                self.position = seconds;
            }
            _ => self.pending_seek = Some(fraction),
        }
    }

    /// Sets the volume and couples mute to it: zero mutes, nonzero
    /// unmutes.
    pub fn set_volume(&mut self, value: f64) {
        self.volume = Volume::new(value);
        self.muted = self.volume.is_silent();
        self.transport.set_volume(self.volume.value());
        self.transport.set_muted(self.muted);
    }

    /// Flips mute without touching the volume level.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.transport.set_muted(self.muted);
    }

    /// Applies a playback rate given as a raw multiplier.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::InvalidRate` when the value is not one of
    /// the supported steps; the transport is left untouched.
    pub fn set_rate_value(&mut self, value: f64) -> Result<(), PlaybackError> {
        let rate = PlaybackRate::try_from_f64(value)?;
        self.rate = rate;
        self.transport.set_rate(rate.as_f64());
        Ok(())
    }

    /// Seeks to where `saved` progress resumes and starts playback.
    ///
    /// A completed course restarts from the beginning. When the duration
    /// is not known yet the target is deferred like any other seek.
    pub fn resume_from(&mut self, saved: Progress) {
        if self.source.is_none() {
            return;
        }
        match self.duration {
            Some(duration) if duration > 0.0 => {
                let seconds = resume_start_time(saved, duration);
                self.transport.seek(seconds);
                self.position = seconds;
            }
            _ => {
                let fraction = if saved.is_complete() {
                    0.0
                } else {
                    saved.as_fraction()
                };
                self.pending_seek = Some(fraction);
            }
        }
        self.transport.play();
        self.playing = true;
    }

    /// Folds a media element report into controller state.
    pub fn on_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded { duration } => {
                self.duration = (duration.is_finite() && duration > 0.0).then_some(duration);
                if let Some(duration) = self.duration {
                    if let Some(fraction) = self.pending_seek.take() {
                        let seconds = fraction * duration;
                        self.transport.seek(seconds);
                        self.position = seconds;
                    }
                }
            }
            MediaEvent::TimeUpdate { position } => {
                if position.is_finite() && position >= 0.0 {
                    self.position = position;
                }
            }
            MediaEvent::Playing => {
                self.playing = true;
                self.buffering = false;
            }
            MediaEvent::Waiting => self.buffering = true,
            MediaEvent::Ended => self.playing = false,
        }
    }

    /// Elapsed fraction of the media, `0.0` while the duration is
    /// unknown or zero.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        match self.duration {
            Some(duration) if duration > 0.0 => (self.position / duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    // Accessors
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    #[must_use]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    #[must_use]
    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    #[must_use]
    pub fn position_secs(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration
    }
}
