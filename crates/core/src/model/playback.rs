use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur while driving playback.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlaybackError {
    #[error("unsupported playback rate: {0}")]
    InvalidRate(f64),
}

//
// ─── PLAYBACK RATE ─────────────────────────────────────────────────────────────
//

/// The playback speeds the player offers.
///
/// The set is closed: anything outside these four values is rejected before
/// it ever reaches the media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRate {
    Half,
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    /// Every selectable rate, in menu order.
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    /// Converts a raw multiplier to a `PlaybackRate`.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::InvalidRate` for any value outside the
    /// supported set. The four supported multipliers are exactly
    /// representable, so equality comparison is sound here.
    pub fn try_from_f64(value: f64) -> Result<Self, PlaybackError> {
        if value == 0.5 {
            Ok(Self::Half)
        } else if value == 1.0 {
            Ok(Self::Normal)
        } else if value == 1.5 {
            Ok(Self::OneAndHalf)
        } else if value == 2.0 {
            Ok(Self::Double)
        } else {
            Err(PlaybackError::InvalidRate(value))
        }
    }

    /// The multiplier handed to the media element.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        PlaybackRate::Normal
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackRate::Half => write!(f, "0.5x"),
            PlaybackRate::Normal => write!(f, "1x"),
            PlaybackRate::OneAndHalf => write!(f, "1.5x"),
            PlaybackRate::Double => write!(f, "2x"),
        }
    }
}

//
// ─── VOLUME ────────────────────────────────────────────────────────────────────
//

/// Playback volume in `[0, 1]`.
///
/// Slider input clamps instead of erroring; a volume of exactly zero is what
/// couples the mute toggle to the slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(f64);

impl Volume {
    pub const FULL: Volume = Volume(1.0);
    pub const SILENT: Volume = Volume(0.0);

    #[must_use]
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::SILENT;
        }
        Self(value.clamp(0.0, 1.0))
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume::FULL
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
