//! Mapping saved progress onto a playback start position.

use academy_core::model::Progress;

/// Where playback should start, in seconds, for a course with `saved`
/// progress and a media duration of `duration_secs`.
///
/// A finished course starts over from zero rather than opening on the
/// final frame. Anything else resumes at the saved fraction of the
/// duration. Durations that are missing or nonsensical resolve to zero.
#[must_use]
pub fn resume_start_time(saved: Progress, duration_secs: f64) -> f64 {
    if saved.is_complete() {
        return 0.0;
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0.0;
    }
    saved.as_fraction() * duration_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_course_restarts_from_zero() {
        assert_eq!(resume_start_time(Progress::COMPLETE, 640.0), 0.0);
    }

    #[test]
    fn partial_progress_resumes_at_fraction_of_duration() {
        let saved = Progress::new(50).unwrap();
        assert!((resume_start_time(saved, 200.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn fresh_course_starts_at_zero() {
        assert_eq!(resume_start_time(Progress::ZERO, 640.0), 0.0);
    }

    #[test]
    fn junk_duration_resolves_to_zero() {
        let saved = Progress::new(40).unwrap();
        assert_eq!(resume_start_time(saved, 0.0), 0.0);
        assert_eq!(resume_start_time(saved, -3.0), 0.0);
        assert_eq!(resume_start_time(saved, f64::NAN), 0.0);
    }
}
