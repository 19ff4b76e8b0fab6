use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaRefError {
    #[error("media reference cannot be empty")]
    Empty,

    #[error("media URL is not valid")]
    InvalidUrl,
}

//
// ─── MEDIA REFERENCE ───────────────────────────────────────────────────────────
//

/// Where a piece of media lives: a remote URL or a local file.
///
/// Playback hands this to the media element as-is; the domain never opens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    FilePath(PathBuf),
    Url(Url),
}

impl MediaRef {
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, MediaRefError> {
        let p = path.into();
        if p.as_os_str().is_empty() {
            return Err(MediaRefError::Empty);
        }
        Ok(MediaRef::FilePath(p))
    }

    pub fn from_url(url: impl AsRef<str>) -> Result<Self, MediaRefError> {
        let s = url.as_ref().trim();
        if s.is_empty() {
            return Err(MediaRefError::Empty);
        }
        let u = Url::parse(s).map_err(|_| MediaRefError::InvalidUrl)?;
        Ok(MediaRef::Url(u))
    }

    /// Parses stored text back into a reference: URLs when they parse, local
    /// paths otherwise.
    pub fn parse(raw: &str) -> Result<Self, MediaRefError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(MediaRefError::Empty);
        }
        match Url::parse(s) {
            Ok(u) => Ok(MediaRef::Url(u)),
            Err(_) => Ok(MediaRef::FilePath(PathBuf::from(s))),
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaRef::FilePath(p) => Some(p.as_path()),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            MediaRef::Url(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRef::FilePath(p) => write!(f, "{}", p.display()),
            MediaRef::Url(u) => write!(f, "{u}"),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_url_rejects_empty() {
        let err = MediaRef::from_url("   ").unwrap_err();
        assert_eq!(err, MediaRefError::Empty);
    }

    #[test]
    fn from_url_rejects_garbage() {
        let err = MediaRef::from_url("not a url").unwrap_err();
        assert_eq!(err, MediaRefError::InvalidUrl);
    }

    #[test]
    fn from_file_rejects_empty() {
        let err = MediaRef::from_file("").unwrap_err();
        assert_eq!(err, MediaRefError::Empty);
    }

    #[test]
    fn parse_prefers_url() {
        let m = MediaRef::parse("https://cdn.example.com/intro.mp4").unwrap();
        assert!(m.as_url().is_some());
        assert_eq!(m.to_string(), "https://cdn.example.com/intro.mp4");
    }

    #[test]
    fn parse_falls_back_to_path() {
        let m = MediaRef::parse("videos/intro.mp4").unwrap();
        assert!(m.as_path().is_some());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        let m = MediaRef::from_url("https://cdn.example.com/a.mp4").unwrap();
        let again = MediaRef::parse(&m.to_string()).unwrap();
        assert_eq!(m, again);
    }
}
