//! Crate error type
//!
//! Only level parsing and persistence can fail; the simulation itself never does.

use std::fmt;

/// Everything that can go wrong outside of a tick
#[derive(Debug)]
pub enum Error {
    /// Level text had no non-blank rows
    EmptyLevel,
    /// A row's width differs from the first row's
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A character with no meaning in this game's legend
    UnknownTile { row: usize, col: usize, ch: char },
    /// A required single marker (spawn, entrance, ...) is absent or repeated
    MissingMarker { marker: char },
    Json(serde_json::Error),
    Io(std::io::Error),
    /// Browser storage unavailable or rejected the write
    Storage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLevel => write!(f, "level has no rows"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "level row {row} is {found} tiles wide, expected {expected}"
            ),
            Self::UnknownTile { row, col, ch } => {
                write!(f, "unknown tile {ch:?} at row {row}, column {col}")
            }
            Self::MissingMarker { marker } => write!(f, "level needs exactly one {marker:?} marker"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::RaggedRow {
            row: 2,
            expected: 10,
            found: 9,
        };
        assert_eq!(err.to_string(), "level row 2 is 9 tiles wide, expected 10");

        let err = Error::UnknownTile {
            row: 0,
            col: 3,
            ch: 'z',
        };
        assert_eq!(err.to_string(), "unknown tile 'z' at row 0, column 3");
    }

    #[test]
    fn test_json_error_has_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
