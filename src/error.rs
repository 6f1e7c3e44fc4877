use thiserror::Error;

use crate::constants::MAX_DEPTH;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input is empty")]
    Empty,

    #[error("unexpected byte {byte:#04x} at offset {offset}, expected '{{' or '['")]
    UnexpectedStart { byte: u8, offset: usize },

    #[error("missing ':' after key at offset {offset}")]
    MissingColon { offset: usize },

    #[error("missing key at offset {offset}")]
    MissingKey { offset: usize },

    #[error("missing value at offset {offset}")]
    MissingValue { offset: usize },

    #[error("unterminated value starting at offset {offset}")]
    UnterminatedValue { offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("expected ',' at offset {offset}")]
    ExpectedComma { offset: usize },

    #[error("nesting exceeds {} levels", MAX_DEPTH)]
    DepthLimit,

    #[error("cannot parse {found} into {expected} document")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Byte offset of a malformed-input error, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::UnexpectedStart { offset, .. }
            | Error::MissingColon { offset }
            | Error::MissingKey { offset }
            | Error::MissingValue { offset }
            | Error::UnterminatedValue { offset }
            | Error::UnterminatedString { offset }
            | Error::ExpectedComma { offset } => Some(*offset),
            _ => None,
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, Error::Io(_) | Error::DepthLimit | Error::KindMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_display_includes_offset() {
        let err = Error::MissingColon { offset: 7 };
        assert_eq!(err.to_string(), "missing ':' after key at offset 7");
        assert_eq!(err.offset(), Some(7));
    }

    #[rstest::rstest]
    fn test_unexpected_start_formats_byte() {
        let err = Error::UnexpectedStart {
            byte: b'x',
            offset: 0,
        };
        assert_eq!(
            err.to_string(),
            "unexpected byte 0x78 at offset 0, expected '{' or '['"
        );
    }

    #[rstest::rstest]
    fn test_structural_errors_are_not_malformed_input() {
        assert!(Error::Empty.is_malformed_input());
        assert!(!Error::DepthLimit.is_malformed_input());
        assert_eq!(Error::DepthLimit.offset(), None);
    }
}
