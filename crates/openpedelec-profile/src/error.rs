//! Profile error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed `.asv` profile text.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A non-empty line remained after every schema parameter was read.
    #[error("extra data at end of file: '{0}'")]
    ExtraData(String),

    /// The file ran out of lines before the schema did.
    #[error("file ends after {actual} of {expected} parameter lines")]
    MissingLines { expected: usize, actual: usize },

    /// A value field did not parse as the parameter's numeric kind.
    #[error("line {line}: cannot parse '{text}' as {kind}")]
    BadNumber {
        line: usize,
        text: String,
        kind: &'static str,
    },
}

/// Profile operation failure.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("malformed profile: {0}")]
    Format(#[from] FormatError),

    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    /// The profile was never saved and has no backing file.
    #[error("profile '{0}' has no backing file")]
    Unsaved(String),
}

impl ProfileError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
