use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::cli::CliError;

/// Unified error type for loading symbol graphs and driving the checker.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Cli(CliError),
    Symbols {
        path: Option<PathBuf>,
        message: String,
    },
}

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construct an error describing a malformed or inconsistent symbol graph.
    pub fn symbols(message: impl Into<String>) -> Self {
        Self::Symbols {
            path: None,
            message: message.into(),
        }
    }

    /// Attach the document path to a symbol graph error.
    #[must_use]
    pub fn in_document(self, document: impl Into<PathBuf>) -> Self {
        match self {
            Self::Symbols { path: None, message } => Self::Symbols {
                path: Some(document.into()),
                message,
            },
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Cli(err) => write!(f, "{err}"),
            Error::Symbols {
                path: Some(path),
                message,
            } => write!(f, "invalid symbol graph `{}`: {message}", path.display()),
            Error::Symbols { path: None, message } => write!(f, "invalid symbol graph: {message}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Cli(err) => Some(err),
            Error::Symbols { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<CliError> for Error {
    fn from(error: CliError) -> Self {
        Error::Cli(error)
    }
}
