use std::borrow::Cow;
use std::collections::TryReserveError;
use std::{error, fmt, io};

use crate::Fourcc;

/// Type alias for the result of tag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of errors that may occur while updating metadata.
#[derive(Debug)]
pub enum ErrorKind {
    /// An error kind indicating that an IO error has occurred. Contains the original io::Error.
    Io(io::Error),
    /// An error kind indicating that a staging buffer could not be grown.
    Alloc(TryReserveError),
    /// An error kind indicating that an atom could not be found. Contains the atom's identifier.
    AtomNotFound(Fourcc),
    /// An error kind indicating that the declared size of an atom is inconsistent with the range
    /// it is contained in.
    InvalidAtomSize,
    /// An error kind indicating that an atom is too small to contain its mandatory header, or
    /// uses a layout that can't be rewritten.
    UnsupportedLayout,
    /// An error kind indicating that an atom would grow beyond the 32 bit size limit.
    SizeOverflow,
}

/// Any error that may occur while updating metadata.
pub struct Error {
    /// The kind of error.
    pub kind: ErrorKind,
    /// A human readable string describing the error.
    pub description: Cow<'static, str>,
}

impl Error {
    /// Creates a new `Error` using the error kind and description.
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Error {
        Error { kind, description: description.into() }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Alloc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error { kind: ErrorKind::Io(err), description: Cow::Borrowed("") }
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Error {
        Error {
            kind: ErrorKind::Alloc(err),
            description: Cow::Borrowed("Error allocating staging buffer"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.description)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.description)
        }
    }
}
