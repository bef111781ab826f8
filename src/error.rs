//! Crate-wide error type.
//!
//! Two families matter to callers: validation failures (`InvalidArgument`),
//! which mean an operation was refused before touching any state, and file
//! problems (`NotFound` / `Unsupported` / `InvalidFormat` / `Io` / `Decode`),
//! which abort only the current command.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A parameter failed validation (bad kernel parity, zero dimension,
    /// out-of-range index, mismatched layer properties, ...).
    InvalidArgument(String),
    /// A named file does not exist.
    NotFound(String),
    /// The file extension maps to no known codec.
    Unsupported(String),
    /// The file exists but its contents are not what the format requires.
    InvalidFormat(String),
    Io(std::io::Error),
    Decode(image::ImageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::NotFound(name) => write!(f, "file {} not found", name),
            Error::Unsupported(ext) => write!(f, "unsupported file type: {}", ext),
            Error::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Decode(e) => write!(f, "decode error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Decode(e)
    }
}
