//! Error types for the bounded file store

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Name does not end in an allowed audio extension
    InvalidFormat(String),
    /// Name is not a plain file name (path separators, leading dot, empty stem)
    InvalidName(String),
    /// Content alone exceeds the store capacity
    TooLarge { size: u64, capacity: u64 },
    AlreadyExists(String),
    NotFound(String),
    Unauthorized,
    Io(Box<std::io::Error>),
}

impl StoreError {
    /// True for errors caused by the request rather than the store
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::Io(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidFormat(name) => {
                write!(f, "Only MP3 or WAV files are allowed: {}", name)
            }
            StoreError::InvalidName(name) => write!(f, "Invalid file name: {}", name),
            StoreError::TooLarge { size, capacity } => write!(
                f,
                "File of {} bytes exceeds storage capacity of {} bytes",
                size, capacity
            ),
            StoreError::AlreadyExists(name) => write!(f, "File {} already exists", name),
            StoreError::NotFound(name) => write!(f, "File {} not found", name),
            StoreError::Unauthorized => write!(f, "Invalid API key"),
            StoreError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
