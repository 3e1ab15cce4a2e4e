//! Upload name validation

use crate::error::{Result, StoreError};

/// Extensions accepted by the store, compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".mp3", ".wav"];

/// Longest name in bytes; the usual filesystem limit for one path component
pub const MAX_NAME_BYTES: usize = 255;

/// Whether `name` ends in one of [`ALLOWED_EXTENSIONS`]
pub fn has_allowed_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Check that `name` can be stored as-is.
///
/// The name is the public identifier of the file, so it must be a single
/// path component: no separators, no leading dot (hidden and temp files
/// live there), and something before the extension.
pub fn validate_name(name: &str) -> Result<()> {
    if !has_allowed_extension(name) {
        return Err(StoreError::InvalidFormat(name.to_string()));
    }

    let invalid = name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.len() <= ".mp3".len()
        || name.len() > MAX_NAME_BYTES;

    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }

    Ok(())
}
