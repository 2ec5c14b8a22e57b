//! Default on-disk locations

use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "iClippy";
pub const DATABASE_FILE_NAME: &str = "iclippy.sqlite3";

/// Per-user application data directory for iClippy
/// (`~/Library/Application Support/iClippy` on macOS).
///
/// Falls back to the working directory when the platform reports none.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn default_database_path() -> PathBuf {
    data_dir().join(DATABASE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path() {
        let path = default_database_path();
        assert!(path.ends_with("iClippy/iclippy.sqlite3"));
        assert_eq!(path.parent().unwrap(), data_dir());
    }
}
