//! File utilities and stuff.

use std::path::Path;

use snafu::ResultExt;

use crate::{ReadSnafu, Result, WriteSnafu};

/// Read a whole file as text. Bytes that aren't UTF-8 are replaced rather
/// than failing the read.
pub fn read_text(path: &Path) -> Result<String> {
    log::trace!("Reading {path:?}");
    let bytes = std::fs::read(path).context(ReadSnafu {
        path: path.to_path_buf(),
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `text` to the file at `path`, replacing it.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    log::trace!("Writing {} bytes to {path:?}", text.len());
    std::fs::write(path, text).context(WriteSnafu {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_is_replaced() {
        let text = read_text(Path::new("test_data/latin1.txt")).unwrap();
        assert!(text.starts_with("// TODO(): caf"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn missing_files_are_read_errors() {
        let err = read_text(Path::new("test_data/does_not_exist.cpp")).unwrap_err();
        assert!(matches!(err, crate::Error::Read { .. }));
        assert!(err.to_string().contains("does_not_exist.cpp"));
    }
}
