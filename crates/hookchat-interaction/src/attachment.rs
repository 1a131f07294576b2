//! File attachment helpers.

use hookchat_core::error::Result;
use hookchat_core::transport::FileAttachment;
use std::fs;
use std::path::Path;

/// Reads a file from disk into an attachment, guessing its MIME type from
/// the extension.
pub fn attachment_from_path(path: impl AsRef<Path>) -> Result<FileAttachment> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let media_type = mime_guess::from_path(path).first().map(|m| m.to_string());
    Ok(FileAttachment {
        file_name,
        media_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_from_path_guesses_mime() {
        let dir = std::env::temp_dir();
        let path = dir.join("hookchat-attachment-test.txt");
        fs::write(&path, b"hello").unwrap();

        let attachment = attachment_from_path(&path).unwrap();
        assert_eq!(attachment.file_name, "hookchat-attachment-test.txt");
        assert_eq!(attachment.media_type.as_deref(), Some("text/plain"));
        assert_eq!(attachment.bytes, b"hello");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = attachment_from_path("/definitely/not/here.bin");
        assert!(result.unwrap_err().to_string().contains("IO error"));
    }
}
