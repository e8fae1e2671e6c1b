//! Bundle packager: turns a rendered site into a single HTML document or
//! a zip archive of separate files.

pub mod archive;
pub mod assets;
pub mod handlers;
pub mod inline;
pub mod preview;

use bytes::Bytes;

use crate::errors::AppError;

pub use preview::{PreviewArtifact, PreviewSlots};

const MAX_FILENAME_BYTES: usize = 255;
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// An image supplied with a bundle request.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Bytes,
}

/// Checks that `name` can be placed verbatim into `img/<name>` in markup
/// and in an archive entry path.
pub fn validate_image_filename(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::Validation("Image filename is empty".into()));
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(AppError::Validation(format!(
            "Image filename exceeds {MAX_FILENAME_BYTES} bytes"
        )));
    }
    if name.starts_with('.') {
        return Err(AppError::Validation(
            "Image filename must not start with '.'".into(),
        ));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| c.is_control() || matches!(c, '/' | '\\' | '"' | '\'' | '<' | '>' | '&'))
    {
        return Err(AppError::Validation(format!(
            "Image filename contains forbidden character {bad:?}"
        )));
    }

    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::Validation(format!(
            "Image filename must end in one of: {}",
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_image_names() {
        for name in ["photo.png", "me.JPG", "顔写真.jpeg", "a b.webp", "icon.svg"] {
            assert!(validate_image_filename(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_unsafe_names() {
        for name in [
            "",
            ".hidden.png",
            "../up.png",
            "dir/photo.png",
            "dir\\photo.png",
            "x\".png",
            "<script>.png",
            "a&b.png",
            "tab\t.png",
            "photo.exe",
            "photo",
        ] {
            assert!(
                matches!(validate_image_filename(name), Err(AppError::Validation(_))),
                "{name:?} should be rejected"
            );
        }
        let long = format!("{}.png", "a".repeat(300));
        assert!(validate_image_filename(&long).is_err());
    }
}
