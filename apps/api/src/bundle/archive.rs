//! Multi-file archive bundle: `index.html`, `style.css`, `script.js` and
//! the images under `img/`.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::bundle::assets::StaticAsset;
use crate::bundle::UploadedImage;
use crate::template::RenderedSite;

pub const INDEX_ENTRY: &str = "index.html";
pub const STYLE_ENTRY: &str = "style.css";
pub const SCRIPT_ENTRY: &str = "script.js";
pub const ARCHIVE_FILENAME: &str = "portfolio-site.zip";

/// Writes the bundle as an in-memory zip. Entry order is fixed: the three
/// text files, the uploaded image, then the static images in the order given.
pub fn build_archive(
    site: &RenderedSite,
    image: Option<&UploadedImage>,
    static_assets: &[StaticAsset],
) -> ZipResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, body) in [
        (INDEX_ENTRY, site.html.as_bytes()),
        (STYLE_ENTRY, site.css.as_bytes()),
        (SCRIPT_ENTRY, site.js.as_bytes()),
    ] {
        zip.start_file(name, entry_options())?;
        zip.write_all(body)?;
    }

    if let Some(image) = image {
        zip.start_file(format!("img/{}", image.filename), entry_options())?;
        zip.write_all(&image.bytes)?;
    }

    for asset in static_assets {
        if image.is_some_and(|img| img.filename == asset.name) {
            debug!("Upload shadows static asset {}; keeping the upload", asset.name);
            continue;
        }
        zip.start_file(format!("img/{}", asset.name), entry_options())?;
        zip.write_all(&asset.bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::io::Read;
    use zip::ZipArchive;

    fn site() -> RenderedSite {
        RenderedSite {
            html: "<html></html>".into(),
            css: "body {}".into(),
            js: "console.log('hi');".into(),
        }
    }

    fn entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
        let mut file = archive.by_name(name).unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        buf
    }

    fn names(archive: &ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_archive_contains_text_entries_and_upload() {
        let upload = UploadedImage {
            filename: "photo.png".into(),
            bytes: Bytes::from_static(&[0x89, b'P', b'N', b'G', 1, 2, 3]),
        };
        let statics = vec![StaticAsset {
            name: "logo.png".into(),
            bytes: Bytes::from_static(b"logo"),
        }];

        let data = build_archive(&site(), Some(&upload), &statics).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();

        assert_eq!(archive.len(), 5);
        assert_eq!(entry(&mut archive, "index.html"), b"<html></html>");
        assert_eq!(entry(&mut archive, "style.css"), b"body {}");
        assert_eq!(entry(&mut archive, "script.js"), b"console.log('hi');");
        assert_eq!(entry(&mut archive, "img/photo.png"), upload.bytes.to_vec());
        assert_eq!(entry(&mut archive, "img/logo.png"), b"logo");
    }

    #[test]
    fn test_archive_without_static_assets_is_still_complete() {
        let data = build_archive(&site(), None, &[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(data)).unwrap();
        let mut got = names(&archive);
        got.sort();
        assert_eq!(got, vec!["index.html", "script.js", "style.css"]);
    }

    #[test]
    fn test_upload_named_like_static_asset_wins() {
        let upload = UploadedImage {
            filename: "logo.png".into(),
            bytes: Bytes::from_static(b"mine"),
        };
        let statics = vec![StaticAsset {
            name: "logo.png".into(),
            bytes: Bytes::from_static(b"theirs"),
        }];
        let data = build_archive(&site(), Some(&upload), &statics).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 4);
        assert_eq!(entry(&mut archive, "img/logo.png"), b"mine");
    }

    #[test]
    fn test_text_entries_are_stable_across_builds() {
        let a = build_archive(&site(), None, &[]).unwrap();
        let b = build_archive(&site(), None, &[]).unwrap();
        let mut a = ZipArchive::new(Cursor::new(a)).unwrap();
        let mut b = ZipArchive::new(Cursor::new(b)).unwrap();
        for name in [INDEX_ENTRY, STYLE_ENTRY, SCRIPT_ENTRY] {
            assert_eq!(entry(&mut a, name), entry(&mut b, name));
        }
    }
}
