//! Single-document bundle: stylesheet and script inlined, images either
//! embedded as data URIs or pointed at an absolute asset URL.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::bundle::assets::StaticAsset;
use crate::bundle::UploadedImage;
use crate::template::{RenderedSite, SCRIPT_TAG, STYLESHEET_TAG};

pub const HTML_FILENAME: &str = "portfolio.html";

/// Images available to the inliner. Anything not embedded falls back to
/// `asset_base_url` when one is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineAssets<'a> {
    pub image: Option<&'a UploadedImage>,
    pub static_assets: &'a [StaticAsset],
    pub asset_base_url: Option<&'a str>,
}

pub fn inline_document(site: &RenderedSite, assets: InlineAssets<'_>) -> String {
    let mut doc = site
        .html
        .replacen(STYLESHEET_TAG, &format!("<style>\n{}\n</style>", site.css), 1)
        .replacen(SCRIPT_TAG, &format!("<script>\n{}\n</script>", site.js), 1);

    if let Some(image) = assets.image {
        doc = embed(&doc, &image.filename, &image.bytes);
    }
    for asset in assets.static_assets {
        doc = embed(&doc, &asset.name, &asset.bytes);
    }

    if let Some(base) = assets.asset_base_url {
        let base = base.trim_end_matches('/');
        doc = doc.replace(r#"src="img/"#, &format!(r#"src="{base}/img/"#));
    }

    doc
}

fn embed(doc: &str, filename: &str, bytes: &[u8]) -> String {
    doc.replace(
        &format!(r#"src="img/{filename}""#),
        &format!(r#"src="{}""#, data_uri(filename, bytes)),
    )
}

fn data_uri(filename: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(filename), STANDARD.encode(bytes))
}

/// Content type by file extension, for the image types uploads accept.
pub fn mime_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
