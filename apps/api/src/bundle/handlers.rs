use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::bundle::archive::{build_archive, ARCHIVE_FILENAME};
use crate::bundle::assets::{fetch_static_assets, StaticAsset};
use crate::bundle::inline::{inline_document, InlineAssets, HTML_FILENAME};
use crate::bundle::{validate_image_filename, PreviewArtifact, UploadedImage};
use crate::errors::AppError;
use crate::profile::record::ProfileDocument;
use crate::state::AppState;
use crate::template::{render, RenderedSite, TemplateDescriptor, TEMPLATES};

/// Parsed multipart bundle request.
pub struct BundleRequest {
    pub document: ProfileDocument,
    pub image: Option<UploadedImage>,
}

/// Reads the `document` part (JSON `{content, templateId}`) and the
/// optional `image` part. Unknown parts are ignored.
pub async fn read_bundle_request(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<BundleRequest, AppError> {
    let mut document = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document" => {
                let raw = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Unreadable document part", e))?;
                let parsed: ProfileDocument = serde_json::from_slice(&raw)
                    .map_err(|e| AppError::Validation(format!("Invalid document: {e}")))?;
                document = Some(parsed);
            }
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Unreadable image part", e))?;
                if bytes.is_empty() && filename.is_empty() {
                    // Browsers send an empty part for an untouched file input.
                    continue;
                }
                image = Some(checked_image(filename, bytes, max_upload_bytes)?);
            }
            other => debug!("Ignoring multipart field '{other}'"),
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("Missing 'document' part".into()))?;
    document.content.validate()?;

    Ok(BundleRequest { document, image })
}

/// Keeps the body-limit rejection as 413; every other failure is a bad request.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(format!(
            "{context}: request body exceeds the upload limit"
        )),
        _ => AppError::Validation(format!("{context}: {}", e.body_text())),
    }
}

fn checked_image(
    filename: String,
    bytes: Bytes,
    max_upload_bytes: usize,
) -> Result<UploadedImage, AppError> {
    validate_image_filename(&filename)?;
    if bytes.len() > max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Image is {} bytes; the limit is {max_upload_bytes}",
            bytes.len()
        )));
    }
    Ok(UploadedImage { filename, bytes })
}

struct Prepared {
    descriptor: &'static TemplateDescriptor,
    site: RenderedSite,
    image: Option<UploadedImage>,
    static_assets: Vec<StaticAsset>,
}

async fn prepare(state: &AppState, req: BundleRequest) -> Result<Prepared, AppError> {
    let descriptor = req.document.template_id.descriptor();
    let css = state.stylesheets.require(descriptor.key)?;
    let site = render(
        descriptor,
        &req.document.content,
        req.image.as_ref().map(|img| img.filename.as_str()),
        css,
    );
    let static_assets =
        fetch_static_assets(state.assets.clone(), descriptor.static_assets).await;

    Ok(Prepared {
        descriptor,
        site,
        image: req.image,
        static_assets,
    })
}

fn inline(state: &AppState, prepared: &Prepared) -> String {
    inline_document(
        &prepared.site,
        InlineAssets {
            image: prepared.image.as_ref(),
            static_assets: &prepared.static_assets,
            asset_base_url: Some(state.config.public_asset_base()),
        },
    )
}

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub key: String,
    pub display_name: &'static str,
    pub css_path: &'static str,
    pub available: bool,
}

/// GET /api/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<Vec<TemplateSummary>> {
    Json(
        TEMPLATES
            .iter()
            .map(|d| TemplateSummary {
                key: d.key.to_string(),
                display_name: d.display_name,
                css_path: d.css_path,
                available: state.stylesheets.is_loaded(d.key),
            })
            .collect(),
    )
}

/// POST /api/preview
pub async fn handle_create_preview(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let req = read_bundle_request(multipart, state.config.max_upload_bytes).await?;
    let prepared = prepare(&state, req).await?;
    let html = inline(&state, &prepared);

    let artifact = PreviewArtifact {
        html: html.clone(),
        template: prepared.descriptor.key,
        created_at: Utc::now(),
    };
    if state.previews.replace(user.user_id, artifact).await.is_some() {
        debug!("Released previous preview for user {}", user.user_id);
    }

    Ok(Html(html))
}

/// GET /api/preview
pub async fn handle_get_preview(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Html<String>, AppError> {
    let artifact = state
        .previews
        .current(user.user_id)
        .await
        .ok_or_else(|| AppError::NotFound("No preview has been generated".into()))?;
    debug!(
        "Serving preview for user {} (template {}, rendered {})",
        user.user_id, artifact.template, artifact.created_at
    );
    Ok(Html(artifact.html.clone()))
}

/// POST /api/download/html
pub async fn handle_download_html(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let req = read_bundle_request(multipart, state.config.max_upload_bytes).await?;
    let prepared = prepare(&state, req).await?;
    let html = inline(&state, &prepared);

    info!(
        "Built single-file bundle with template {} ({} bytes)",
        prepared.descriptor.key,
        html.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(HTML_FILENAME)),
        ],
        html,
    ))
}

/// POST /api/download/zip
pub async fn handle_download_zip(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let req = read_bundle_request(multipart, state.config.max_upload_bytes).await?;
    let prepared = prepare(&state, req).await?;
    let key = prepared.descriptor.key;

    let data = tokio::task::spawn_blocking(move || {
        build_archive(
            &prepared.site,
            prepared.image.as_ref(),
            &prepared.static_assets,
        )
    })
    .await
    .map_err(|e| anyhow::anyhow!("Archive task failed: {e}"))?
    .map_err(|e| anyhow::anyhow!("Failed to write archive: {e}"))?;

    info!("Built archive bundle with template {key} ({} bytes)", data.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, attachment(ARCHIVE_FILENAME)),
        ],
        data,
    ))
}
