//! Upload handler - analyze, store, persist

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};

use crate::{AppState, AppError, AppResult};
use crate::analysis::ImageAttributes;
use crate::models::{CreateReport, UploadResponse};

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

struct ReceivedImage {
    original_name: String,
    mime_type: String,
    bytes: Bytes,
}

/// Upload & analyze image
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let image = read_image_field(multipart)
        .await?
        .ok_or(AppError::NoImageUploaded)?;

    let attrs = ImageAttributes::new(
        image.original_name.clone(),
        image.bytes.len() as u64,
        image.mime_type.clone(),
    );
    let analysis = state.detector.analyze(&attrs);

    let stored = state.uploads.save(&image.original_name, &image.bytes).await?;

    let inserted = state.reports.insert(CreateReport {
        image_name: image.original_name,
        image_size: attrs.size_bytes,
        image_type: image.mime_type,
        image_path: stored.file_name.clone(),
        content_sha256: stored.sha256,
        analysis: analysis.clone(),
    }).await;

    // No report, no file
    let report = match inserted {
        Ok(report) => report,
        Err(e) => {
            if let Err(io) = state.uploads.remove(&stored.file_name).await {
                tracing::error!(file = %stored.file_name, "Failed to remove orphaned upload: {}", io);
            }
            return Err(e);
        }
    };

    tracing::info!(
        report_id = %report.id,
        image = %report.image_name,
        size = report.image_size,
        verdict = %analysis.verdict,
        confidence = analysis.confidence,
        "Image analyzed"
    );

    Ok(Json(UploadResponse {
        message: "Image analyzed and saved successfully".to_string(),
        report_id: report.id,
        result: analysis,
    }))
}

/// First `image` field with a filename; other fields are drained
async fn read_image_field(mut multipart: Multipart) -> AppResult<Option<ReceivedImage>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_string) else {
            return Err(AppError::ValidationError("Image field must be a file".to_string()));
        };
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        return Ok(Some(ReceivedImage { original_name, mime_type, bytes }));
    }
    Ok(None)
}
