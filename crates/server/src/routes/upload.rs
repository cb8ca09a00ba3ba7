use crate::error::{ServerError, ServerResult};
use crate::metrics::record_upload;
use crate::state::ServerState;
use axum::extract::{Multipart, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use docgate::UploadReceipt;
use std::sync::Arc;
use std::time::Instant;

/// Multipart field carrying the document
pub const FILE_FIELD: &str = "file";

/// Upload one document and fan it out to every analysis provider
///
/// The bearer token is checked before the multipart body is read, so a
/// rejected request never reaches storage.
pub async fn upload_document(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ServerResult<Json<UploadReceipt>> {
    let start = Instant::now();
    let result = upload(&state, &headers, multipart).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) if err.status_code().is_client_error() => "rejected",
        Err(_) => "failed",
    };
    record_upload(outcome, start.elapsed());

    result.map(Json)
}

async fn upload(
    state: &ServerState,
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> ServerResult<UploadReceipt> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let claims = state.pipeline.authorize(authorization)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ServerError::BadRequest("file field has no file name".into()))?;
        let content = field.bytes().await?;

        tracing::debug!(
            file = %file_name,
            bytes = content.len(),
            owner = %claims.sub,
            "received upload"
        );

        let receipt = state.pipeline.process(&claims, &file_name, &content).await?;
        return Ok(receipt);
    }

    Err(ServerError::BadRequest(format!(
        "missing multipart field '{FILE_FIELD}'"
    )))
}
