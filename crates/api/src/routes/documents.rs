//! Document metadata. Files are uploaded straight to object storage by the
//! client; only the resulting storage path is recorded here.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::validation::sanitize_input;
use solace_core::{DocumentId, ProfileId};

use crate::db::DocumentRepository;
use crate::db::content::NewDocument;
use crate::error::{ApiJson, ApiPath, ApiQuery, AppError, Result};
use crate::models::Document;
use crate::state::AppState;

/// Query of `GET /api/documents`.
#[derive(Debug, Deserialize)]
pub struct DocumentsQuery {
    pub owner_id: ProfileId,
}

/// Response carrying a list of documents.
#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub success: bool,
    pub documents: Vec<Document>,
}

/// Response carrying a single document.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    pub document: Document,
}

/// List a profile's documents.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DocumentsQuery>,
) -> Result<Json<DocumentsResponse>> {
    let documents = DocumentRepository::new(state.pool())
        .list_for_owner(query.owner_id)
        .await?;

    Ok(Json(DocumentsResponse {
        success: true,
        documents,
    }))
}

/// Body of `POST /api/documents`.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub owner_id: ProfileId,
    pub title: String,
    pub storage_path: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl CreateDocumentRequest {
    /// Sanitize the title and check the storage path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the title or storage path is empty,
    /// or the storage path tries to climb out of the bucket.
    pub fn into_new_document(self) -> Result<NewDocument> {
        let title = sanitize_input(&self.title);
        if title.is_empty() {
            return Err(AppError::BadRequest("title must not be empty".to_string()));
        }

        let storage_path = self.storage_path.trim();
        if storage_path.is_empty() {
            return Err(AppError::BadRequest(
                "storage_path must not be empty".to_string(),
            ));
        }
        if storage_path.split('/').any(|segment| segment == "..") {
            return Err(AppError::BadRequest(
                "storage_path must not contain '..'".to_string(),
            ));
        }

        Ok(NewDocument {
            owner_id: self.owner_id,
            title,
            storage_path: storage_path.to_string(),
            mime_type: self
                .mime_type
                .map(|m| m.trim().to_ascii_lowercase())
                .filter(|m| !m.is_empty()),
        })
    }
}

/// Record an uploaded document.
#[instrument(skip(state, request), fields(owner_id = %request.owner_id))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>)> {
    let document = DocumentRepository::new(state.pool())
        .create(request.into_new_document()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse {
            success: true,
            document,
        }),
    ))
}

/// Forget a document's metadata.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DocumentId>,
) -> Result<StatusCode> {
    DocumentRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(title: &str, storage_path: &str) -> CreateDocumentRequest {
        CreateDocumentRequest {
            owner_id: ProfileId::generate(),
            title: title.to_string(),
            storage_path: storage_path.to_string(),
            mime_type: Some(" Application/PDF ".to_string()),
        }
    }

    #[test]
    fn test_valid_document() {
        let doc = request("Intake form", "profiles/abc/intake.pdf")
            .into_new_document()
            .unwrap();
        assert_eq!(doc.title, "Intake form");
        assert_eq!(doc.mime_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_rejects_empty_fields() {
        assert!(request("  ", "a.pdf").into_new_document().is_err());
        assert!(request("Form", " ").into_new_document().is_err());
    }

    #[test]
    fn test_rejects_parent_segments() {
        assert!(
            request("Form", "profiles/../secrets.pdf")
                .into_new_document()
                .is_err()
        );
        // Dots inside a file name are fine
        assert!(
            request("Form", "profiles/abc/v1..2.pdf")
                .into_new_document()
                .is_ok()
        );
    }
}
