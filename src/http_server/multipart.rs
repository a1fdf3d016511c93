//! `multipart/form-data` parsing for uploads

use bytes::Bytes;

use super::error::ApiError;

/// Form field carrying the uploaded file
const FILE_FIELD: &str = "file";

/// The `file` field of an upload form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Extract the `file` field from a fully read multipart body
pub fn read_file_field(content_type: Option<&str>, body: Vec<u8>) -> Result<UploadedFile, ApiError> {
    let content_type = content_type
        .filter(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
        .ok_or_else(|| {
            ApiError::validation("expected a multipart/form-data body with a 'file' field")
        })?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| ApiError::Validation(format!("invalid multipart request: {}", e)))?;

    futures::executor::block_on(find_file_field(body, boundary))
}

async fn find_file_field(body: Vec<u8>, boundary: String) -> Result<UploadedFile, ApiError> {
    let stream =
        futures::stream::once(async move { Ok::<Bytes, std::io::Error>(Bytes::from(body)) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(invalid)?;

        return Ok(UploadedFile {
            filename,
            content: content.to_vec(),
        });
    }

    Err(ApiError::validation("file is required"))
}

fn invalid(err: multer::Error) -> ApiError {
    ApiError::Validation(format!("invalid multipart body: {}", err))
}
