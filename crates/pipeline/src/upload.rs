use haybi_core::types::JobId;
use haybi_fal::ImagePayload;

/// Scheme of the placeholder `original_path` for images held only in memory.
pub const MEMORY_SCHEME: &str = "memory://";

/// An uploaded source image, fully read into memory by the transport layer.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: None,
            content_type: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Opaque reference stored as the job's `original_path`:
    /// `memory://<job_id>/<file name>`.
    pub fn original_path(&self, id: JobId) -> String {
        let name = self
            .file_name
            .as_deref()
            .map(sanitize_file_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "image".to_string());
        format!("{MEMORY_SCHEME}{id}/{name}")
    }

    pub fn into_payload(self) -> ImagePayload {
        ImagePayload::new(self.bytes, self.content_type)
    }
}

/// Keep the last path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
