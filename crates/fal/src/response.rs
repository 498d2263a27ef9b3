//! Classification of a raw edit response body.

use serde::Deserialize;

use crate::client::EditedImage;
use crate::error::EditError;

/// Longest slice of a body quoted back in an error message.
const MAX_QUOTED_BODY: usize = 200;

#[derive(Debug, Deserialize)]
struct EditResponse {
    images: Option<Vec<ResultImage>>,
    error: Option<serde_json::Value>,
    has_nsfw_concepts: Option<Vec<bool>>,
}

#[derive(Debug, Deserialize)]
struct ResultImage {
    url: Option<String>,
}

/// Turn a 2xx response body into the first result image or a classified
/// error.
///
/// The safety flag is checked first: a flagged response is terminal even if
/// it also carries images or an error.
pub fn classify(body: &[u8]) -> Result<EditedImage, EditError> {
    let response: EditResponse = serde_json::from_slice(body).map_err(|e| {
        EditError::InvalidResponseFormat(format!("{e}; body: {}", quote(body)))
    })?;

    if response
        .has_nsfw_concepts
        .as_deref()
        .is_some_and(|flags| flags.contains(&true))
    {
        return Err(EditError::SafetyRejected);
    }

    if let Some(error) = response.error.filter(|e| !e.is_null()) {
        return Err(EditError::Remote(error_message(&error)));
    }

    let images = response.images.ok_or_else(|| {
        EditError::UnexpectedResponseShape("missing 'images' field".into())
    })?;
    let first = images
        .into_iter()
        .next()
        .ok_or_else(|| EditError::UnexpectedResponseShape("'images' is empty".into()))?;

    match first.url {
        Some(url) if !url.is_empty() => Ok(EditedImage { url }),
        _ => Err(EditError::UnexpectedResponseShape(
            "first image has no 'url'".into(),
        )),
    }
}

fn error_message(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

fn quote(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX_QUOTED_BODY) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
