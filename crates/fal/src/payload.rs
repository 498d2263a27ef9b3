//! Request payload construction.
//!
//! The image travels inline as a base64 data URI; the inference parameters
//! are fixed policy and not exposed to callers.

use base64::Engine;
use serde::Serialize;

use crate::error::EditError;

pub const NUM_INFERENCE_STEPS: u32 = 28;
pub const GUIDANCE_SCALE: f32 = 4.0;
pub const NUM_IMAGES: u32 = 1;
pub const ENABLE_SAFETY_CHECKER: bool = true;
pub const OUTPUT_FORMAT: &str = "png";
pub const NEGATIVE_PROMPT: &str = "";
pub const ACCELERATION: &str = "regular";

/// Content type assumed when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Raw image bytes held in memory, with their declared media type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        }
    }

    /// Encode as `data:<type>/<subtype>;base64,<data>`.
    pub fn to_data_uri(&self) -> Result<String, EditError> {
        let content_type = self.content_type.trim();
        if !is_media_type(content_type) {
            return Err(EditError::Payload(format!(
                "'{}' is not a media type",
                self.content_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(EditError::Payload("image is empty".into()));
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        Ok(format!("data:{content_type};base64,{encoded}"))
    }
}

/// `type/subtype`, both halves non-empty and free of separators.
fn is_media_type(value: &str) -> bool {
    let Some((kind, subtype)) = value.split_once('/') else {
        return false;
    };
    let token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    token(kind) && token(subtype)
}

/// JSON body of an edit request.
#[derive(Debug, Serialize)]
pub struct EditRequest<'a> {
    pub prompt: &'a str,
    pub image_urls: Vec<String>,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub num_images: u32,
    pub enable_safety_checker: bool,
    pub output_format: &'static str,
    pub negative_prompt: &'static str,
    pub acceleration: &'static str,
}

impl<'a> EditRequest<'a> {
    /// Build a complete request; called afresh for every attempt.
    pub fn build(image: &ImagePayload, prompt: &'a str) -> Result<Self, EditError> {
        Ok(Self {
            prompt,
            image_urls: vec![image.to_data_uri()?],
            num_inference_steps: NUM_INFERENCE_STEPS,
            guidance_scale: GUIDANCE_SCALE,
            num_images: NUM_IMAGES,
            enable_safety_checker: ENABLE_SAFETY_CHECKER,
            output_format: OUTPUT_FORMAT,
            negative_prompt: NEGATIVE_PROMPT,
            acceleration: ACCELERATION,
        })
    }

    pub fn to_json(&self) -> Result<serde_json::Value, EditError> {
        serde_json::to_value(self).map_err(|e| EditError::Payload(e.to_string()))
    }
}
