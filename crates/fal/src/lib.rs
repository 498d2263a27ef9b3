//! Remote image-edit client for the fal.ai inference API.
//!
//! One logical call ([`client::ImageEditor::edit`]) submits an image and a
//! prompt and yields a single result URL or a classified [`error::EditError`].
//! Retrying is internal: [`client::FalEditClient`] drives a fixed-delay
//! [`retry::RetryPolicy`] over a single-attempt [`api::EditTransport`].

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod response;
pub mod retry;

pub use client::{EditedImage, FalEditClient, ImageEditor};
pub use config::FalConfig;
pub use error::EditError;
pub use payload::ImagePayload;
pub use retry::RetryPolicy;
