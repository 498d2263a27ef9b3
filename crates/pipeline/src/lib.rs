//! Job lifecycle controller.
//!
//! Admits image-edit requests as `pending` jobs, runs each one as a
//! detached background task, and reconciles the remote edit outcome into
//! exactly one terminal status write.

pub mod controller;
pub mod error;
pub mod upload;

pub use controller::JobController;
pub use error::PipelineError;
pub use upload::ImageUpload;
