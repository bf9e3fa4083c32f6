//! Request extractors that run before the product handlers
//!
//! Multipart parsing, upload validation and form-name collection happen here so
//! the handlers receive typed, already-checked input.

pub mod selection;
pub mod upload;

pub use selection::DeleteSelection;
pub use upload::{ProductUpload, UploadPolicy};
