//! Uploaded document domain module.
//!
//! - `model`: file record, status vocabulary, presigned URL
//! - `extraction`: structured fields extracted from a document
//! - `hint`: client-side type/size hint for uploads

mod extraction;
mod hint;
mod model;

pub use extraction::{Extraction, MedicationDetail};
pub use hint::{MAX_UPLOAD_BYTES, UploadHint, upload_hint};
pub use model::{BadgeStyle, FileStatus, PresignedUrl, StatusBadge, UploadedFile};
