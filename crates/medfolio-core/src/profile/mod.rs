//! Medical profile domain module.

mod model;

pub use model::{MedicalProfile, MedicalProfileFields, MedicalProfilePatch, ProfileField};
