//! Structured fields extracted from an uploaded document.

use serde::{Deserialize, Serialize};

use crate::profile::{MedicalProfileFields, ProfileField};

/// One medicine line from a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationDetail {
    pub name: String,
    #[serde(default)]
    pub dose: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

/// Payload of `GET /files/{id}/extraction`, and the optional body of
/// `POST /files/{id}/extraction/accept`.
///
/// Besides medicines, the extraction may carry any of the medical profile
/// fields; they are merged into the profile when the extraction is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Extraction {
    #[serde(default)]
    pub medicines: Vec<String>,
    #[serde(default)]
    pub medications_details: Vec<MedicationDetail>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(flatten)]
    pub profile: MedicalProfileFields,
}

impl Extraction {
    /// Profile fields the extraction would fill in.
    pub fn profile_fields(&self) -> Vec<(ProfileField, &str)> {
        self.profile.filled()
    }

    /// Medicine names, preferring the structured details when present.
    pub fn medicine_names(&self) -> Vec<&str> {
        if self.medications_details.is_empty() {
            self.medicines.iter().map(String::as_str).collect()
        } else {
            self.medications_details
                .iter()
                .map(|detail| detail.name.as_str())
                .collect()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty()
            && self.medications_details.is_empty()
            && self.additional_info.is_none()
            && self.profile.is_empty()
    }
}
