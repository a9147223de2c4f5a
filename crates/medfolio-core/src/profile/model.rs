//! MedicalProfile domain model.
//!
//! A profile is one-to-one with a user and consists of optional free-text
//! fields. "No profile yet" is represented by the absence of a
//! [`MedicalProfile`], never by an empty one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The editable profile fields, in display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProfileField {
    PresentConditions,
    DiagnosedConditions,
    MedicationsCurrent,
    MedicationsPast,
    Allergies,
    MedicalHistory,
    FamilyHistory,
    Surgeries,
    Immunizations,
    LifestyleFactors,
}

impl ProfileField {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::PresentConditions => "Present conditions",
            Self::DiagnosedConditions => "Diagnosed conditions",
            Self::MedicationsCurrent => "Current medications",
            Self::MedicationsPast => "Past medications",
            Self::Allergies => "Allergies",
            Self::MedicalHistory => "Medical history",
            Self::FamilyHistory => "Family history",
            Self::Surgeries => "Surgeries",
            Self::Immunizations => "Immunizations",
            Self::LifestyleFactors => "Lifestyle factors",
        }
    }

    /// All fields in display order.
    pub fn all() -> impl Iterator<Item = ProfileField> {
        Self::iter()
    }
}

/// The free-text body of a profile, as sent on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MedicalProfileFields {
    #[serde(default)]
    pub present_conditions: Option<String>,
    #[serde(default)]
    pub diagnosed_conditions: Option<String>,
    #[serde(default)]
    pub medications_past: Option<String>,
    #[serde(default)]
    pub medications_current: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub family_history: Option<String>,
    #[serde(default)]
    pub surgeries: Option<String>,
    #[serde(default)]
    pub immunizations: Option<String>,
    #[serde(default)]
    pub lifestyle_factors: Option<String>,
}

impl MedicalProfileFields {
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Sets a field. Blank values clear it.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        let slot = self.slot_mut(field);
        *slot = if value.trim().is_empty() {
            None
        } else {
            Some(value)
        };
    }

    pub fn clear(&mut self, field: ProfileField) {
        *self.slot_mut(field) = None;
    }

    /// Fields with a non-blank value, in display order.
    pub fn filled(&self) -> Vec<(ProfileField, &str)> {
        ProfileField::all()
            .filter_map(|field| {
                self.get(field)
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (field, value))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.filled().is_empty()
    }

    /// Fields whose value in `edited` differs from `self`.
    pub fn diff(&self, edited: &MedicalProfileFields) -> MedicalProfilePatch {
        let changes = ProfileField::all()
            .filter(|field| normalized(self.get(*field)) != normalized(edited.get(*field)))
            .map(|field| (field, edited.get(field).map(str::to_string)))
            .collect();
        MedicalProfilePatch { changes }
    }

    fn slot(&self, field: ProfileField) -> &Option<String> {
        match field {
            ProfileField::PresentConditions => &self.present_conditions,
            ProfileField::DiagnosedConditions => &self.diagnosed_conditions,
            ProfileField::MedicationsCurrent => &self.medications_current,
            ProfileField::MedicationsPast => &self.medications_past,
            ProfileField::Allergies => &self.allergies,
            ProfileField::MedicalHistory => &self.medical_history,
            ProfileField::FamilyHistory => &self.family_history,
            ProfileField::Surgeries => &self.surgeries,
            ProfileField::Immunizations => &self.immunizations,
            ProfileField::LifestyleFactors => &self.lifestyle_factors,
        }
    }

    fn slot_mut(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::PresentConditions => &mut self.present_conditions,
            ProfileField::DiagnosedConditions => &mut self.diagnosed_conditions,
            ProfileField::MedicationsCurrent => &mut self.medications_current,
            ProfileField::MedicationsPast => &mut self.medications_past,
            ProfileField::Allergies => &mut self.allergies,
            ProfileField::MedicalHistory => &mut self.medical_history,
            ProfileField::FamilyHistory => &mut self.family_history,
            ProfileField::Surgeries => &mut self.surgeries,
            ProfileField::Immunizations => &mut self.immunizations,
            ProfileField::LifestyleFactors => &mut self.lifestyle_factors,
        }
    }
}

fn normalized(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A stored profile as returned by `/profile/medical-profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalProfile {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub fields: MedicalProfileFields,
}

/// The changed-field subset sent with `PATCH /profile/medical-profile`.
///
/// Serializes as a flat object; a cleared field is sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MedicalProfilePatch {
    pub changes: BTreeMap<ProfileField, Option<String>>,
}

impl MedicalProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn contains(&self, field: ProfileField) -> bool {
        self.changes.contains_key(&field)
    }
}
