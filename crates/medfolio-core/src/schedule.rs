//! Medication schedule entries derived by the backend from accepted extractions.

use serde::{Deserialize, Serialize};

/// A read-only schedule row from `GET /files/schedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dose: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// The uploaded file this entry was extracted from.
    #[serde(default)]
    pub file_id: Option<String>,
}

impl ScheduleEntry {
    pub fn has_source(&self) -> bool {
        self.file_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_source_file() {
        let json = r#"{
            "id": "s1",
            "name": "Metformin",
            "dose": "500 mg",
            "frequency": "twice daily",
            "created_at": "2024-05-02T08:00:00"
        }"#;
        let entry: ScheduleEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.has_source());
        assert_eq!(entry.dose.as_deref(), Some("500 mg"));
    }
}
