//! Submission records received from the backend.

use serde::{Deserialize, Serialize};

use super::record::null_as_default;
use super::SubmissionFindings;

/// Patient details shown in the annotation header. Not used by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "patientID")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

/// A patient submission: an ordered list of image references plus any prior
/// findings and annotations.
///
/// Accepts both the backend's field names (`_id`, `imageURLs`) and the
/// descriptive ones (`id`, `imageReferences`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(
        rename = "imageURLs",
        alias = "imageReferences",
        default,
        deserialize_with = "null_as_default"
    )]
    pub image_references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<SubmissionFindings>,
    #[serde(flatten)]
    pub patient: PatientInfo,
}

impl Submission {
    pub fn new(id: impl Into<String>, image_references: Vec<String>) -> Self {
        Self {
            id: id.into(),
            image_references,
            findings: None,
            patient: PatientInfo::default(),
        }
    }

    pub fn with_findings(mut self, findings: SubmissionFindings) -> Self {
        self.findings = Some(findings);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_field_names() {
        let json = r#"{
            "_id": "65f0c1",
            "name": "A. Patient",
            "patientID": "P-104",
            "phone": "555-0101",
            "createdAt": "2024-03-12T10:00:00Z",
            "imageURLs": ["uploads/a.jpg", "uploads/b.jpg"],
            "status": "uploaded"
        }"#;
        let s = Submission::from_json(json).unwrap();
        assert_eq!(s.id, "65f0c1");
        assert_eq!(s.image_references.len(), 2);
        assert_eq!(s.patient.patient_id.as_deref(), Some("P-104"));
        assert!(s.findings.is_none());
    }

    #[test]
    fn test_descriptive_field_names() {
        let json = r#"{"id": "s1", "imageReferences": ["x.png"], "findings": {"stains": true}}"#;
        let s = Submission::from_json(json).unwrap();
        assert_eq!(s.id, "s1");
        assert_eq!(s.image_references, vec!["x.png".to_string()]);
        let findings = s.findings.unwrap();
        assert!(findings.form.stains);
        assert!(findings.annotations.is_none());
    }

    #[test]
    fn test_missing_image_list() {
        let s = Submission::from_json(r#"{"_id": "s2", "imageURLs": null}"#).unwrap();
        assert!(s.image_references.is_empty());
        let s = Submission::from_json(r#"{"_id": "s3"}"#).unwrap();
        assert!(s.image_references.is_empty());
    }
}
