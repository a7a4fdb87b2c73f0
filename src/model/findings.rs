//! Clinical findings form and the persisted save payload.

use serde::{Deserialize, Serialize};

use super::record::{lenient_records, null_as_default};
use super::ImageAnnotations;

/// Free-text and boolean clinical findings entered next to the images.
///
/// Fields the form does not know about are kept in `extra` and written back
/// unchanged on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Findings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub upper_teeth: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub front_teeth: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lower_teeth: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub receded_gums: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stains: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attrition: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crowns: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub other_findings: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A text field of the findings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFinding {
    UpperTeeth,
    FrontTeeth,
    LowerTeeth,
    Other,
}

/// A checkbox of the findings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagFinding {
    RecededGums,
    Stains,
    Attrition,
    Crowns,
}

impl Findings {
    pub fn set_text(&mut self, field: TextFinding, value: impl Into<String>) {
        let value = value.into();
        match field {
            TextFinding::UpperTeeth => self.upper_teeth = value,
            TextFinding::FrontTeeth => self.front_teeth = value,
            TextFinding::LowerTeeth => self.lower_teeth = value,
            TextFinding::Other => self.other_findings = value,
        }
    }

    pub fn set_flag(&mut self, field: FlagFinding, value: bool) {
        match field {
            FlagFinding::RecededGums => self.receded_gums = value,
            FlagFinding::Stains => self.stains = value,
            FlagFinding::Attrition => self.attrition = value,
            FlagFinding::Crowns => self.crowns = value,
        }
    }
}

/// Findings as stored on a submission, possibly carrying prior annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionFindings {
    #[serde(flatten)]
    pub form: Findings,
    #[serde(
        default,
        deserialize_with = "lenient_records",
        skip_serializing_if = "Option::is_none"
    )]
    pub annotations: Option<Vec<ImageAnnotations>>,
}

/// The `{...findings, annotations: [...]}` object handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    #[serde(flatten)]
    pub findings: Findings,
    pub annotations: Vec<ImageAnnotations>,
}

impl SavePayload {
    pub fn new(mut findings: Findings, annotations: Vec<ImageAnnotations>) -> Self {
        // the annotation sequence is authoritative; never emit two keys
        findings.extra.remove("annotations");
        Self {
            findings,
            annotations,
        }
    }

    /// Total number of shapes across all images.
    pub fn total_shapes(&self) -> usize {
        self.annotations.iter().map(ImageAnnotations::len).sum()
    }

    /// Request body expected by the annotate endpoint: `{"findings": ...}`.
    pub fn to_request_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&serde_json::json!({ "findings": self }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RectangleShape, Shape};
    use toothmark_canvas::Color;

    #[test]
    fn test_defaults_for_missing_and_null() {
        let f: Findings =
            serde_json::from_str(r#"{"upperTeeth": null, "stains": null, "crowns": true}"#)
                .unwrap();
        assert_eq!(f.upper_teeth, "");
        assert!(!f.stains);
        assert!(f.crowns);
        assert!(f.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let json = r#"{"frontTeeth": "chipped incisor", "reviewer": "dr-k"}"#;
        let f: Findings = serde_json::from_str(json).unwrap();
        assert_eq!(f.front_teeth, "chipped incisor");
        assert_eq!(f.extra.get("reviewer"), Some(&serde_json::json!("dr-k")));

        let back = serde_json::to_value(&f).unwrap();
        assert_eq!(back["reviewer"], "dr-k");
        assert_eq!(back["frontTeeth"], "chipped incisor");
        assert_eq!(back["recededGums"], false);
    }

    #[test]
    fn test_setters() {
        let mut f = Findings::default();
        f.set_text(TextFinding::Other, "bruxism");
        f.set_flag(FlagFinding::Attrition, true);
        assert_eq!(f.other_findings, "bruxism");
        assert!(f.attrition);
    }

    #[test]
    fn test_submission_findings_annotations_split() {
        let json = r##"{
            "lowerTeeth": "ok",
            "annotations": [
                {"annotations": [{"type":"rectangle","x":1,"y":2,"width":3,"height":4,"color":"#D33E3E"}]},
                {"annotations": []}
            ]
        }"##;
        let f: SubmissionFindings = serde_json::from_str(json).unwrap();
        assert_eq!(f.form.lower_teeth, "ok");
        assert!(!f.form.extra.contains_key("annotations"));
        let records = f.annotations.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn test_non_array_annotations_ignored() {
        let f: SubmissionFindings =
            serde_json::from_str(r#"{"annotations": {"oops": true}}"#).unwrap();
        assert!(f.annotations.is_none());

        let f: SubmissionFindings = serde_json::from_str(r#"{"annotations": null}"#).unwrap();
        assert!(f.annotations.is_none());
    }

    #[test]
    fn test_malformed_record_becomes_empty() {
        let json = r#"{"annotations": [{"annotations": [{"type": "blob"}]}, 7, {}]}"#;
        let f: SubmissionFindings = serde_json::from_str(json).unwrap();
        let records = f.annotations.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(ImageAnnotations::is_empty));
    }

    #[test]
    fn test_save_payload_shape() {
        let mut findings = Findings {
            upper_teeth: "plaque".into(),
            ..Findings::default()
        };
        findings
            .extra
            .insert("annotations".into(), serde_json::json!("stale"));

        let payload = SavePayload::new(
            findings,
            vec![
                ImageAnnotations::default(),
                ImageAnnotations::new(vec![Shape::from(RectangleShape::new(
                    1.0,
                    2.0,
                    3.0,
                    4.0,
                    Color::rgb(0x53, 0x2E, 0x5E),
                ))]),
            ],
        );
        assert_eq!(payload.total_shapes(), 1);
        assert!(payload.findings.extra.is_empty());

        let body: serde_json::Value =
            serde_json::from_str(&payload.to_request_json().unwrap()).unwrap();
        assert_eq!(body["findings"]["upperTeeth"], "plaque");
        assert_eq!(body["findings"]["annotations"][1]["annotations"][0]["type"], "rectangle");
        assert_eq!(body["findings"]["annotations"][0]["annotations"], serde_json::json!([]));
    }
}
