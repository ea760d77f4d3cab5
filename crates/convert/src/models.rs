use serde::{Deserialize, Serialize};

use crate::hi_type::HiType;

/// Optional claim metadata attached to a conversion request.
#[derive(Debug, Clone, Default)]
pub struct ClaimMetadata {
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub insurer_name: Option<String>,
    pub policy_number: Option<String>,
}

impl ClaimMetadata {
    /// Non-empty form fields as (name, value) pairs for multipart bodies.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        [
            ("patient_name", &self.patient_name),
            ("patient_id", &self.patient_id),
            ("insurer_name", &self.insurer_name),
            ("policy_number", &self.policy_number),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

fn default_use_case() -> String {
    "claim".to_owned()
}

/// Body of `POST /convert/text`.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertTextRequest {
    pub text: String,
    /// Classification hint; omit for service-side auto-detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<HiType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    pub use_case: String,
}

impl ConvertTextRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            document_type: None,
            patient_name: None,
            patient_id: None,
            insurer_name: None,
            policy_number: None,
            use_case: default_use_case(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, meta: &ClaimMetadata) -> Self {
        self.patient_name = meta.patient_name.clone();
        self.patient_id = meta.patient_id.clone();
        self.insurer_name = meta.insurer_name.clone();
        self.policy_number = meta.policy_number.clone();
        self
    }
}

/// Per-document classification result returned by the service.
///
/// `detected_hi_type` is authoritative and replaces any filename guess the
/// tool showed while files were queued.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResult {
    pub filename: String,
    pub detected_hi_type: HiType,
    pub fhir_resource_type: String,
    /// `medgemma` or `deterministic`
    pub extraction_method: String,
    pub text_length: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertMetadata {
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub medgemma_used: bool,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub fhir_version: String,
}

/// Response of both conversion endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub documents_processed: u32,
    pub detected_hi_types: Vec<HiType>,
    #[serde(default)]
    pub document_results: Vec<DocumentResult>,
    pub fhir_bundle: serde_json::Value,
    #[serde(default)]
    pub metadata: ConvertMetadata,
}

impl ConvertResponse {
    /// The service's detection for one queued file, if it processed it.
    pub fn detection_for(&self, filename: &str) -> Option<HiType> {
        self.document_results
            .iter()
            .find(|r| r.filename == filename)
            .map(|r| r.detected_hi_type)
    }
}

/// Response of the conversion service's `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterHealth {
    pub status: String,
    pub version: String,
    pub medgemma_available: bool,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub fhir_profile: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_request_omits_absent_fields() {
        let body = serde_json::to_value(ConvertTextRequest::new("chest pain")).unwrap();
        assert_eq!(body["text"], "chest pain");
        assert_eq!(body["use_case"], "claim");
        assert!(body.get("document_type").is_none());
        assert!(body.get("patient_name").is_none());
    }

    #[test]
    fn text_request_carries_metadata() {
        let meta = ClaimMetadata {
            patient_name: Some("Ramesh Kumar".into()),
            insurer_name: Some("Star Health".into()),
            ..Default::default()
        };
        let body =
            serde_json::to_value(ConvertTextRequest::new("note").with_metadata(&meta)).unwrap();
        assert_eq!(body["patient_name"], "Ramesh Kumar");
        assert_eq!(body["insurer_name"], "Star Health");
        assert!(body.get("policy_number").is_none());
    }

    #[test]
    fn form_fields_skip_blank_values() {
        let meta = ClaimMetadata {
            patient_name: Some("  ".into()),
            patient_id: Some("ABHA-1".into()),
            ..Default::default()
        };
        assert_eq!(meta.form_fields(), vec![("patient_id", "ABHA-1".to_string())]);
    }

    #[test]
    fn convert_response_parses_and_maps_detections() {
        let body = r#"{
            "success": true,
            "documents_processed": 2,
            "detected_hi_types": ["discharge_summary", "lab_report"],
            "document_results": [
                {
                    "filename": "summary.pdf",
                    "detected_hi_type": "discharge_summary",
                    "fhir_resource_type": "Composition",
                    "extraction_method": "medgemma",
                    "text_length": 2048
                },
                {
                    "filename": "cbc.pdf",
                    "detected_hi_type": "lab_report",
                    "fhir_resource_type": "DiagnosticReport",
                    "extraction_method": "deterministic",
                    "text_length": 512
                }
            ],
            "fhir_bundle": {"resourceType": "Bundle", "entry": []},
            "metadata": {
                "generated_at": "2024-01-01T00:00:00Z",
                "medgemma_used": true,
                "profile": "https://nrces.in/ndhm/fhir/r4",
                "use_case": "claim_submission",
                "fhir_version": "4.0.1"
            }
        }"#;
        let resp: ConvertResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.documents_processed, 2);
        assert_eq!(resp.detection_for("cbc.pdf"), Some(HiType::LabReport));
        assert_eq!(resp.detection_for("other.pdf"), None);
        assert!(resp.metadata.medgemma_used);
    }
}
