use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exported record in the mock EHR repository.
///
/// The bundle itself is opaque nested JSON (`entry[].resource`), displayed
/// read-only; the console never validates or edits FHIR content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedRecord {
    pub patient_id: String,
    pub exported_at: DateTime<Utc>,
    pub fhir_bundle: serde_json::Value,
}

impl ExportedRecord {
    /// The bundle's own `id`, when the backend supplied one.
    pub fn bundle_id(&self) -> Option<&str> {
        self.fhir_bundle.get("id").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_with_opaque_bundle() {
        let body = r#"{
            "patient_id": "P-001",
            "exported_at": "2024-01-01T10:00:00Z",
            "fhir_bundle": {
                "resourceType": "Bundle",
                "id": "b-123",
                "type": "document",
                "entry": []
            }
        }"#;
        let record: ExportedRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.bundle_id(), Some("b-123"));
        assert_eq!(record.fhir_bundle["resourceType"], "Bundle");
    }

    #[test]
    fn bundle_id_absent_when_missing() {
        let record = ExportedRecord {
            patient_id: "P-002".into(),
            exported_at: "2024-01-01T10:00:00Z".parse().unwrap(),
            fhir_bundle: serde_json::json!({"resourceType": "Bundle"}),
        };
        assert_eq!(record.bundle_id(), None);
    }
}
