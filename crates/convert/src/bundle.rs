//! Parsed clinical view of an opaque FHIR bundle.
//!
//! Pulls out what the record screens show alongside the raw JSON: the
//! Composition's SOAP sections (narrative with markup stripped) and the
//! vital-sign Observations. Anything the bundle does not carry simply
//! comes back empty; the bundle itself is never validated.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationView {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct BundleSummary {
    pub sections: Vec<SectionView>,
    pub observations: Vec<ObservationView>,
}

impl BundleSummary {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.observations.is_empty()
    }
}

/// Extracts the clinical content of `entry[].resource` for display.
pub fn summarize(bundle: &Value) -> BundleSummary {
    let mut summary = BundleSummary::default();

    let entries = match bundle.get("entry").and_then(|e| e.as_array()) {
        Some(entries) => entries,
        None => return summary,
    };

    for entry in entries {
        let resource = &entry["resource"];
        match resource["resourceType"].as_str() {
            Some("Composition") => {
                if let Some(sections) = resource["section"].as_array() {
                    for section in sections {
                        summary.sections.push(SectionView {
                            title: section["title"].as_str().unwrap_or("Untitled").to_string(),
                            text: strip_tags(section["text"]["div"].as_str().unwrap_or("")),
                        });
                    }
                }
            }
            Some("Observation") => summary.observations.push(observation_view(resource)),
            _ => {}
        }
    }

    summary
}

fn observation_view(resource: &Value) -> ObservationView {
    let label = resource["code"]["coding"]
        .as_array()
        .and_then(|c| c.first())
        .and_then(|c| c["display"].as_str())
        .unwrap_or("Unknown Observation")
        .to_string();

    let value = if let Some(quantity) = resource.get("valueQuantity") {
        let unit = quantity["unit"].as_str().unwrap_or("");
        format!("{} {unit}", render_number(&quantity["value"]))
            .trim_end()
            .to_string()
    } else if let Some(components) = resource["component"].as_array() {
        // Blood pressure arrives as systolic/diastolic components.
        let systolic = components
            .first()
            .map(|c| render_number(&c["valueQuantity"]["value"]))
            .unwrap_or_else(|| "?".into());
        let diastolic = components
            .get(1)
            .map(|c| render_number(&c["valueQuantity"]["value"]))
            .unwrap_or_else(|| "?".into());
        format!("{systolic}/{diastolic} mmHg")
    } else {
        "N/A".to_string()
    };

    ObservationView { label, value }
}

fn render_number(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => "?".to_string(),
    }
}

/// Strips XHTML/XML tags from narrative text.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_bundle() -> Value {
        json!({
            "resourceType": "Bundle",
            "id": "b-1",
            "type": "document",
            "entry": [
                {
                    "resource": {
                        "resourceType": "Composition",
                        "title": "Triage Summary - P-001",
                        "section": [
                            {
                                "title": "Subjective",
                                "text": {
                                    "status": "generated",
                                    "div": "<div xmlns=\"http://www.w3.org/1999/xhtml\">Chest pain since morning.</div>"
                                }
                            },
                            {"title": "Plan", "text": {"div": "<div>ECG stat.</div>"}}
                        ]
                    }
                },
                {
                    "resource": {
                        "resourceType": "Observation",
                        "code": {"coding": [{"code": "8310-5", "display": "Body temperature"}]},
                        "valueQuantity": {"value": 37.2, "unit": "Cel"}
                    }
                },
                {
                    "resource": {
                        "resourceType": "Observation",
                        "code": {"coding": [{"code": "85354-9", "display": "Blood pressure"}]},
                        "component": [
                            {"valueQuantity": {"value": 142}},
                            {"valueQuantity": {"value": 91}}
                        ]
                    }
                },
                {
                    "resource": {"resourceType": "Patient", "id": "P-001"}
                }
            ]
        })
    }

    #[test]
    fn extracts_composition_sections_with_tags_stripped() {
        let summary = summarize(&sample_bundle());
        assert_eq!(
            summary.sections,
            vec![
                SectionView {
                    title: "Subjective".into(),
                    text: "Chest pain since morning.".into()
                },
                SectionView {
                    title: "Plan".into(),
                    text: "ECG stat.".into()
                },
            ]
        );
    }

    #[test]
    fn extracts_observation_values() {
        let summary = summarize(&sample_bundle());
        assert_eq!(
            summary.observations,
            vec![
                ObservationView {
                    label: "Body temperature".into(),
                    value: "37.2 Cel".into()
                },
                ObservationView {
                    label: "Blood pressure".into(),
                    value: "142/91 mmHg".into()
                },
            ]
        );
    }

    #[test]
    fn empty_or_foreign_bundles_summarize_empty() {
        assert!(summarize(&json!({"resourceType": "Bundle"})).is_empty());
        assert!(summarize(&json!({"entry": []})).is_empty());
    }

    #[test]
    fn observation_without_values_is_na() {
        let summary = summarize(&json!({
            "entry": [{"resource": {"resourceType": "Observation", "code": {}}}]
        }));
        assert_eq!(summary.observations[0].label, "Unknown Observation");
        assert_eq!(summary.observations[0].value, "N/A");
    }

    #[test]
    fn strip_tags_handles_nested_markup() {
        assert_eq!(strip_tags("<div><b>bold</b> text</div>"), "bold text");
        assert_eq!(strip_tags("no markup"), "no markup");
        assert_eq!(strip_tags(""), "");
    }
}
