//! Healthcare-information (HI) type classification.
//!
//! Two classifiers with different jobs:
//! - [`guess_from_filename`] is the instant per-file badge shown while
//!   files are being selected. Pure keyword matching on the name; always
//!   a hint, replaced by the service's detection after conversion.
//! - [`detect_from_text`] scores document text against the embedded
//!   keyword profiles, for classifying pasted text without the service.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Supported ABDM HI types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiType {
    DischargeSummary,
    LabReport,
    ClinicalNote,
    Prescription,
    RadiologyReport,
}

impl HiType {
    /// Wire key, e.g. `discharge_summary`.
    pub fn as_key(&self) -> &'static str {
        match self {
            HiType::DischargeSummary => "discharge_summary",
            HiType::LabReport => "lab_report",
            HiType::ClinicalNote => "clinical_note",
            HiType::Prescription => "prescription",
            HiType::RadiologyReport => "radiology_report",
        }
    }

    /// Display label, e.g. `Discharge Summary`.
    pub fn label(&self) -> &'static str {
        match self {
            HiType::DischargeSummary => "Discharge Summary",
            HiType::LabReport => "Lab Report",
            HiType::ClinicalNote => "Clinical Note",
            HiType::Prescription => "Prescription",
            HiType::RadiologyReport => "Radiology Report",
        }
    }
}

impl std::fmt::Display for HiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl std::str::FromStr for HiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discharge_summary" => Ok(HiType::DischargeSummary),
            "lab_report" => Ok(HiType::LabReport),
            "clinical_note" => Ok(HiType::ClinicalNote),
            "prescription" => Ok(HiType::Prescription),
            "radiology_report" => Ok(HiType::RadiologyReport),
            other => Err(format!("unknown HI type: {other}")),
        }
    }
}

/// Guesses an HI type from a filename.
///
/// Pure and deterministic; unknown names fall back to `clinical_note`.
pub fn guess_from_filename(filename: &str) -> HiType {
    let n = filename.to_lowercase();
    if n.contains("discharge") || n.contains("summary") {
        HiType::DischargeSummary
    } else if n.contains("lab") || n.contains("path") || n.contains("test") || n.contains("blood") {
        HiType::LabReport
    } else if n.contains("radio") || n.contains("xray") || n.contains("mri") || n.contains("ct") {
        HiType::RadiologyReport
    } else if n.contains("prescription") || n.contains("rx") {
        HiType::Prescription
    } else {
        HiType::ClinicalNote
    }
}

#[derive(Debug, Deserialize)]
struct Profiles {
    hi_types: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    key: HiType,
    fhir_resource: String,
    keywords: Vec<String>,
}

fn profiles() -> &'static Profiles {
    static PROFILES: OnceLock<Profiles> = OnceLock::new();
    PROFILES.get_or_init(|| {
        serde_yaml::from_str(include_str!("profiles.yaml")).expect("embedded profiles parse")
    })
}

fn resource_for(hi_type: HiType) -> &'static str {
    profiles()
        .hi_types
        .iter()
        .find(|p| p.key == hi_type)
        .map(|p| p.fhir_resource.as_str())
        .unwrap_or("Composition")
}

/// Classifies document text into an HI type by keyword scoring.
///
/// A valid `hint` is trusted outright. Otherwise each profile scores one
/// point per keyword found in the lowercased text; the highest score wins,
/// ties going to the earlier profile, and a zero score falls back to
/// `clinical_note`. Returns the type together with the FHIR resource type
/// it maps to.
pub fn detect_from_text(text: &str, hint: Option<HiType>) -> (HiType, &'static str) {
    if let Some(h) = hint {
        return (h, resource_for(h));
    }

    let lower = text.to_lowercase();
    let mut best: Option<(HiType, usize)> = None;

    for profile in &profiles().hi_types {
        let score = profile
            .keywords
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .count();
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((profile.key, score)),
        }
    }

    match best {
        Some((hi_type, score)) if score > 0 => (hi_type, resource_for(hi_type)),
        _ => (HiType::ClinicalNote, resource_for(HiType::ClinicalNote)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filename_guess_matches_known_keywords() {
        assert_eq!(
            guess_from_filename("discharge_summary_jan.pdf"),
            HiType::DischargeSummary
        );
        assert_eq!(guess_from_filename("BLOOD_panel.pdf"), HiType::LabReport);
        assert_eq!(guess_from_filename("chest_xray_2.pdf"), HiType::RadiologyReport);
        assert_eq!(guess_from_filename("rx-march.pdf"), HiType::Prescription);
    }

    #[test]
    fn filename_guess_defaults_to_clinical_note() {
        assert_eq!(guess_from_filename("xyz.pdf"), HiType::ClinicalNote);
    }

    #[test]
    fn filename_guess_is_deterministic() {
        for name in ["discharge_summary_jan.pdf", "xyz.pdf", "lab_42.pdf"] {
            assert_eq!(guess_from_filename(name), guess_from_filename(name));
        }
    }

    #[test]
    fn text_detection_scores_keywords() {
        let (hi, resource) = detect_from_text(
            "Date of admission: 02/01. Hospital course uneventful. \
             Condition at discharge: stable.",
            None,
        );
        assert_eq!(hi, HiType::DischargeSummary);
        assert_eq!(resource, "Composition");

        let (hi, resource) = detect_from_text(
            "Specimen: serum. Test name: Hemoglobin. Reference range: 13-17.",
            None,
        );
        assert_eq!(hi, HiType::LabReport);
        assert_eq!(resource, "DiagnosticReport");
    }

    #[test]
    fn text_detection_falls_back_on_zero_score() {
        let (hi, _) = detect_from_text("completely unrelated text", None);
        assert_eq!(hi, HiType::ClinicalNote);
    }

    #[test]
    fn text_detection_trusts_hint() {
        let (hi, resource) = detect_from_text("specimen reference range", Some(HiType::Prescription));
        assert_eq!(hi, HiType::Prescription);
        assert_eq!(resource, "MedicationRequest");
    }

    #[test]
    fn wire_keys_round_trip() {
        let json = serde_json::to_string(&HiType::RadiologyReport).unwrap();
        assert_eq!(json, "\"radiology_report\"");
        let back: HiType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HiType::RadiologyReport);
        assert_eq!(back.label(), "Radiology Report");
    }
}
