//! Plain-text rendering of queues, cases and conversion results.

use nhcx_convert::{guess_from_filename, summarize, ConvertResponse};
use triage_types::{ExportedRecord, TriageCase};

pub fn queue(cases: &[TriageCase]) {
    if cases.is_empty() {
        println!("No patients waiting.");
        return;
    }
    for case in cases {
        let vitals = if case.vitals.is_some() {
            "vitals logged"
        } else {
            "vitals pending"
        };
        println!(
            "[{}] {}  patient={}  status={}  specialty={}  {}",
            case.display_tier(),
            case.id,
            case.patient_id,
            case.status,
            case.specialty,
            vitals
        );
    }
}

pub fn case_detail(case: &TriageCase) {
    println!("Case {}", case.id);
    println!("  patient:    {}", case.patient_id);
    println!("  status:     {}", case.status);
    println!("  tier:       {} (risk score {})", case.display_tier(), case.risk_score);
    println!("  specialty:  {}", case.specialty);
    println!("  language:   {}", case.language);
    println!("  created:    {}", case.created_at);
    println!("  updated:    {}", case.updated_at);

    if !case.transcription.is_empty() {
        println!("  transcription:");
        println!("    {}", case.transcription);
    }
    if let Some(vitals) = &case.vitals {
        println!("  vitals (recorded by {} at {}):", vitals.recorded_by, vitals.recorded_at);
        println!(
            "    temp {:.1} C, BP {}/{} mmHg, HR {} bpm, RR {}/min, SpO2 {}%",
            vitals.temperature,
            vitals.blood_pressure_systolic,
            vitals.blood_pressure_diastolic,
            vitals.heart_rate,
            vitals.respiratory_rate,
            vitals.oxygen_saturation
        );
    }
    if let Some(note) = &case.soap_note {
        println!("  SOAP note:");
        println!("    Subjective: {}", note.subjective);
        println!("    Objective:  {}", note.objective);
        println!("    Assessment: {}", note.assessment);
        println!("    Plan:       {}", note.plan);
    }
}

pub fn records(records: &[ExportedRecord]) {
    if records.is_empty() {
        println!("No records exported yet.");
        return;
    }
    for record in records {
        println!(
            "patient={}  exported={}  bundle={}",
            record.patient_id,
            record.exported_at,
            record.bundle_id().unwrap_or("-")
        );
    }
}

pub fn record_detail(record: &ExportedRecord) {
    println!(
        "FHIR Clinical Document Bundle: patient {} (exported {})",
        record.patient_id, record.exported_at
    );

    let summary = summarize(&record.fhir_bundle);
    if summary.is_empty() {
        println!("No clinical sections found in this bundle.");
        return;
    }
    if !summary.sections.is_empty() {
        println!("Composition (SOAP note):");
        for section in &summary.sections {
            let text = if section.text.is_empty() {
                "No content available"
            } else {
                &section.text
            };
            println!("  {}: {}", section.title, text);
        }
    }
    if !summary.observations.is_empty() {
        println!("Observations (vitals):");
        for obs in &summary.observations {
            println!("  {}: {}", obs.label, obs.value);
        }
    }
}

/// Result badges plus per-file classification, server detections replacing
/// the filename guesses shown at selection time.
pub fn convert_outcome(response: &ConvertResponse) {
    let method = if response.metadata.medgemma_used {
        "MedGemma"
    } else {
        "Deterministic"
    };
    let plural = if response.documents_processed == 1 { "" } else { "s" };
    println!(
        "{} doc{plural} | {method} | NHCX Claim | {}",
        response.documents_processed,
        response
            .detected_hi_types
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    for result in &response.document_results {
        let guessed = guess_from_filename(&result.filename);
        let note = if guessed == result.detected_hi_type {
            String::new()
        } else {
            format!(" (guessed {})", guessed.label())
        };
        println!(
            "  {}: {} -> {} via {}{note}",
            result.filename,
            result.detected_hi_type.label(),
            result.fhir_resource_type,
            result.extraction_method
        );
    }

    if !response.metadata.fhir_version.is_empty() {
        println!("Bundle generated | FHIR {}", response.metadata.fhir_version);
    }
}
