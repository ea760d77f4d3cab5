use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a triage case, owned and driven by the backend.
///
/// The console only observes the progression
/// `pending → in_progress → ready_for_review → finalized → exported`,
/// except where an explicit action call (finalize, export) requests the
/// next step. `failed` is the backend's dead end for a broken pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageStatus {
    Pending,
    InProgress,
    ReadyForReview,
    Finalized,
    Exported,
    #[serde(alias = "failed_ai_init")]
    Failed,
}

impl TriageStatus {
    /// True for statuses the post-submission poll stops on: the audio
    /// pipeline has either produced a reviewable case or given up.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TriageStatus::ReadyForReview
                | TriageStatus::Finalized
                | TriageStatus::Exported
                | TriageStatus::Failed
        )
    }
}

impl std::fmt::Display for TriageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TriageStatus::Pending => "pending",
            TriageStatus::InProgress => "in_progress",
            TriageStatus::ReadyForReview => "ready_for_review",
            TriageStatus::Finalized => "finalized",
            TriageStatus::Exported => "exported",
            TriageStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Severity bucket assigned by the backend's triage scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriageTier {
    Routine,
    SemiUrgent,
    Urgent,
    Emergency,
}

impl std::fmt::Display for TriageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TriageTier::Emergency => "EMERGENCY",
            TriageTier::Urgent => "URGENT",
            TriageTier::SemiUrgent => "SEMI_URGENT",
            TriageTier::Routine => "ROUTINE",
        };
        write!(f, "{s}")
    }
}

/// Clinical measurements recorded at the nursing station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    /// Celsius
    pub temperature: f64,
    /// mmHg
    pub blood_pressure_systolic: i32,
    /// mmHg
    pub blood_pressure_diastolic: i32,
    /// beats per minute
    pub heart_rate: i32,
    /// breaths per minute
    pub respiratory_rate: i32,
    /// percentage
    pub oxygen_saturation: i32,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: String,
}

/// Structured clinical note: Subjective / Objective / Assessment / Plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapNote {
    #[serde(default)]
    pub subjective: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub plan: String,
}

fn default_specialty() -> String {
    "General Medicine".to_owned()
}

/// One triage case as served by the backend.
///
/// Everything here is backend-owned; deserialization fills in defaults for
/// fields older records may omit rather than rejecting the whole payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageCase {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub soap_note: Option<SoapNote>,
    #[serde(default)]
    pub vitals: Option<VitalSigns>,
    #[serde(default)]
    pub risk_score: i32,
    #[serde(default = "default_specialty")]
    pub specialty: String,
    #[serde(default)]
    pub triage_tier: Option<TriageTier>,
    pub status: TriageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TriageCase {
    /// Tier for display. Cases the backend has not scored yet show ROUTINE.
    pub fn display_tier(&self) -> TriageTier {
        self.triage_tier.unwrap_or(TriageTier::Routine)
    }
}
