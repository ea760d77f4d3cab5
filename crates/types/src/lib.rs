//! # Triage Types
//!
//! Shared domain types for the triage console.
//!
//! These mirror the JSON shapes served by the triage backend. The backend
//! owns every entity and all validation; this crate only gives the wire
//! shapes names and keeps deserialization tolerant of fields the client
//! does not use.

pub mod audio;
pub mod ehr;
pub mod ids;
pub mod patient;
pub mod triage;
pub mod user;

pub use audio::AudioBlob;
pub use ehr::ExportedRecord;
pub use ids::{HospitalId, IdError, PatientId};
pub use patient::Patient;
pub use triage::{SoapNote, TriageCase, TriageStatus, TriageTier, VitalSigns};
pub use user::{AuthResponse, Role, Session, User, UserSession};
