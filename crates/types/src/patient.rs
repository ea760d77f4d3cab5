use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered patient demographics, as served by `GET /patients/{id}`.
///
/// Intake uses this to confirm the identifier before recording and to
/// prefill the consultation language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub hospital_id: String,
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub contact_number: String,
    pub address: String,
    pub preferred_language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_patient_record() {
        let body = r#"{
            "id": "3f0a2e9c-0000-0000-0000-000000000000",
            "hospital_id": "P-001",
            "name": "Ramesh Kumar",
            "date_of_birth": "1980-05-14",
            "gender": "Male",
            "contact_number": "9876543210",
            "address": "123 Anna Salai, Chennai",
            "preferred_language": "Tamil",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let patient: Patient = serde_json::from_str(body).unwrap();
        assert_eq!(patient.hospital_id, "P-001");
        assert_eq!(patient.preferred_language, "Tamil");
    }
}
