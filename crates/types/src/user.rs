use serde::{Deserialize, Serialize};

/// Staff role, as assigned by the backend at sign-in.
///
/// The role decides which console workspace a user lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Receptionist,
    Nurse,
    Doctor,
}

impl Role {
    /// Human-readable workspace hint shown after sign-in.
    pub fn workspace(&self) -> &'static str {
        match self {
            Role::Receptionist => "intake",
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Receptionist => "receptionist",
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
        };
        write!(f, "{s}")
    }
}

/// A signed-in hospital staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub hospital_id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    /// Token lifetime in seconds. Informational only; the console keeps a
    /// session until explicit logout.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// An active console session: the bearer token plus the user it belongs to.
///
/// Held in memory and persisted by the session store for the lifetime of
/// the sign-in. There is no refresh and no client-side expiry check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Response body of `GET /auth/me`: the backend's view of a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub specialty: Option<String>,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u3".into(),
            hospital_id: "doc_cardio".into(),
            name: "Dr. Sharma".into(),
            role: Role::Doctor,
            specialty: Some("Cardiac".into()),
        }
    }

    #[test]
    fn role_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Nurse).unwrap(), "\"nurse\"");
        let role: Role = serde_json::from_str("\"receptionist\"").unwrap();
        assert_eq!(role, Role::Receptionist);
    }

    #[test]
    fn auth_response_round_trips() {
        let body = r#"{
            "token": "jwt.here",
            "user": {
                "id": "u2",
                "hospital_id": "nur_01",
                "name": "Nurse Anita",
                "role": "nurse",
                "specialty": null
            },
            "expires_in": 28800
        }"#;
        let resp: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.user.role, Role::Nurse);
        assert_eq!(resp.expires_in, Some(28800));
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = Session::new("tok", sample_user());
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
