use reqwest::multipart;
use serde::Deserialize;
use tracing::{debug, info};
use triage_types::{
    AudioBlob, AuthResponse, ExportedRecord, HospitalId, Patient, PatientId, Session, SoapNote,
    TriageCase, UserSession, VitalSigns,
};

use crate::error::{ApiError, ApiResult};

/// Default triage service URL (local development).
pub const DEFAULT_TRIAGE_URL: &str = "http://localhost:8000";

/// HTTP timeout for triage service requests.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Root liveness response (`GET /`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Client for the triage service.
///
/// Cheap to clone-by-reconstruction; holds a pooled `reqwest::Client`, the
/// validated base URL, and (after sign-in) the bearer token attached to
/// every request.
#[derive(Debug, Clone)]
pub struct TriageClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl TriageClient {
    /// Creates a client against the given base URL.
    ///
    /// The URL must parse and use an `http` or `https` scheme; a trailing
    /// slash is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] for an unparseable URL or wrong scheme.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let cleaned = base_url.trim_end_matches('/');

        let parsed = url::Url::parse(cleaned)
            .map_err(|e| ApiError::Url(format!("cannot parse '{cleaned}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Url(format!(
                "URL must use http or https, got: {}",
                parsed.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        debug!("triage client created for {cleaned}");

        Ok(Self {
            http,
            base_url: cleaned.to_string(),
            token: None,
        })
    }

    /// Attaches a bearer token to all subsequent requests.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Creates a client carrying the token of a stored session.
    pub fn from_session(base_url: &str, session: &Session) -> ApiResult<Self> {
        Ok(Self::new(base_url)?.with_token(session.token.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(format!("{}{path}", self.base_url)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(format!("{}{path}", self.base_url)))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Service liveness (`GET /`).
    pub async fn ping(&self) -> ApiResult<ServiceStatus> {
        let response = self.get("/").send().await?;
        handle_response(response).await
    }

    /// Exchanges credentials for a token (`POST /auth/login`).
    pub async fn login(&self, hospital_id: &HospitalId, password: &str) -> ApiResult<AuthResponse> {
        let response = self
            .post("/auth/login")
            .json(&serde_json::json!({
                "hospital_id": hospital_id,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthResponse = handle_response(response).await?;
        info!("signed in as {} ({})", auth.user.name, auth.user.role);
        Ok(auth)
    }

    /// Asks the service to verify a token (`GET /auth/me`).
    pub async fn me(&self, token: &str) -> ApiResult<UserSession> {
        let response = self
            .get("/auth/me")
            .query(&[("token", token)])
            .send()
            .await?;
        handle_response(response).await
    }

    /// Looks up registered patient demographics (`GET /patients/{id}`).
    pub async fn patient(&self, hospital_id: &str) -> ApiResult<Patient> {
        let response = self.get(&format!("/patients/{hospital_id}")).send().await?;
        handle_response(response).await
    }

    /// Fetches the triage queue, optionally filtered by specialty
    /// (`GET /triage/queue`).
    pub async fn queue(&self, specialty: Option<&str>) -> ApiResult<Vec<TriageCase>> {
        let mut req = self.get("/triage/queue");
        if let Some(s) = specialty {
            req = req.query(&[("specialty", s)]);
        }
        let response = req.send().await?;
        handle_response(response).await
    }

    /// Fetches one triage case (`GET /triage/{id}`).
    pub async fn case(&self, id: &str) -> ApiResult<TriageCase> {
        let response = self.get(&format!("/triage/{id}")).send().await?;
        handle_response(response).await
    }

    /// Uploads a complaint recording and starts the triage pipeline
    /// (`POST /triage/`, multipart).
    ///
    /// The returned case starts in a non-terminal status; callers that need
    /// the pipeline result poll it afterwards.
    pub async fn create_case(
        &self,
        patient_id: &PatientId,
        language: &str,
        audio: AudioBlob,
    ) -> ApiResult<TriageCase> {
        let part = multipart::Part::bytes(audio.data)
            .file_name(audio.file_name)
            .mime_str(&audio.media_type)?;
        let form = multipart::Form::new()
            .text("patient_id", patient_id.to_string())
            .text("language", language.to_owned())
            .part("audio", part);

        let response = self.post("/triage/").multipart(form).send().await?;
        let case: TriageCase = handle_response(response).await?;
        info!("created triage case {} for {}", case.id, case.patient_id);
        Ok(case)
    }

    /// Records vital signs on a case (`POST /triage/{id}/vitals`).
    pub async fn submit_vitals(&self, id: &str, vitals: &VitalSigns) -> ApiResult<TriageCase> {
        let response = self
            .post(&format!("/triage/{id}/vitals"))
            .json(vitals)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Saves a SOAP note draft (`POST /triage/{id}/soap`).
    pub async fn save_soap(&self, id: &str, note: &SoapNote) -> ApiResult<TriageCase> {
        let response = self
            .post(&format!("/triage/{id}/soap"))
            .json(note)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Marks a case reviewed and approved (`POST /triage/{id}/finalize`).
    pub async fn finalize(&self, id: &str) -> ApiResult<TriageCase> {
        let response = self.post(&format!("/triage/{id}/finalize")).send().await?;
        handle_response(response).await
    }

    /// Starts the background FHIR export (`POST /triage/{id}/export`).
    ///
    /// The export runs server-side; the record appears in `/ehr/records`
    /// once conversion completes.
    pub async fn export(&self, id: &str) -> ApiResult<TriageCase> {
        let response = self.post(&format!("/triage/{id}/export")).send().await?;
        handle_response(response).await
    }

    /// Lists all exported FHIR records (`GET /ehr/records`).
    pub async fn ehr_records(&self) -> ApiResult<Vec<ExportedRecord>> {
        let response = self.get("/ehr/records").send().await?;
        handle_response(response).await
    }
}

/// Maps an HTTP response onto the error taxonomy, decoding the body on
/// success.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> ApiResult<T> {
    let status = response.status();
    match status {
        s if s.is_success() => Ok(response.json().await?),
        reqwest::StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        reqwest::StatusCode::FORBIDDEN => {
            Err(ApiError::Forbidden(detail_message(response).await))
        }
        reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound(detail_message(response).await)),
        reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ApiError::Validation(detail_message(response).await))
        }
        _ => Err(ApiError::Server {
            status: status.as_u16(),
            message: detail_message(response).await,
        }),
    }
}

/// Extracts the service's `{"detail": ...}` error body, falling back to the
/// raw text.
async fn detail_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    parse_detail(&body).unwrap_or(body)
}

fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_validates_url() {
        assert!(TriageClient::new("http://localhost:8000").is_ok());
        assert!(TriageClient::new("http://localhost:8000/").is_ok());
        assert!(TriageClient::new("not-a-url").is_err());
        assert!(matches!(
            TriageClient::new("ftp://localhost:8000"),
            Err(ApiError::Url(_))
        ));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TriageClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn parse_detail_reads_service_errors() {
        assert_eq!(
            parse_detail(r#"{"detail": "Triage record not found"}"#),
            Some("Triage record not found".to_string())
        );
        assert_eq!(parse_detail("plain text body"), None);
        assert_eq!(parse_detail(r#"{"detail": ["field", "error"]}"#), None);
    }

    /// Integration check against a locally running triage service.
    /// Run with: cargo test triage_service_roundtrip -- --ignored
    #[tokio::test]
    #[ignore]
    async fn triage_service_roundtrip() {
        let client = TriageClient::new(DEFAULT_TRIAGE_URL).expect("client");

        let status = client.ping().await.expect("service reachable");
        assert_eq!(status.status, "online");

        let auth = client
            .login(&HospitalId::new("nur_01").unwrap(), "password")
            .await
            .expect("demo login");
        let client = client.with_token(auth.token);

        let queue = client.queue(None).await.expect("queue");
        println!("queue has {} cases", queue.len());
    }
}
