//! Environment configuration, session loading and role gating.

use anyhow::{bail, Context};
use triage_client::TriageClient;
use triage_core::SessionStore;
use triage_types::{Role, Session};

/// Triage service base URL (`TRIAGE_API_URL`).
pub fn triage_url() -> String {
    std::env::var("TRIAGE_API_URL").unwrap_or_else(|_| triage_client::DEFAULT_TRIAGE_URL.into())
}

/// Conversion service base URL (`NHCX_API_URL`).
pub fn convert_url() -> String {
    std::env::var("NHCX_API_URL").unwrap_or_else(|_| nhcx_convert::DEFAULT_CONVERT_URL.into())
}

pub fn store() -> SessionStore {
    SessionStore::from_env()
}

/// A triage client carrying the stored session's token when one exists.
pub fn client() -> anyhow::Result<TriageClient> {
    let client = TriageClient::new(&triage_url())?;
    Ok(match store().load() {
        Some(session) => client.with_token(session.token),
        None => client,
    })
}

/// The workspace gate: commands for a station require a sign-in with the
/// matching role, the way each screen bounces other roles back to login.
pub fn require_role(role: Role) -> anyhow::Result<Session> {
    let session = store()
        .load()
        .context("not signed in; run `triage login <hospital-id>` first")?;
    if session.user.role != role {
        bail!(
            "the {} workspace requires a {role} sign-in (you are signed in as {})",
            role.workspace(),
            session.user.role
        );
    }
    Ok(session)
}
