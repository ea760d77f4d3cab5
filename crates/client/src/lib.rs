//! # Triage Client
//!
//! Async HTTP client for the triage service.
//!
//! Handles:
//! - Authentication (`/auth/login`, `/auth/me`) and bearer-token attachment
//! - Case lifecycle calls (`/triage/*`): intake upload, vitals, SOAP
//!   drafts, finalize, export
//! - Queue and EHR reads (`/triage/queue`, `/ehr/records`)
//!
//! The service owns every entity and all validation; this crate only moves
//! JSON and maps HTTP failures onto [`ApiError`]. The converter service has
//! its own client in `nhcx-convert`.

#![warn(rust_2018_idioms)]

mod client;
mod error;

pub use client::{ServiceStatus, TriageClient, DEFAULT_TRIAGE_URL};
pub use error::{ApiError, ApiResult};
