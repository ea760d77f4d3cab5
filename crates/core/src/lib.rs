//! # Triage Core
//!
//! Workflow engine for the triage console:
//! - [`session::SessionStore`]: file-backed session persistence (a sign-in
//!   survives until explicit logout)
//! - [`poll`]: poll-and-replace queue watching plus the bounded
//!   post-submission status poll
//! - [`recorder`]: the audio capture state machine feeding intake uploads
//!
//! **No API concerns**: HTTP calls live in `triage-client`; this crate is
//! driven by the console and hands it plain data.

pub mod poll;
pub mod recorder;
pub mod session;

pub use poll::{
    await_terminal, doctor_view, nurse_view, spawn_watcher, PollError, PollPolicy, WatcherHandle,
    DOCTOR_QUEUE_INTERVAL, EHR_REFRESH_INTERVAL, NURSE_QUEUE_INTERVAL,
};
pub use recorder::{load_audio, Recorder, RecorderError, RecorderState};
pub use session::{SessionError, SessionStore};
