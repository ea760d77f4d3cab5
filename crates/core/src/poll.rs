//! Poll-and-replace state refresh.
//!
//! The console keeps its lists approximately fresh the same way the
//! station screens do: a fixed-interval refetch replaces the whole local
//! snapshot with the latest server response, filtered client-side by
//! status. The guarantee is eventual consistency only: there is no
//! ordering between a just-submitted mutation and the next tick, so a save
//! can stay invisible until the interval elapses.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use triage_types::{TriageCase, TriageStatus};

/// Refresh cadence of the nurse queue view.
pub const NURSE_QUEUE_INTERVAL: Duration = Duration::from_secs(10);
/// Refresh cadence of the doctor queue view.
pub const DOCTOR_QUEUE_INTERVAL: Duration = Duration::from_secs(15);
/// Refresh cadence of the EHR record list.
pub const EHR_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Nurse station view: cases still needing vitals or in the pipeline.
/// Finalized (and already-exported) cases never appear here.
pub fn nurse_view(mut cases: Vec<TriageCase>) -> Vec<TriageCase> {
    cases.retain(|c| !matches!(c.status, TriageStatus::Finalized | TriageStatus::Exported));
    cases
}

/// Doctor review view: only cases awaiting review or already finalized.
pub fn doctor_view(mut cases: Vec<TriageCase>) -> Vec<TriageCase> {
    cases.retain(|c| {
        matches!(
            c.status,
            TriageStatus::ReadyForReview | TriageStatus::Finalized
        )
    });
    cases
}

/// Handle to a running watcher task.
///
/// Dropping the handle (or calling [`stop`](Self::stop)) aborts the loop;
/// any in-flight fetch is discarded with it, so a late response can never
/// update a stopped watcher.
#[derive(Debug)]
pub struct WatcherHandle<T> {
    snapshot: Arc<RwLock<Vec<T>>>,
    task: JoinHandle<()>,
}

impl<T: Clone> WatcherHandle<T> {
    /// The most recent successfully fetched snapshot (empty before the
    /// first success).
    pub async fn latest(&self) -> Vec<T> {
        self.snapshot.read().await.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl<T> Drop for WatcherHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a fixed-interval poll-and-replace loop.
///
/// The first fetch runs immediately, then once per `interval`. Each
/// success replaces the entire snapshot; a failed fetch is logged and the
/// previous snapshot retained.
pub fn spawn_watcher<T, F, Fut, E>(interval: Duration, mut fetch: F) -> WatcherHandle<T>
where
    T: Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, E>> + Send,
    E: std::fmt::Display + Send,
{
    let snapshot = Arc::new(RwLock::new(Vec::new()));
    let shared = Arc::clone(&snapshot);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match fetch().await {
                Ok(items) => {
                    debug!("refresh replaced snapshot with {} items", items.len());
                    *shared.write().await = items;
                }
                Err(e) => warn!("refresh failed, keeping previous snapshot: {e}"),
            }
        }
    });

    WatcherHandle { snapshot, task }
}

/// Cadence and ceiling of the post-submission status poll.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// 6 checks, 20 s apart: a 2-minute ceiling on waiting for the audio
    /// pipeline.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(20),
            max_attempts: 6,
        }
    }
}

/// The status poll gave up without observing a terminal status.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("triage processing did not complete within {attempts} status checks")]
    TimedOut {
        attempts: u32,
        /// Last status seen, if any check got through at all.
        last_status: Option<TriageStatus>,
    },
}

/// Polls one case's status at a fixed cadence until it turns terminal.
///
/// Each attempt waits `policy.interval`, then fetches; a network failure
/// consumes an attempt exactly like a still-processing status does (the
/// caller cannot tell them apart, by contract). There is no backoff and no
/// retry beyond the bounded loop; on exhaustion the caller gets a generic
/// timed-out error carrying the attempt count.
pub async fn await_terminal<F, Fut, E>(policy: PollPolicy, mut fetch: F) -> Result<TriageCase, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TriageCase, E>>,
    E: std::fmt::Display,
{
    let mut last_status = None;

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        match fetch().await {
            Ok(case) => {
                last_status = Some(case.status);
                if case.status.is_terminal() {
                    debug!("case {} terminal after {attempt} checks: {}", case.id, case.status);
                    return Ok(case);
                }
                debug!("check {attempt}: case {} still {}", case.id, case.status);
            }
            Err(e) => warn!("status check {attempt} failed: {e}"),
        }
    }

    Err(PollError::TimedOut {
        attempts: policy.max_attempts,
        last_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn case_with(id: &str, status: TriageStatus) -> TriageCase {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "patient_id": "P-001",
            "status": status,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn all_statuses() -> Vec<TriageCase> {
        vec![
            case_with("a", TriageStatus::Pending),
            case_with("b", TriageStatus::InProgress),
            case_with("c", TriageStatus::ReadyForReview),
            case_with("d", TriageStatus::Finalized),
            case_with("e", TriageStatus::Exported),
            case_with("f", TriageStatus::Failed),
        ]
    }

    #[test]
    fn nurse_view_never_shows_finalized() {
        let visible = nurse_view(all_statuses());
        assert!(visible
            .iter()
            .all(|c| !matches!(c.status, TriageStatus::Finalized | TriageStatus::Exported)));
        let ids: Vec<_> = visible.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "f"]);
    }

    #[test]
    fn doctor_view_shows_only_review_and_finalized() {
        let visible = doctor_view(all_statuses());
        let ids: Vec<_> = visible.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c", "d"]);
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts: 6,
        }
    }

    #[tokio::test]
    async fn poll_stops_after_exactly_six_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = await_terminal(fast_policy(), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::convert::Infallible>(case_with("t-1", TriageStatus::InProgress))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        match result {
            Err(PollError::TimedOut {
                attempts,
                last_status,
            }) => {
                assert_eq!(attempts, 6);
                assert_eq!(last_status, Some(TriageStatus::InProgress));
            }
            Ok(_) => panic!("expected timeout"),
        }
    }

    #[tokio::test]
    async fn poll_stops_early_on_terminal_status() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = await_terminal(fast_policy(), move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                let status = if n >= 3 {
                    TriageStatus::ReadyForReview
                } else {
                    TriageStatus::InProgress
                };
                Ok::<_, std::convert::Infallible>(case_with("t-2", status))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap().status, TriageStatus::ReadyForReview);
    }

    #[tokio::test]
    async fn fetch_failures_consume_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = await_terminal::<_, _, String>(fast_policy(), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("connection refused".to_string())
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        match result {
            Err(PollError::TimedOut { last_status, .. }) => assert_eq!(last_status, None),
            Ok(_) => panic!("expected timeout"),
        }
    }

    #[tokio::test]
    async fn watcher_replaces_snapshot_and_survives_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let handle = spawn_watcher(Duration::from_millis(20), move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 2 {
                    // One bad tick: the previous snapshot must survive it.
                    Err("refresh failed".to_string())
                } else {
                    Ok(vec![case_with(&format!("t-{n}"), TriageStatus::Pending)])
                }
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = handle.latest().await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "t-1");

        tokio::time::sleep(Duration::from_millis(150)).await;
        let later = handle.latest().await;
        assert_eq!(later.len(), 1);
        // The failed tick never clobbered the list; later ticks replaced it.
        assert_ne!(later[0].id, "t-1");

        handle.stop();
    }
}
