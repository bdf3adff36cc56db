use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::KuaiError;

pub const DEFAULT_RETRY_COUNT: u32 = 5;
/// Fixed delay between attempts, no backoff, no jitter. The bounded retry
/// only covers the startup race between resource creation and pod
/// scheduling.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Everything one `logs` invocation needs, constructed once and never
/// mutated.
#[derive(Debug, Clone)]
pub struct LogRequest {
    pub pod_names: Vec<String>,
    pub namespace: String,
    pub follow: bool,
    pub since_seconds: Option<i64>,
    pub since_time: Option<DateTime<Utc>>,
    /// `None` means all lines.
    pub tail_lines: Option<i64>,
    pub timestamps: bool,
    pub retry_count: u32,
    pub retry_delay: Duration,
}

/// Resolves the concrete pod name(s) to read from: the explicit instance if
/// one was requested, otherwise the first worker replica of the job.
pub fn resolve_pod_names(job_name: &str, instance: Option<&str>) -> Vec<String> {
    match instance {
        Some(pod) => vec![pod.to_string()],
        None => vec![format!("{job_name}-worker-0")],
    }
}

/// One attempt at reading a pod's log output. Implementations forward the
/// received lines to the caller (stdout for the CLI) and report the pod's
/// terminated exit status once the read completes, if one is available.
#[async_trait]
pub trait PodLogSource {
    async fn read(&self, pod_name: &str, request: &LogRequest) -> Result<Option<i32>, KuaiError>;
}

pub struct LogStreamReader<S> {
    source: S,
}

impl<S: PodLogSource> LogStreamReader<S> {
    pub fn new(source: S) -> Self {
        LogStreamReader { source }
    }

    /// Reads logs for every requested pod. Returns the last observed
    /// non-zero pod exit status, or 0 — the caller propagates it as the
    /// command's own exit code.
    pub async fn run(&self, request: &LogRequest) -> Result<i32, KuaiError> {
        let mut exit_code = 0;
        for pod_name in &request.pod_names {
            if let Some(code) = self.read_pod(pod_name, request).await? {
                if code != 0 {
                    exit_code = code;
                }
            }
        }
        Ok(exit_code)
    }

    async fn read_pod(
        &self,
        pod_name: &str,
        request: &LogRequest,
    ) -> Result<Option<i32>, KuaiError> {
        let attempts = request.retry_count.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match self.source.read(pod_name, request).await {
                Ok(code) => return Ok(code),
                Err(err) => {
                    debug!(pod = %pod_name, attempt, error = %err, "log read failed");
                    last_error = err.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(request.retry_delay).await;
                    }
                }
            }
        }
        Err(KuaiError::LogRetrieval(format!(
            "{last_error} ({attempts} attempts), please use \"kuai list\" to get more information"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct FakeSource {
        attempts: Arc<AtomicU32>,
        /// Succeed on this attempt with the given exit code; never succeed
        /// if `None`.
        succeed_on: Option<(u32, Option<i32>)>,
    }

    #[async_trait]
    impl PodLogSource for FakeSource {
        async fn read(
            &self,
            _pod_name: &str,
            _request: &LogRequest,
        ) -> Result<Option<i32>, KuaiError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match self.succeed_on {
                Some((on, code)) if attempt >= on => Ok(code),
                _ => Err(KuaiError::LogRetrieval("container not ready".to_string())),
            }
        }
    }

    fn request(retry_count: u32, retry_delay: Duration) -> LogRequest {
        LogRequest {
            pod_names: vec!["job-a-worker-0".to_string()],
            namespace: "default".to_string(),
            follow: false,
            since_seconds: None,
            since_time: None,
            tail_lines: None,
            timestamps: false,
            retry_count,
            retry_delay,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_exactly_retry_count_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let reader = LogStreamReader::new(FakeSource {
            attempts: attempts.clone(),
            succeed_on: None,
        });
        let delay = Duration::from_secs(5);
        let started = tokio::time::Instant::now();

        let err = reader.run(&request(5, delay)).await.unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        assert!(matches!(err, KuaiError::LogRetrieval(_)));
        // 5 attempts are separated by 4 fixed delays; none after the last.
        assert_eq!(started.elapsed(), delay * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_retrying_once_a_read_succeeds() {
        let attempts = Arc::new(AtomicU32::new(0));
        let reader = LogStreamReader::new(FakeSource {
            attempts: attempts.clone(),
            succeed_on: Some((3, None)),
        });

        let code = reader.run(&request(5, Duration::from_secs(5))).await.unwrap();

        assert_eq!(code, 0);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_nonzero_pod_exit_status() {
        let reader = LogStreamReader::new(FakeSource {
            attempts: Arc::new(AtomicU32::new(0)),
            succeed_on: Some((1, Some(137))),
        });
        let code = reader.run(&request(5, Duration::from_millis(1))).await.unwrap();
        assert_eq!(code, 137);
    }

    #[test]
    fn default_pod_is_the_first_worker_replica() {
        assert_eq!(resolve_pod_names("job-a", None), vec!["job-a-worker-0"]);
        assert_eq!(
            resolve_pod_names("job-a", Some("job-a-ps-1")),
            vec!["job-a-ps-1"]
        );
    }
}
