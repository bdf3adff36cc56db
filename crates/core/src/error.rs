use thiserror::Error;

/// Every failure a command can surface maps to one of these three kinds.
///
/// `Validation` is always caught locally and reported with exit code 1.
/// `ClusterApi` aborts the command immediately, no retries at that boundary.
/// `LogRetrieval` is retried inside the log reader and only surfaced once the
/// retry budget is spent.
#[derive(Debug, Error)]
pub enum KuaiError {
    #[error("{0}")]
    Validation(String),

    #[error("cluster api error: {0}")]
    ClusterApi(String),

    #[error("failed to retrieve logs: {0}")]
    LogRetrieval(String),
}

impl From<kube::Error> for KuaiError {
    fn from(err: kube::Error) -> Self {
        KuaiError::ClusterApi(err.to_string())
    }
}
