use async_trait::async_trait;
use futures::{AsyncBufReadExt, TryStreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, LogParams, PostParams};
use kube::Client;
use tracing::debug;

use kuai_core::error::KuaiError;
use kuai_core::logs::{LogRequest, PodLogSource};
use kuai_core::tfjob::TFJob;
use kuai_core::ResourceClient;

/// The typed TFJob API, scoped to one namespace.
pub struct KubeResourceClient {
    api: Api<TFJob>,
}

impl KubeResourceClient {
    pub async fn connect(namespace: &str) -> Result<Self, KuaiError> {
        let client = Client::try_default().await?;
        Ok(KubeResourceClient {
            api: Api::namespaced(client, namespace),
        })
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn create(&self, job: &TFJob) -> Result<TFJob, KuaiError> {
        Ok(self.api.create(&PostParams::default(), job).await?)
    }

    async fn list(&self, label_selector: &str) -> Result<Vec<TFJob>, KuaiError> {
        let params = ListParams::default().labels(label_selector);
        Ok(self.api.list(&params).await?.items)
    }

    async fn delete(&self, name: &str) -> Result<(), KuaiError> {
        self.api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}

/// Reads pod logs through the cluster's log endpoint and prints each line
/// to stdout. In follow mode the stream blocks until the upstream ends or
/// the process is interrupted.
pub struct KubePodLogSource {
    pods: Api<Pod>,
}

impl KubePodLogSource {
    pub async fn connect(namespace: &str) -> Result<Self, KuaiError> {
        let client = Client::try_default().await?;
        Ok(KubePodLogSource {
            pods: Api::namespaced(client, namespace),
        })
    }

    /// The last non-zero terminated-container exit code of the pod, if any.
    async fn pod_exit_code(&self, pod_name: &str) -> Option<i32> {
        let pod = self.pods.get(pod_name).await.ok()?;
        pod.status?
            .container_statuses?
            .into_iter()
            .filter_map(|status| status.state?.terminated)
            .map(|terminated| terminated.exit_code)
            .find(|code| *code != 0)
    }
}

#[async_trait]
impl PodLogSource for KubePodLogSource {
    async fn read(&self, pod_name: &str, request: &LogRequest) -> Result<Option<i32>, KuaiError> {
        let params = LogParams {
            follow: request.follow,
            since_seconds: request.since_seconds,
            since_time: request.since_time,
            tail_lines: request.tail_lines,
            timestamps: request.timestamps,
            ..LogParams::default()
        };
        debug!(pod = %pod_name, follow = request.follow, "requesting pod logs");

        let stream = self
            .pods
            .log_stream(pod_name, &params)
            .await
            .map_err(|e| KuaiError::LogRetrieval(e.to_string()))?;
        let mut lines = stream.lines();
        while let Some(line) = lines
            .try_next()
            .await
            .map_err(|e| KuaiError::LogRetrieval(e.to_string()))?
        {
            println!("{line}");
        }

        Ok(self.pod_exit_code(pod_name).await)
    }
}
