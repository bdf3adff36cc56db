//! Exercises the submit→list→delete flow against an in-memory resource
//! store instead of a real cluster.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use kube::ResourceExt;

use kuai_core::error::KuaiError;
use kuai_core::status::{display_state, UNKNOWN_STATE};
use kuai_core::submit::{SubmitArgs, TfJobArgs, OWNER_LABEL};
use kuai_core::tfjob::{JobCondition, TFJob, TFJobStatus};
use kuai_core::ResourceClient;

#[derive(Default)]
struct FakeStore {
    jobs: Mutex<Vec<TFJob>>,
}

#[async_trait]
impl ResourceClient for FakeStore {
    async fn create(&self, job: &TFJob) -> Result<TFJob, KuaiError> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.iter().any(|j| j.name_any() == job.name_any()) {
            return Err(KuaiError::ClusterApi(format!(
                "tfjobs.kubeflow.org \"{}\" already exists",
                job.name_any()
            )));
        }
        jobs.push(job.clone());
        Ok(job.clone())
    }

    async fn list(&self, label_selector: &str) -> Result<Vec<TFJob>, KuaiError> {
        let (key, value) = label_selector
            .split_once('=')
            .ok_or_else(|| KuaiError::ClusterApi("bad selector".to_string()))?;
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs
            .iter()
            .filter(|job| {
                job.metadata
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get(key))
                    .is_some_and(|v| v == value)
            })
            .cloned()
            .collect())
    }

    async fn delete(&self, name: &str) -> Result<(), KuaiError> {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|job| job.name_any() != name);
        if jobs.len() == before {
            return Err(KuaiError::ClusterApi(format!(
                "tfjobs.kubeflow.org \"{name}\" not found"
            )));
        }
        Ok(())
    }
}

fn tfjob_args(name: &str, user_image: &str) -> TfJobArgs {
    TfJobArgs {
        common: SubmitArgs {
            name: name.to_string(),
            image: user_image.to_string(),
            gpu_count: 1,
            working_dir: "/".to_string(),
            envs: BTreeMap::new(),
            command: "python train.py".to_string(),
            worker_count: 2,
        },
        ps_count: 1,
        ps_image: user_image.to_string(),
        worker_image: user_image.to_string(),
        worker_cpu: "1".to_string(),
        worker_memory: "1Gi".to_string(),
        ps_cpu: "1".to_string(),
        ps_memory: "1Gi".to_string(),
        use_chief: false,
        use_evaluator: false,
        chief_cpu: None,
        chief_memory: None,
        evaluator_cpu: None,
        evaluator_memory: None,
    }
}

#[tokio::test]
async fn submitted_jobs_are_listed_for_their_owner_only() {
    let store = FakeStore::default();

    let alice_job = tfjob_args("job-a", "img:1").build("default", "alice").unwrap();
    let bob_job = tfjob_args("job-b", "img:1").build("default", "bob").unwrap();
    store.create(&alice_job).await.unwrap();
    store.create(&bob_job).await.unwrap();

    let mine = store.list(&format!("{OWNER_LABEL}=alice")).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name_any(), "job-a");
}

#[tokio::test]
async fn duplicate_names_are_rejected_by_the_store() {
    let store = FakeStore::default();
    let job = tfjob_args("job-a", "img:1").build("default", "alice").unwrap();

    store.create(&job).await.unwrap();
    let err = store.create(&job).await.unwrap_err();
    assert!(matches!(err, KuaiError::ClusterApi(_)));
}

#[tokio::test]
async fn delete_removes_the_job_and_missing_names_error() {
    let store = FakeStore::default();
    let job = tfjob_args("job-a", "img:1").build("default", "alice").unwrap();
    store.create(&job).await.unwrap();

    store.delete("job-a").await.unwrap();
    assert!(store.list(&format!("{OWNER_LABEL}=alice")).await.unwrap().is_empty());
    assert!(store.delete("job-a").await.is_err());
}

#[tokio::test]
async fn listed_jobs_derive_their_display_state() {
    let store = FakeStore::default();
    let mut job = tfjob_args("job-a", "img:1").build("default", "alice").unwrap();
    job.status = Some(TFJobStatus {
        conditions: ["Created", "Running"]
            .iter()
            .map(|t| JobCondition {
                type_: t.to_string(),
                status: "True".to_string(),
                reason: None,
                message: None,
                last_transition_time: None,
            })
            .collect(),
    });
    store.create(&job).await.unwrap();

    let fresh = tfjob_args("job-b", "img:1").build("default", "alice").unwrap();
    store.create(&fresh).await.unwrap();

    let jobs = store.list(&format!("{OWNER_LABEL}=alice")).await.unwrap();
    assert_eq!(display_state(&jobs[0]), "Running");
    assert_eq!(display_state(&jobs[1]), UNKNOWN_STATE);
}
