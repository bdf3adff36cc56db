use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, EnvVar, PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec,
    ResourceRequirements, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::error::KuaiError;
use crate::tfjob::{ReplicaSpec, ReplicaType, TFJob, TFJobSpec};
use crate::validate::validate_job_name;

pub const CONTAINER_NAME: &str = "tensorflow";
pub const VOLUME_NAME: &str = "netdisk";
pub const MOUNT_PATH: &str = "/notebook";
pub const GPU_RESOURCE: &str = "nvidia.com/gpu";
pub const OWNER_LABEL: &str = "createdBy";

const RESTART_POLICY: &str = "Never";

/// Arguments shared by every training-job kind.
#[derive(Debug, Clone)]
pub struct SubmitArgs {
    pub name: String,
    pub image: String,
    pub gpu_count: u32,
    pub working_dir: String,
    pub envs: BTreeMap<String, String>,
    /// Trailing CLI arguments joined with single spaces, run via `sh -c`.
    pub command: String,
    pub worker_count: i32,
}

/// TFJob-specific arguments layered over [`SubmitArgs`].
#[derive(Debug, Clone)]
pub struct TfJobArgs {
    pub common: SubmitArgs,
    pub ps_count: i32,
    pub ps_image: String,
    pub worker_image: String,
    pub worker_cpu: String,
    pub worker_memory: String,
    pub ps_cpu: String,
    pub ps_memory: String,
    pub use_chief: bool,
    pub use_evaluator: bool,
    pub chief_cpu: Option<String>,
    pub chief_memory: Option<String>,
    pub evaluator_cpu: Option<String>,
    pub evaluator_memory: Option<String>,
}

/// Parses repeatable `KEY=VALUE` pairs into a map, rejecting malformed pairs
/// and duplicate keys.
pub fn parse_envs(pairs: &[String]) -> Result<BTreeMap<String, String>, KuaiError> {
    let mut envs = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            KuaiError::Validation(format!("invalid --env {pair}, expected KEY=VALUE"))
        })?;
        if key.is_empty() {
            return Err(KuaiError::Validation(format!(
                "invalid --env {pair}, the key must not be empty"
            )));
        }
        if envs.insert(key.to_string(), value.to_string()).is_some() {
            return Err(KuaiError::Validation(format!(
                "duplicate --env key {key}"
            )));
        }
    }
    Ok(envs)
}

impl TfJobArgs {
    fn check(&self) -> Result<(), KuaiError> {
        validate_job_name(&self.common.name)?;
        if self.common.worker_count < 0 || self.ps_count < 0 {
            return Err(KuaiError::Validation(
                "replica counts must not be negative".to_string(),
            ));
        }
        if self.common.worker_count == 0 && !self.use_chief {
            return Err(KuaiError::Validation(
                "--workers must be greater than 0 in distributed training".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the complete TFJob manifest, or fails without constructing
    /// anything. Pure with respect to its inputs: no I/O happens here, the
    /// resource is only handed to the cluster by the caller.
    pub fn build(&self, namespace: &str, user: &str) -> Result<TFJob, KuaiError> {
        self.check()?;

        let mut replicas = BTreeMap::new();
        // Parameter servers never receive accelerators.
        replicas.insert(
            ReplicaType::PS,
            self.replica_spec(self.ps_count, &self.ps_image, &self.ps_cpu, &self.ps_memory, 0, user),
        );
        replicas.insert(
            ReplicaType::Worker,
            self.replica_spec(
                self.common.worker_count,
                &self.worker_image,
                &self.worker_cpu,
                &self.worker_memory,
                self.common.gpu_count,
                user,
            ),
        );
        if self.use_chief {
            // The chief runs training like a worker, so it keeps the worker
            // image and GPU count unless cpu/memory are overridden.
            replicas.insert(
                ReplicaType::Chief,
                self.replica_spec(
                    1,
                    &self.worker_image,
                    self.chief_cpu.as_deref().unwrap_or(&self.worker_cpu),
                    self.chief_memory.as_deref().unwrap_or(&self.worker_memory),
                    self.common.gpu_count,
                    user,
                ),
            );
        }
        if self.use_evaluator {
            replicas.insert(
                ReplicaType::Evaluator,
                self.replica_spec(
                    1,
                    &self.worker_image,
                    self.evaluator_cpu.as_deref().unwrap_or(&self.worker_cpu),
                    self.evaluator_memory.as_deref().unwrap_or(&self.worker_memory),
                    0,
                    user,
                ),
            );
        }

        let mut job = TFJob::new(&self.common.name, TFJobSpec { tf_replica_specs: replicas });
        job.metadata.namespace = Some(namespace.to_string());
        job.metadata.labels = Some(BTreeMap::from([(
            OWNER_LABEL.to_string(),
            user.to_string(),
        )]));
        Ok(job)
    }

    fn replica_spec(
        &self,
        replicas: i32,
        image: &str,
        cpu: &str,
        memory: &str,
        gpus: u32,
        user: &str,
    ) -> ReplicaSpec {
        // Limits and requests are set to the same values: guaranteed QoS,
        // not burstable.
        let resources = BTreeMap::from([
            ("cpu".to_string(), Quantity(cpu.to_string())),
            ("memory".to_string(), Quantity(memory.to_string())),
            (GPU_RESOURCE.to_string(), Quantity(gpus.to_string())),
        ]);

        let env = if self.common.envs.is_empty() {
            None
        } else {
            Some(
                self.common
                    .envs
                    .iter()
                    .map(|(name, value)| EnvVar {
                        name: name.clone(),
                        value: Some(value.clone()),
                        ..Default::default()
                    })
                    .collect(),
            )
        };

        ReplicaSpec {
            replicas,
            restart_policy: RESTART_POLICY.to_string(),
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: CONTAINER_NAME.to_string(),
                        image: Some(image.to_string()),
                        working_dir: Some(self.common.working_dir.clone()),
                        command: Some(vec![
                            "sh".to_string(),
                            "-c".to_string(),
                            self.common.command.clone(),
                        ]),
                        env,
                        resources: Some(ResourceRequirements {
                            limits: Some(resources.clone()),
                            requests: Some(resources),
                            ..Default::default()
                        }),
                        volume_mounts: Some(vec![VolumeMount {
                            name: VOLUME_NAME.to_string(),
                            mount_path: MOUNT_PATH.to_string(),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    volumes: Some(vec![Volume {
                        name: VOLUME_NAME.to_string(),
                        // One claim per user: concurrent jobs by the same
                        // user share storage, different users never collide.
                        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                            claim_name: format!("claim-{user}"),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
            },
        }
    }
}
