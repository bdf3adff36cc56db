use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The TFJob custom resource (`kubeflow.org/v1`). The spec holds one replica
/// group per active role; the controller owns the status and appends a
/// condition for every phase transition.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "kubeflow.org",
    version = "v1",
    kind = "TFJob",
    namespaced,
    status = "TFJobStatus"
)]
pub struct TFJobSpec {
    #[serde(rename = "tfReplicaSpecs")]
    pub tf_replica_specs: BTreeMap<ReplicaType, ReplicaSpec>,
}

/// Training-job roles. PS and Worker are always present in a submitted spec;
/// Chief and Evaluator are opt-in.
#[derive(
    Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq, PartialOrd, Ord,
)]
pub enum ReplicaType {
    PS,
    Worker,
    Chief,
    Evaluator,
}

impl ReplicaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaType::PS => "PS",
            ReplicaType::Worker => "Worker",
            ReplicaType::Chief => "Chief",
            ReplicaType::Evaluator => "Evaluator",
        }
    }
}

/// One named group of replicas sharing an image, resources, and restart
/// policy. `replicas` is a count on the group, not an unrolled pod list.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSpec {
    pub replicas: i32,
    pub restart_policy: String,
    pub template: PodTemplateSpec,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct TFJobStatus {
    /// Appended in chronological order by the controller; the last entry
    /// reflects the current phase.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<JobCondition>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}
