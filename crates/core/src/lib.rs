pub mod error;
pub mod logs;
pub mod status;
pub mod submit;
pub mod tfjob;
pub mod validate;

use async_trait::async_trait;

use error::KuaiError;
use tfjob::TFJob;

/// Create/list/delete over the TFJob custom resource. The cluster and its
/// job controller own everything behind this boundary; callers treat every
/// method as fallible with a single opaque error kind and never retry here.
#[async_trait]
pub trait ResourceClient {
    async fn create(&self, job: &TFJob) -> Result<TFJob, KuaiError>;

    /// Lists jobs matching an equality label selector, in the order the
    /// store returns them.
    async fn list(&self, label_selector: &str) -> Result<Vec<TFJob>, KuaiError>;

    async fn delete(&self, name: &str) -> Result<(), KuaiError>;
}
