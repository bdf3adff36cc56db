use kuai_core::error::KuaiError;
use kuai_core::ResourceClient;

use crate::client::KubeResourceClient;
use crate::config::Config;

pub async fn handle_delete(name: &str, config: &Config) -> Result<(), KuaiError> {
    let client = KubeResourceClient::connect(&config.namespace).await?;
    client.delete(name).await?;
    println!("Deleted tfjob {name:?}.");
    Ok(())
}
