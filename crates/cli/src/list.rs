use comfy_table::{Cell, Table};
use kube::ResourceExt;

use kuai_core::error::KuaiError;
use kuai_core::status::display_state;
use kuai_core::submit::OWNER_LABEL;
use kuai_core::ResourceClient;

use crate::client::KubeResourceClient;
use crate::config::Config;

/// Lists the training jobs created by the current user, one row per job.
/// Ordering follows whatever the API returned.
pub async fn handle_list(config: &Config) -> Result<(), KuaiError> {
    let client = KubeResourceClient::connect(&config.namespace).await?;
    let selector = format!("{OWNER_LABEL}={}", config.login_user);
    let jobs = client.list(&selector).await?;

    if jobs.is_empty() {
        println!("No training jobs found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["NAME", "STATE", "CREATE_TIME"]);
    for job in &jobs {
        let created = job
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|time| time.0.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(job.name_any()),
            Cell::new(display_state(job)),
            Cell::new(created),
        ]);
    }
    println!("{table}");
    Ok(())
}
