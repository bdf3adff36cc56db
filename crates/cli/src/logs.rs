use chrono::{DateTime, Utc};
use clap::Args;

use kuai_core::error::KuaiError;
use kuai_core::logs::{
    resolve_pod_names, LogRequest, LogStreamReader, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY,
};

use crate::client::KubePodLogSource;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// The name of the training job
    name: String,
    /// Specify if the logs should be streamed
    #[arg(short, long)]
    follow: bool,
    /// Only return logs newer than a relative duration like 5s, 2m, or 3h.
    /// Only one of --since / --since-time may be used
    #[arg(long)]
    since: Option<String>,
    /// Only return logs after a specific date (RFC3339)
    #[arg(long)]
    since_time: Option<String>,
    /// Lines of recent log file to display, -1 shows all lines
    #[arg(short, long, default_value_t = -1, allow_hyphen_values = true)]
    tail: i64,
    /// Include timestamps on each line in the log output
    #[arg(long)]
    timestamps: bool,
    /// Specify the task instance to get the log
    #[arg(short, long)]
    instance: Option<String>,
}

impl LogsArgs {
    fn into_request(self, config: &Config) -> Result<LogRequest, KuaiError> {
        let since_seconds = self
            .since
            .as_deref()
            .map(|text| {
                humantime::parse_duration(text)
                    .map(|d| d.as_secs() as i64)
                    .map_err(|e| KuaiError::Validation(format!("invalid --since {text}: {e}")))
            })
            .transpose()?;
        let since_time = self
            .since_time
            .as_deref()
            .map(|text| {
                DateTime::parse_from_rfc3339(text)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| {
                        KuaiError::Validation(format!("invalid --since-time {text}: {e}"))
                    })
            })
            .transpose()?;
        if since_seconds.is_some() && since_time.is_some() {
            return Err(KuaiError::Validation(
                "only one of --since / --since-time may be used".to_string(),
            ));
        }

        Ok(LogRequest {
            pod_names: resolve_pod_names(&self.name, self.instance.as_deref()),
            namespace: config.namespace.clone(),
            follow: self.follow,
            since_seconds,
            since_time,
            tail_lines: (self.tail >= 0).then_some(self.tail),
            timestamps: self.timestamps,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }
}

/// Streams or dumps logs for one task of the job; the returned code is the
/// pod's exit status and becomes the command's own exit code.
pub async fn handle_logs(args: LogsArgs, config: &Config) -> Result<i32, KuaiError> {
    let request = args.into_request(config)?;
    let source = KubePodLogSource::connect(&config.namespace).await?;
    LogStreamReader::new(source).run(&request).await
}
