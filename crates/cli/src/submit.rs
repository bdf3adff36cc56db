use clap::Args;

use kuai_core::error::KuaiError;
use kuai_core::submit::{parse_envs, SubmitArgs, TfJobArgs};
use kuai_core::ResourceClient;

use crate::client::KubeResourceClient;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct TfJobCliArgs {
    /// The name of the training job
    #[arg(long)]
    name: String,
    /// The docker image of the training job
    #[arg(long)]
    image: Option<String>,
    /// The GPU count of each worker to run the training
    #[arg(long, default_value_t = 0)]
    gpus: u32,
    /// The worker number to run the distributed training
    #[arg(long, default_value_t = 1)]
    workers: i32,
    /// Working directory to extract the code
    #[arg(long, default_value = "/")]
    working_dir: String,
    /// The environment variables, KEY=VALUE, repeatable
    #[arg(short, long = "env")]
    envs: Vec<String>,
    /// The docker image for the tensorflow workers
    #[arg(long)]
    worker_image: Option<String>,
    /// The docker image for the parameter servers
    #[arg(long)]
    ps_image: Option<String>,
    /// The number of the parameter servers
    #[arg(long, default_value_t = 0)]
    ps: i32,
    /// The cpu resource to use for each worker, like 1 for 1 core
    #[arg(long, default_value = "1")]
    worker_cpu: String,
    /// The memory resource to use for each worker, like 1Gi
    #[arg(long, default_value = "1Gi")]
    worker_memory: String,
    /// The cpu resource to use for the parameter servers
    #[arg(long, default_value = "1")]
    ps_cpu: String,
    /// The memory resource to use for the parameter servers
    #[arg(long, default_value = "1Gi")]
    ps_memory: String,
    /// Enable chief, which is required for estimator
    #[arg(long)]
    chief: bool,
    /// Enable evaluator, which is optional for estimator
    #[arg(long)]
    evaluator: bool,
    /// The cpu resource to use for the chief, defaults to the worker value
    #[arg(long)]
    chief_cpu: Option<String>,
    /// The memory resource to use for the chief, defaults to the worker value
    #[arg(long)]
    chief_memory: Option<String>,
    /// The cpu resource to use for the evaluator, defaults to the worker value
    #[arg(long)]
    evaluator_cpu: Option<String>,
    /// The memory resource to use for the evaluator, defaults to the worker value
    #[arg(long)]
    evaluator_memory: Option<String>,
    /// The training command to run in the containers
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

impl TfJobCliArgs {
    fn into_tfjob_args(self, config: &Config) -> Result<TfJobArgs, KuaiError> {
        if self.command.is_empty() {
            return Err(KuaiError::Validation(
                "the training command must be specified, e.g. \
                 kuai submit tfjob --name my-job -- python train.py"
                    .to_string(),
            ));
        }
        let image = self.image.unwrap_or_else(|| config.default_image.clone());
        Ok(TfJobArgs {
            common: SubmitArgs {
                name: self.name,
                gpu_count: self.gpus,
                working_dir: self.working_dir,
                envs: parse_envs(&self.envs)?,
                command: self.command.join(" "),
                worker_count: self.workers,
                image: image.clone(),
            },
            ps_count: self.ps,
            ps_image: self.ps_image.unwrap_or_else(|| image.clone()),
            worker_image: self.worker_image.unwrap_or(image),
            worker_cpu: self.worker_cpu,
            worker_memory: self.worker_memory,
            ps_cpu: self.ps_cpu,
            ps_memory: self.ps_memory,
            use_chief: self.chief,
            use_evaluator: self.evaluator,
            chief_cpu: self.chief_cpu,
            chief_memory: self.chief_memory,
            evaluator_cpu: self.evaluator_cpu,
            evaluator_memory: self.evaluator_memory,
        })
    }
}

pub async fn handle_submit_tfjob(args: TfJobCliArgs, config: &Config) -> Result<(), KuaiError> {
    let tfjob_args = args.into_tfjob_args(config)?;
    // The manifest is fully built and validated before anything is sent.
    let manifest = tfjob_args.build(&config.namespace, &config.login_user)?;

    let client = KubeResourceClient::connect(&config.namespace).await?;
    println!("Creating tfjob...");
    let created = client.create(&manifest).await?;
    println!(
        "Created tfjob {:?}.",
        created.metadata.name.as_deref().unwrap_or_default()
    );
    Ok(())
}
