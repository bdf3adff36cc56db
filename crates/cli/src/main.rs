use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod client;
mod config;
mod delete;
mod list;
mod logs;
mod submit;

#[derive(Parser, Debug)]
#[command(name = "kuai")]
#[command(about = "kuai is the command line interface for distributed training jobs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a training job
    Submit {
        #[command(subcommand)]
        kind: SubmitKind,
    },
    /// List all the training jobs created by the current user
    List,
    /// Print the logs for a task of the training job
    Logs(logs::LogsArgs),
    /// Delete a training job
    Delete {
        /// The name of the training job
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum SubmitKind {
    /// Submit a TFJob as the training job
    #[command(visible_alias = "tf")]
    Tfjob(submit::TfJobCliArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let outcome = match cli.command {
        Commands::Submit {
            kind: SubmitKind::Tfjob(args),
        } => submit::handle_submit_tfjob(args, &config).await.map(|()| 0),
        Commands::List => list::handle_list(&config).await.map(|()| 0),
        Commands::Logs(args) => logs::handle_logs(args, &config).await,
        Commands::Delete { name } => delete::handle_delete(&name, &config).await.map(|()| 0),
    };

    match outcome {
        Ok(code) if code != 0 => std::process::exit(code),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
