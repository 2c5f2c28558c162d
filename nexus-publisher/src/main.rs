//! `nexus-publisher` binary: web service plus local inspect/publish commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use nexus_publisher::{
    inspect_jar, publish_jar, run_server, Config, Credentials, PublishArgs,
};

#[derive(Parser)]
#[command(name = "nexus-publisher")]
#[command(about = "Inspect Maven JAR coordinates and publish artifacts to Nexus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file; built-in defaults are used when it does not exist
    #[arg(long, default_value = "nexus-publisher.json", global = true)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web service
    Start {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding the web client
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Print the Maven coordinate embedded in a JAR
    Inspect {
        /// Path to the JAR file
        jar: PathBuf,

        /// Print the coordinate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish a JAR and its pom.xml to a Nexus repository
    Publish {
        /// Path to the JAR file
        jar: PathBuf,

        /// Base URL of the Nexus server, e.g. http://localhost:8081
        #[arg(long)]
        nexus_url: String,

        /// Hosted repository name, e.g. maven-releases
        #[arg(long)]
        repository: String,

        /// Username for basic authentication; omit for anonymous uploads
        #[arg(long, default_value = "")]
        username: String,

        /// Password for basic authentication
        #[arg(long, env = "NEXUS_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,

        /// Override the groupId read from the JAR
        #[arg(long)]
        group_id: Option<String>,

        /// Override the artifactId read from the JAR
        #[arg(long)]
        artifact_id: Option<String>,

        /// Override the version read from the JAR
        #[arg(long)]
        version: Option<String>,

        /// Snapshot timestamp such as 20240101.120000-1; generated when omitted
        #[arg(long)]
        timestamp: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = nexus_logging::init_subscriber();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    debug!(config = ?config, "Loaded configuration");

    match cli.command {
        Commands::Start {
            host,
            port,
            static_dir,
        } => {
            if let Some(dir) = static_dir {
                config.static_files.dir = dir;
            }
            let host = host.unwrap_or_else(|| config.server.default_host.clone());
            let port = port.unwrap_or(config.server.default_port);
            run_server(config, host, port).await
        }

        Commands::Inspect { jar, json } => inspect_jar(&jar, json),

        Commands::Publish {
            jar,
            nexus_url,
            repository,
            username,
            password,
            group_id,
            artifact_id,
            version,
            timestamp,
        } => {
            let args = PublishArgs {
                jar,
                nexus_url,
                repository,
                credentials: Credentials::new(username, password),
                group_id,
                artifact_id,
                version,
                timestamp,
            };
            publish_jar(args, config.upstream.to_upstream_config()).await
        }
    }
}
