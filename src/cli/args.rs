use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mdb_hostmap::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, default_value = "table")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: ClusterCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    /// Managed Service for Elasticsearch clusters
    Elasticsearch {
        #[command(subcommand)]
        command: HostCommand,
    },
}

impl ClusterCommand {
    pub fn source_name(&self) -> &'static str {
        match self {
            ClusterCommand::Elasticsearch { .. } => "elasticsearch",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum HostCommand {
    /// List the live hosts of a cluster
    Hosts(HostsArgs),
    /// Recover host names for live hosts from Terraform state
    Read(ReadArgs),
    /// Fill calculated host fields of a desired configuration from Terraform state
    Plan(PlanArgs),
}

#[derive(clap::Args, Debug)]
pub struct ApiArgs {
    #[arg(long, env = "YC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "YC_MDB_ENDPOINT")]
    pub endpoint: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct HostsArgs {
    #[arg(long, env = "MDB_CLUSTER_ID")]
    pub cluster_id: String,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    /// Path to terraform.tfstate
    #[arg(long)]
    pub state: PathBuf,

    /// Resource address, e.g. yandex_mdb_elasticsearch_cluster.main
    #[arg(long)]
    pub resource: Option<String>,

    /// ListHosts response saved as JSON, instead of calling the API
    #[arg(long)]
    pub actual: Option<PathBuf>,

    /// Cluster id, defaults to the id recorded in state
    #[arg(long, env = "MDB_CLUSTER_ID")]
    pub cluster_id: Option<String>,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    /// Path to terraform.tfstate
    #[arg(long)]
    pub state: PathBuf,

    /// Resource address, e.g. yandex_mdb_elasticsearch_cluster.main
    #[arg(long)]
    pub resource: Option<String>,

    /// JSON file with the desired host blocks
    #[arg(long)]
    pub config: PathBuf,
}
