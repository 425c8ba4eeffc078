mod cli;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use cli::{Cli, HostCommand};
use mdb_hostmap::output::{render_changes, render_hosts};
use mdb_hostmap::providers::yandex::read_hosts_file;
use mdb_hostmap::terraform::ClusterHosts;
use mdb_hostmap::{
    DesiredConfig, Host, HostList, MdbError, TerraformState, classify_mapped, get_source,
    map_actual_to_state, reconcile_desired_with_state, summarize,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source_name = cli.command.source_name();
    let format = cli.output;

    let cli::ClusterCommand::Elasticsearch { command } = cli.command;

    match command {
        HostCommand::Hosts(args) => {
            let source = get_source(source_name, args.api.token, args.api.endpoint)?;
            let actual = source.list_hosts(&args.cluster_id).await?;
            let hosts: HostList = actual.into_iter().map(Host::from).collect();
            print(render_hosts(&hosts, format)?);
        }
        HostCommand::Read(args) => {
            let state = TerraformState::from_file(&args.state)?;
            let cluster = state.cluster_hosts(args.resource.as_deref())?;

            let actual = match &args.actual {
                Some(path) => read_hosts_file(path)?,
                None => {
                    let cluster_id = resolve_cluster_id(args.cluster_id.as_deref(), &cluster)?;
                    let source = get_source(source_name, args.api.token, args.api.endpoint)?;
                    source.list_hosts(&cluster_id).await?
                }
            };

            let mut pool = cluster.hosts;
            let mapped = map_actual_to_state(&actual, &mut pool);
            tracing::info!(
                address = %cluster.address,
                hosts = mapped.len(),
                unnamed = mapped.iter().filter(|h| h.name.is_empty()).count(),
                unmatched_state = pool.len(),
                "mapped live hosts to state"
            );
            print(render_changes(&classify_mapped(&mapped, &pool), format)?);
        }
        HostCommand::Plan(args) => {
            let state = TerraformState::from_file(&args.state)?;
            let cluster = state.cluster_hosts(args.resource.as_deref())?;
            let desired = DesiredConfig::from_file(&args.config)?;

            let before = cluster.hosts.clone();
            let mut pool = cluster.hosts;
            let planned = reconcile_desired_with_state(&mut pool, &desired)
                .wrap_err_with(|| format!("cannot plan hosts of {}", cluster.address))?;
            tracing::info!(
                address = %cluster.address,
                hosts = planned.len(),
                "reconciled desired hosts with state"
            );
            print(render_changes(&summarize(&before, &planned), format)?);
        }
    }

    Ok(())
}

fn print(rendered: String) {
    println!("{}", rendered);
}

/// Picks the cluster to query: the flag wins, then the `id` recorded in state.
fn resolve_cluster_id(explicit: Option<&str>, cluster: &ClusterHosts) -> Result<String, MdbError> {
    if let Some(id) = explicit {
        return Ok(id.to_string());
    }
    if !cluster.cluster_id.is_empty() {
        return Ok(cluster.cluster_id.clone());
    }
    Err(MdbError::Config(format!(
        "no cluster id recorded for {}, pass --cluster-id",
        cluster.address
    )))
}
