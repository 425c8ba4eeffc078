use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::host::{Host, HostList};
use crate::reconcile::HostChange;
use crate::terraform::{HostAttributes, flatten_hosts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Tree,
}

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "CHANGE")]
    change: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    host_type: String,
    #[tabled(rename = "FQDN")]
    fqdn: String,
    #[tabled(rename = "ZONE")]
    zone: String,
    #[tabled(rename = "SUBNET")]
    subnet: String,
    #[tabled(rename = "PUBLIC IP")]
    public_ip: String,
}

impl HostRow {
    fn new(change: Option<HostChange>, host: &Host) -> Self {
        Self {
            change: change.map(|c| c.as_str()).unwrap_or("-").to_string(),
            name: or_dash(&host.name),
            host_type: host.host_type.to_string(),
            fqdn: or_dash(&host.fqdn),
            zone: host.zone.clone(),
            subnet: or_dash(&host.subnet),
            public_ip: if host.public_ip { "yes" } else { "no" }.to_string(),
        }
    }
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

#[derive(Serialize)]
struct ChangeEntry {
    change: HostChange,
    #[serde(flatten)]
    host: HostAttributes,
}

fn host_label(host: &Host) -> String {
    let name = if host.name.is_empty() {
        "<unnamed>"
    } else {
        host.name.as_str()
    };
    if host.fqdn.is_empty() {
        format!("{} [{}, {}]", name, host.host_type, host.zone)
    } else {
        format!("{} ({}) [{}, {}]", name, host.fqdn, host.host_type, host.zone)
    }
}

/// Renders a plain host list, e.g. the live topology of a cluster.
pub fn render_hosts(hosts: &HostList, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&flatten_hosts(hosts)),
        OutputFormat::Table => {
            let rows: Vec<HostRow> = hosts.iter().map(|h| HostRow::new(None, h)).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Tree => {
            let mut tree = Tree::new(format!("hosts ({})", hosts.len()));
            for host in hosts {
                tree.push(Tree::new(host_label(host)));
            }
            Ok(tree.to_string())
        }
    }
}

/// Renders reconciled hosts grouped by the change they imply.
pub fn render_changes(
    changes: &[(HostChange, Host)],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<ChangeEntry> = changes
                .iter()
                .map(|(change, host)| ChangeEntry {
                    change: *change,
                    host: HostAttributes::from(host),
                })
                .collect();
            serde_json::to_string_pretty(&entries)
        }
        OutputFormat::Table => {
            let rows: Vec<HostRow> = changes
                .iter()
                .map(|(change, host)| HostRow::new(Some(*change), host))
                .collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Tree => {
            let mut root = Tree::new("hosts".to_string());
            for kind in [
                HostChange::Keep,
                HostChange::Create,
                HostChange::Delete,
                HostChange::Unnamed,
                HostChange::Missing,
            ] {
                let leaves: Vec<Tree<String>> = changes
                    .iter()
                    .filter(|(change, _)| *change == kind)
                    .map(|(_, host)| Tree::new(host_label(host)))
                    .collect();
                if leaves.is_empty() {
                    continue;
                }
                let label = format!("{} ({})", kind.as_str(), leaves.len());
                root.push(Tree::new(label).with_leaves(leaves));
            }
            Ok(root.to_string())
        }
    }
}
