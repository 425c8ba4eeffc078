mod args;

pub use args::{Cli, ClusterCommand, HostCommand};
