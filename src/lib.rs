//! mdb-hostmap - host reconciliation for managed database clusters
//!
//! Carries stable logical host names between Terraform state, live cluster topology and
//! desired configuration for Yandex Cloud managed database clusters.

pub mod error;
pub mod host;
pub mod output;
pub mod providers;
pub mod reconcile;
pub mod terraform;

pub use error::MdbError;
pub use host::{ActualHost, Host, HostList, HostType, SUBNET_NONE};
pub use providers::yandex::{YandexClient, YandexError};
pub use providers::{HostSource, ProviderError, get_source};
pub use reconcile::{
    HostChange, ReconcileError, classify_mapped, map_actual_to_state, reconcile_desired_with_state,
    summarize,
};
pub use terraform::{DesiredConfig, HostAttributes, StateError, TerraformState};
