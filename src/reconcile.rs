//! Host name reconciliation for clustered database resources.
//!
//! The cloud API does not name hosts, so logical names kept in Terraform state have to be
//! carried over by matching hosts between two snapshots. Matching is greedy and first-fit
//! in list order. It is intentionally not an optimal bipartite matching: changing the
//! policy would move names between hosts for existing clusters.

use serde::Serialize;
use thiserror::Error;

use crate::host::{ActualHost, Host, HostList};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error(
        "changing the number of master nodes is not supported: state has {old}, configuration has {new}"
    )]
    MasterCountChanged { old: usize, new: usize },
}

/// Subnet compatibility between the side that may leave the subnet unset (`pinned`)
/// and the side that knows the real value (`concrete`).
///
/// The strict pass only accepts an explicitly pinned, equal subnet. The loose pass also
/// accepts an unset pinned subnet.
fn subnet_matches(pinned: &str, concrete: &str, any_subnet: bool) -> bool {
    if pinned.is_empty() {
        return any_subnet;
    }
    pinned == concrete
}

/// Recovers logical names for hosts read from the cloud API.
///
/// Matched entries are removed from `state`; whatever is left there afterwards no longer
/// exists in the cloud. Hosts that match nothing keep an empty name.
pub fn map_actual_to_state(actual: &[ActualHost], state: &mut HostList) -> HostList {
    let mut hosts: Vec<Host> = actual.iter().cloned().map(Host::from).collect();
    let mut resolved = vec![false; hosts.len()];

    for (host, done) in hosts.iter_mut().zip(resolved.iter_mut()) {
        if host.fqdn.is_empty() {
            continue;
        }
        if let Some(known) = state.remove_by(|s| s.fqdn == host.fqdn) {
            tracing::debug!(fqdn = %host.fqdn, name = %known.name, "matched host by fqdn");
            host.name = known.name;
            *done = true;
        }
    }

    for any_subnet in [false, true] {
        for (host, done) in hosts.iter_mut().zip(resolved.iter_mut()) {
            if *done {
                continue;
            }
            let candidate = state.remove_by(|s| {
                s.fqdn.is_empty()
                    && s.same_placement(host)
                    && subnet_matches(&s.subnet, &host.subnet, any_subnet)
            });
            if let Some(known) = candidate {
                tracing::debug!(
                    fqdn = %host.fqdn,
                    name = %known.name,
                    any_subnet,
                    "matched host by placement"
                );
                host.name = known.name;
                *done = true;
            }
        }
    }

    let unresolved = resolved.iter().filter(|done| !**done).count();
    if unresolved > 0 {
        tracing::debug!(count = unresolved, "hosts without a known name");
    }

    HostList::from(hosts)
}

/// Fills calculated fields of desired hosts from the previously applied hosts.
///
/// Returns an updated copy of `new`; `new` itself is never modified. Matched entries are
/// removed from `old`. Fails without consuming anything when the number of master nodes
/// would change.
pub fn reconcile_desired_with_state(
    old: &mut HostList,
    new: &HostList,
) -> Result<HostList, ReconcileError> {
    let old_masters = old.count_masters();
    let new_masters = new.count_masters();
    if !old.is_empty() && old_masters != new_masters {
        tracing::warn!(
            old = old_masters,
            new = new_masters,
            "rejecting master node count change"
        );
        return Err(ReconcileError::MasterCountChanged {
            old: old_masters,
            new: new_masters,
        });
    }

    let mut hosts = new.clone().into_vec();
    let mut resolved = vec![false; hosts.len()];

    for (host, done) in hosts.iter_mut().zip(resolved.iter_mut()) {
        if host.name.is_empty() {
            continue;
        }
        let Some(previous) = old.remove_by(|o| o.name == host.name) else {
            continue;
        };
        if previous.same_placement(host) && subnet_matches(&host.subnet, &previous.subnet, true)
        {
            tracing::debug!(name = %host.name, fqdn = %previous.fqdn, "matched host by name");
            copy_calculated(host, previous);
            *done = true;
        } else {
            tracing::debug!(name = %host.name, "host changed, it will be recreated");
        }
    }

    for any_subnet in [false, true] {
        for (host, done) in hosts.iter_mut().zip(resolved.iter_mut()) {
            if *done {
                continue;
            }
            let candidate = old.remove_by(|o| {
                o.name.is_empty()
                    && o.same_placement(host)
                    && subnet_matches(&host.subnet, &o.subnet, any_subnet)
            });
            if let Some(previous) = candidate {
                tracing::debug!(
                    name = %host.name,
                    fqdn = %previous.fqdn,
                    any_subnet,
                    "matched unnamed host"
                );
                copy_calculated(host, previous);
                *done = true;
            }
        }
    }

    Ok(HostList::from(hosts))
}

fn copy_calculated(host: &mut Host, previous: Host) {
    host.fqdn = previous.fqdn;
    if host.subnet.is_empty() {
        host.subnet = previous.subnet;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostChange {
    Keep,
    Create,
    Delete,
    /// Live host that no state entry claims.
    Unnamed,
    /// State entry with no live host behind it.
    Missing,
}

impl HostChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostChange::Keep => "keep",
            HostChange::Create => "create",
            HostChange::Delete => "delete",
            HostChange::Unnamed => "unnamed",
            HostChange::Missing => "missing",
        }
    }
}

/// Classifies the hosts of a reconciled list against the list it was reconciled from.
///
/// Hosts with an fqdn are kept, the rest will be created. Hosts of `before` that exist in
/// the cloud but whose fqdn is no longer claimed in `after` will be deleted.
pub fn summarize(before: &HostList, after: &HostList) -> Vec<(HostChange, Host)> {
    let mut changes: Vec<(HostChange, Host)> = after
        .iter()
        .map(|h| {
            let change = if h.fqdn.is_empty() {
                HostChange::Create
            } else {
                HostChange::Keep
            };
            (change, h.clone())
        })
        .collect();

    changes.extend(
        before
            .iter()
            .filter(|h| !h.fqdn.is_empty() && !after.iter().any(|a| a.fqdn == h.fqdn))
            .map(|h| (HostChange::Delete, h.clone())),
    );

    changes
}

/// Classifies the result of [`map_actual_to_state`].
///
/// `unmatched` is what the state pool still holds after mapping. Live hosts that got a
/// name are kept, live hosts without one are reported as unnamed and leftover state
/// entries as missing.
pub fn classify_mapped(mapped: &HostList, unmatched: &HostList) -> Vec<(HostChange, Host)> {
    mapped
        .iter()
        .map(|h| {
            let change = if h.name.is_empty() {
                HostChange::Unnamed
            } else {
                HostChange::Keep
            };
            (change, h.clone())
        })
        .chain(unmatched.iter().map(|h| (HostChange::Missing, h.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostType, SUBNET_NONE};

    const ZONE_A: &str = "ru-central1-a";
    const ZONE_B: &str = "ru-central1-b";

    fn actual(fqdn: &str, host_type: HostType, zone: &str, subnet: &str) -> ActualHost {
        ActualHost {
            fqdn: fqdn.to_string(),
            host_type,
            zone: zone.to_string(),
            subnet: subnet.to_string(),
            public_ip: false,
        }
    }

    fn data(name: &str, zone: &str) -> Host {
        Host::new(name, HostType::DataNode, zone)
    }

    fn master(name: &str, zone: &str) -> Host {
        Host::new(name, HostType::MasterNode, zone)
    }

    #[test]
    fn test_subnet_matches_strict_pass() {
        assert!(subnet_matches("s1", "s1", false));
        assert!(!subnet_matches("", "s1", false));
        assert!(!subnet_matches("s2", "s1", false));
    }

    #[test]
    fn test_subnet_matches_loose_pass() {
        assert!(subnet_matches("", "s1", true));
        assert!(subnet_matches("s1", "s1", true));
        assert!(!subnet_matches("s2", "s1", true));
    }

    #[test]
    fn test_map_actual_matches_by_fqdn_first() {
        let hosts = vec![
            actual("es-2", HostType::DataNode, ZONE_A, "s1"),
            actual("es-1", HostType::DataNode, ZONE_A, "s1"),
        ];
        let mut state = HostList::from(vec![
            data("first", ZONE_A).with_fqdn("es-1").with_subnet("s1"),
            data("second", ZONE_A).with_fqdn("es-2").with_subnet("s1"),
        ]);

        let mapped = map_actual_to_state(&hosts, &mut state);

        assert_eq!(mapped.as_slice()[0].name, "second");
        assert_eq!(mapped.as_slice()[1].name, "first");
        assert!(state.is_empty());
    }

    #[test]
    fn test_map_actual_structural_match_for_new_state_hosts() {
        let hosts = vec![actual("es-1", HostType::DataNode, ZONE_B, "s2")];
        let mut state = HostList::from(vec![
            data("wrong-zone", ZONE_A),
            data("planned", ZONE_B),
        ]);

        let mapped = map_actual_to_state(&hosts, &mut state);

        assert_eq!(mapped.as_slice()[0].name, "planned");
        assert_eq!(state.len(), 1);
        assert_eq!(state.as_slice()[0].name, "wrong-zone");
    }

    #[test]
    fn test_map_actual_never_steals_host_with_fqdn() {
        let hosts = vec![actual("es-new", HostType::DataNode, ZONE_A, "s1")];
        let mut state = HostList::from(vec![data("old", ZONE_A).with_fqdn("es-gone")]);

        let mapped = map_actual_to_state(&hosts, &mut state);

        assert_eq!(mapped.as_slice()[0].name, "");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_map_actual_prefers_pinned_subnet() {
        // A loose first pass would give "auto" to es-1 and leave es-2 unmatched.
        let hosts = vec![
            actual("es-1", HostType::DataNode, ZONE_A, "s1"),
            actual("es-2", HostType::DataNode, ZONE_A, "s2"),
        ];
        let mut state = HostList::from(vec![
            data("auto", ZONE_A),
            data("pinned", ZONE_A).with_subnet("s1"),
        ]);

        let mapped = map_actual_to_state(&hosts, &mut state);

        assert_eq!(mapped.as_slice()[0].name, "pinned");
        assert_eq!(mapped.as_slice()[1].name, "auto");
        assert!(state.is_empty());
    }

    #[test]
    fn test_map_actual_empty_subnet_uses_sentinel() {
        let hosts = vec![
            actual("es-1", HostType::DataNode, ZONE_A, ""),
            actual("es-2", HostType::DataNode, ZONE_A, "s1"),
        ];
        let mut state = HostList::from(vec![
            data("pinned", ZONE_A).with_subnet("s1"),
            data("auto", ZONE_A),
        ]);

        let mapped = map_actual_to_state(&hosts, &mut state);

        assert_eq!(mapped.as_slice()[0].subnet, SUBNET_NONE);
        assert_eq!(mapped.as_slice()[0].name, "auto");
        assert_eq!(mapped.as_slice()[1].name, "pinned");
    }

    #[test]
    fn test_map_actual_unknown_host_keeps_empty_name() {
        let hosts = vec![actual("es-1", HostType::MasterNode, ZONE_A, "s1")];
        let mut state = HostList::from(vec![data("d", ZONE_A)]);

        let mapped = map_actual_to_state(&hosts, &mut state);

        assert_eq!(mapped.as_slice()[0].name, "");
        assert_eq!(mapped.as_slice()[0].fqdn, "es-1");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_reconcile_fills_fqdn_and_subnet_by_name() {
        let mut old = HostList::from(vec![
            data("h1", "a").with_subnet("s1").with_fqdn("h1.fqdn"),
        ]);
        let new = HostList::from(vec![data("h1", "a")]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result.as_slice()[0].fqdn, "h1.fqdn");
        assert_eq!(result.as_slice()[0].subnet, "s1");
        assert!(old.is_empty());
    }

    #[test]
    fn test_reconcile_keeps_explicit_subnet() {
        let mut old = HostList::from(vec![
            data("h1", ZONE_A).with_subnet("s1").with_fqdn("h1.fqdn"),
        ]);
        let new = HostList::from(vec![data("h1", ZONE_A).with_subnet("s1")]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result.as_slice()[0].fqdn, "h1.fqdn");
        assert_eq!(result.as_slice()[0].subnet, "s1");
    }

    #[test]
    fn test_reconcile_changed_host_copies_nothing() {
        let mut old = HostList::from(vec![
            data("h1", ZONE_A).with_subnet("s1").with_fqdn("h1.fqdn"),
        ]);
        let new = HostList::from(vec![data("h1", ZONE_B)]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result.as_slice()[0].fqdn, "");
        assert_eq!(result.as_slice()[0].subnet, "");
        assert!(old.is_empty());
    }

    #[test]
    fn test_reconcile_changed_subnet_copies_nothing() {
        let mut old = HostList::from(vec![
            data("h1", ZONE_A).with_subnet("s1").with_fqdn("h1.fqdn"),
        ]);
        let new = HostList::from(vec![data("h1", ZONE_A).with_subnet("s2")]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result.as_slice()[0].fqdn, "");
    }

    #[test]
    fn test_reconcile_adopts_unnamed_drift_host() {
        let mut old = HostList::from(vec![
            data("h1", ZONE_A).with_subnet("s1").with_fqdn("h1.fqdn"),
            data("", ZONE_B).with_subnet("s2").with_fqdn("drift.fqdn"),
        ]);
        let new = HostList::from(vec![data("h1", ZONE_A), data("h2", ZONE_B)]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result.as_slice()[1].fqdn, "drift.fqdn");
        assert_eq!(result.as_slice()[1].subnet, "s2");
        assert!(old.is_empty());
    }

    #[test]
    fn test_reconcile_drift_prefers_pinned_subnet() {
        // A loose first pass would give f2 to x and leave y unmatched.
        let mut old = HostList::from(vec![
            data("", ZONE_A).with_subnet("s2").with_fqdn("f2"),
            data("", ZONE_A).with_subnet("s1").with_fqdn("f1"),
        ]);
        let new = HostList::from(vec![
            data("x", ZONE_A),
            data("y", ZONE_A).with_subnet("s2"),
        ]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result.as_slice()[0].fqdn, "f1");
        assert_eq!(result.as_slice()[0].subnet, "s1");
        assert_eq!(result.as_slice()[1].fqdn, "f2");
        assert!(old.is_empty());
    }

    #[test]
    fn test_reconcile_does_not_adopt_named_old_host() {
        let mut old = HostList::from(vec![data("h1", ZONE_A).with_fqdn("h1.fqdn")]);
        let new = HostList::from(vec![data("h2", ZONE_A)]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result.as_slice()[0].fqdn, "");
        assert_eq!(old.len(), 1);
    }

    #[test]
    fn test_reconcile_new_host_stays_uncalculated() {
        let mut old = HostList::new();
        let new = HostList::from(vec![data("h1", ZONE_A), master("m1", ZONE_A)]);

        let result = reconcile_desired_with_state(&mut old, &new).unwrap();

        assert_eq!(result, new);
    }

    #[test]
    fn test_reconcile_rejects_master_count_change() {
        let mut old = HostList::from(vec![
            master("m1", ZONE_A).with_fqdn("m1.fqdn"),
            data("d1", ZONE_A).with_fqdn("d1.fqdn"),
        ]);
        let new = HostList::from(vec![data("d1", ZONE_A), data("d2", ZONE_A)]);
        let old_before = old.clone();

        let err = reconcile_desired_with_state(&mut old, &new).unwrap_err();

        assert_eq!(err, ReconcileError::MasterCountChanged { old: 1, new: 0 });
        assert!(err.to_string().contains("master nodes"));
        assert_eq!(old, old_before);
    }

    #[test]
    fn test_reconcile_allows_masters_on_first_apply() {
        let mut old = HostList::new();
        let new = HostList::from(vec![master("m1", ZONE_A), master("m2", ZONE_B)]);

        assert!(reconcile_desired_with_state(&mut old, &new).is_ok());
    }

    #[test]
    fn test_summarize_classifies_hosts() {
        let before = HostList::from(vec![
            data("kept", ZONE_A).with_fqdn("kept.fqdn"),
            data("gone", ZONE_B).with_fqdn("gone.fqdn"),
            data("never-created", ZONE_B),
        ]);
        let after = HostList::from(vec![
            data("kept", ZONE_A).with_fqdn("kept.fqdn"),
            data("fresh", ZONE_A),
        ]);

        let changes = summarize(&before, &after);

        let kinds: Vec<(HostChange, &str)> = changes
            .iter()
            .map(|(c, h)| (*c, h.name.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (HostChange::Keep, "kept"),
                (HostChange::Create, "fresh"),
                (HostChange::Delete, "gone"),
            ]
        );
    }

    #[test]
    fn test_summarize_recreated_host_is_deleted_and_created() {
        let mut old = HostList::from(vec![data("h1", ZONE_A).with_fqdn("h1.fqdn")]);
        let before = old.clone();
        let new = HostList::from(vec![data("h1", ZONE_B)]);

        let after = reconcile_desired_with_state(&mut old, &new).unwrap();
        let changes = summarize(&before, &after);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].0, HostChange::Create);
        assert_eq!(changes[1].0, HostChange::Delete);
        assert_eq!(changes[1].1.fqdn, "h1.fqdn");
    }

    #[test]
    fn test_classify_mapped_reports_unnamed_and_missing() {
        let hosts = vec![
            actual("es-1", HostType::DataNode, ZONE_A, "s1"),
            actual("es-2", HostType::MasterNode, ZONE_A, "s1"),
        ];
        let mut state = HostList::from(vec![
            data("d1", ZONE_A).with_fqdn("es-1"),
            data("planned", ZONE_B),
        ]);

        let mapped = map_actual_to_state(&hosts, &mut state);
        let changes = classify_mapped(&mapped, &state);

        let kinds: Vec<(HostChange, &str)> = changes
            .iter()
            .map(|(c, h)| (*c, h.fqdn.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (HostChange::Keep, "es-1"),
                (HostChange::Unnamed, "es-2"),
                (HostChange::Missing, ""),
            ]
        );
        assert_eq!(changes[2].1.name, "planned");
    }

    #[test]
    fn test_master_count_error_display() {
        let err = ReconcileError::MasterCountChanged { old: 3, new: 1 };
        assert_eq!(
            err.to_string(),
            "changing the number of master nodes is not supported: state has 3, configuration has 1"
        );
    }
}
