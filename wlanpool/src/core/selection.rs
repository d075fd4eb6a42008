//! Interface selection.
//!
//! Pure functions over the registry's adapter map and active set. They decide
//! which adapter to hand out; recording the allocation is the caller's job.

use std::collections::{BTreeMap, BTreeSet};

use crate::Result;
use crate::api::models::{
    Adapter, AdapterError, Capabilities, InterfacePair, InvalidReason, Role,
};

/// Checks that `name` can be allocated for `role`.
pub(crate) fn validate(
    adapters: &BTreeMap<String, Adapter>,
    active: &BTreeSet<String>,
    name: &str,
    role: Option<Role>,
) -> Result<()> {
    let adapter = adapters
        .get(name)
        .ok_or_else(|| AdapterError::invalid(name, InvalidReason::Unknown))?;

    if active.contains(name) {
        return Err(AdapterError::invalid(name, InvalidReason::AlreadyActive));
    }

    match role {
        Some(Role::Ap) if !adapter.has_ap_mode() => {
            return Err(AdapterError::invalid(name, InvalidReason::NoApMode));
        }
        Some(Role::Monitor) if !adapter.has_monitor_mode() => {
            return Err(AdapterError::invalid(name, InvalidReason::NoMonitorMode));
        }
        _ => {}
    }

    if role.is_some_and(Role::needs_exclusive_control) && adapter.is_managed_by_daemon() {
        return Err(AdapterError::ManagedByDaemon {
            interface: name.to_string(),
        });
    }

    Ok(())
}

/// Picks one free adapter whose capabilities cover `request`.
///
/// Candidates with the fewest unrequested capabilities win; ties keep map
/// order. When a capability is requested, daemon-managed adapters are passed
/// over.
pub(crate) fn select_one(
    adapters: &BTreeMap<String, Adapter>,
    active: &BTreeSet<String>,
    request: Capabilities,
) -> Result<String> {
    let mut candidates: Vec<&Adapter> = free(adapters, active)
        .filter(|a| a.capabilities().contains(request))
        .collect();
    if candidates.is_empty() {
        return Err(AdapterError::InterfaceNotFound(request));
    }

    // stable: equal surplus keeps map order
    candidates.sort_by_key(|a| a.capabilities().surplus_over(request));

    let exclusive = !request.is_empty();
    candidates
        .iter()
        .find(|a| !(exclusive && a.is_managed_by_daemon()))
        .map(|a| a.name().to_string())
        .ok_or_else(|| AdapterError::ManagedByDaemon {
            interface: join_names(&candidates),
        })
}

/// Picks two distinct free adapters for AP and monitor duty.
///
/// Daemon-managed adapters are left out. If only they could complete a pair,
/// the failure says so instead of reporting that nothing was found.
pub(crate) fn select_pair(
    adapters: &BTreeMap<String, Adapter>,
    active: &BTreeSet<String>,
) -> Result<InterfacePair> {
    let pool: Vec<&Adapter> = free(adapters, active).collect();
    let unmanaged: Vec<&Adapter> = pool
        .iter()
        .copied()
        .filter(|a| !a.is_managed_by_daemon())
        .collect();

    if let Some(pair) = pair_from(&unmanaged) {
        return Ok(pair);
    }

    if pair_from(&pool).is_some() {
        let managed: Vec<&Adapter> = pool
            .into_iter()
            .filter(|a| a.is_managed_by_daemon())
            .collect();
        return Err(AdapterError::ManagedByDaemon {
            interface: join_names(&managed),
        });
    }

    Err(AdapterError::InterfaceNotFound(
        Capabilities::AP | Capabilities::MONITOR,
    ))
}

/// Ordered pairing rules:
///
/// 1. an AP-only adapter with a monitor-only adapter;
/// 2. a dual adapter on AP with any other monitor-capable adapter;
/// 3. a dual adapter on monitor with an AP-only adapter.
fn pair_from(pool: &[&Adapter]) -> Option<InterfacePair> {
    let exactly = |caps: Capabilities| {
        pool.iter()
            .copied()
            .filter(move |a| a.capabilities() == caps)
    };

    let ap_only = exactly(Capabilities::AP).next();
    let monitor_only = exactly(Capabilities::MONITOR).next();
    let dual: Vec<&Adapter> = exactly(Capabilities::AP | Capabilities::MONITOR).collect();

    if let (Some(ap), Some(monitor)) = (ap_only, monitor_only) {
        return Some(pair(ap, monitor));
    }

    let first_dual = dual.first().copied()?;
    if let Some(monitor) = monitor_only.or_else(|| dual.get(1).copied()) {
        return Some(pair(first_dual, monitor));
    }
    ap_only.map(|ap| pair(ap, first_dual))
}

fn pair(ap: &Adapter, monitor: &Adapter) -> InterfacePair {
    InterfacePair {
        ap: ap.name().to_string(),
        monitor: monitor.name().to_string(),
    }
}

fn free<'a>(
    adapters: &'a BTreeMap<String, Adapter>,
    active: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a Adapter> + 'a {
    adapters
        .values()
        .filter(move |a| !active.contains(a.name()))
}

fn join_names(adapters: &[&Adapter]) -> String {
    adapters
        .iter()
        .map(|a| a.name())
        .collect::<Vec<_>>()
        .join(", ")
}
