//! Capability probing for a single adapter.

use log::debug;

use crate::Result;
use crate::api::daemon::ConnectionDaemon;
use crate::api::models::{Adapter, WifiMode};
use crate::api::radio::RadioControl;

/// Fills in an adapter's AP/monitor flags from the driver's mode list and its
/// managed flag from the connection daemon.
///
/// Overwrites whatever was there before, so probing twice against the same
/// answers leaves the adapter unchanged.
pub fn probe_capabilities<R, D>(adapter: &mut Adapter, radio: &R, daemon: &D) -> Result<()>
where
    R: RadioControl + ?Sized,
    D: ConnectionDaemon + ?Sized,
{
    let modes = radio.supported_modes(adapter.handle())?;
    adapter.set_has_monitor_mode(modes.contains(&WifiMode::Monitor));
    adapter.set_has_ap_mode(modes.contains(&WifiMode::Ap));

    let managed = daemon.is_managed(adapter.name())?;
    adapter.set_managed_by_daemon(managed);

    debug!(
        "{}: capabilities {}, managed by NetworkManager: {}",
        adapter.name(),
        adapter.capabilities(),
        managed
    );
    Ok(())
}
