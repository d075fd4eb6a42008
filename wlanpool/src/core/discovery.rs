//! Adapter discovery.
//!
//! Walks every wireless interface the radio layer reports and builds a probed
//! [`Adapter`] for each. Devices that cannot take part are skipped; any other
//! driver failure aborts the pass.

use log::{info, warn};

use crate::Result;
use crate::api::daemon::ConnectionDaemon;
use crate::api::models::Adapter;
use crate::api::radio::{RadioControl, RadioError};
use crate::core::probe::probe_capabilities;

/// Handle errors meaning "leave this device out" rather than "stop".
fn is_skippable(err: &RadioError) -> bool {
    err.is_unsupported_device() || err.is_no_such_device()
}

/// Discovers and probes all wireless adapters.
pub(crate) fn discover_adapters<R, D>(radio: &R, daemon: &D) -> Result<Vec<Adapter>>
where
    R: RadioControl + ?Sized,
    D: ConnectionDaemon + ?Sized,
{
    let names = radio.interfaces()?;

    let mut adapters = Vec::with_capacity(names.len());
    for name in names {
        let handle = match radio.device(&name) {
            Ok(handle) => handle,
            Err(e) if is_skippable(&e) => {
                warn!("Skipping {name}: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let mac = radio.mac_address(&handle)?;
        let mut adapter = Adapter::new(name, handle, mac);
        probe_capabilities(&mut adapter, radio, daemon)?;

        info!(
            "Found {} ({}) with {} capability",
            adapter.name(),
            adapter.mac_address(),
            adapter.capabilities()
        );
        adapters.push(adapter);
    }
    Ok(adapters)
}
