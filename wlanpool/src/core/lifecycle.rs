//! Driver-facing adapter operations: mode, channel, MAC and rfkill.

use log::{debug, info};

use crate::Result;
use crate::api::models::{Adapter, AdapterError, MacAddress, WifiMode};
use crate::api::radio::RadioControl;

/// Takes the interface down, switches mode, and brings it back up.
pub(crate) fn set_mode<R>(radio: &R, adapter: &Adapter, mode: &WifiMode) -> Result<()>
where
    R: RadioControl + ?Sized,
{
    let dev = adapter.handle();
    radio.down(dev)?;
    radio.set_mode(dev, mode)?;
    radio.up(dev)?;
    debug!("{} switched to {mode} mode", adapter.name());
    Ok(())
}

pub(crate) fn set_channel<R>(radio: &R, adapter: &Adapter, channel: u32) -> Result<()>
where
    R: RadioControl + ?Sized,
{
    radio.set_channel(adapter.handle(), channel)?;
    debug!("{} tuned to channel {channel}", adapter.name());
    Ok(())
}

/// Programs `mac` into the device and records it on the adapter.
///
/// `mac` is parsed before the driver is touched and sent in canonical form,
/// so the recorded address always matches what the device was given. A
/// driver "invalid argument" becomes [`AdapterError::InvalidMacAddress`];
/// other driver errors pass through.
pub(crate) fn set_mac<R>(radio: &R, adapter: &mut Adapter, mac: &str) -> Result<()>
where
    R: RadioControl + ?Sized,
{
    let parsed: MacAddress = mac.parse()?;
    radio
        .set_mac(adapter.handle(), &parsed.to_string())
        .map_err(|e| {
            if e.is_invalid_argument() {
                AdapterError::InvalidMacAddress(mac.to_string())
            } else {
                AdapterError::Radio(e)
            }
        })?;
    adapter.set_current_mac(parsed);
    info!("{} MAC address changed to {}", adapter.name(), adapter.mac_address());
    Ok(())
}

/// Clears an rfkill soft block, touching the driver only when one is set.
pub(crate) fn unblock<R>(radio: &R, adapter: &Adapter) -> Result<()>
where
    R: RadioControl + ?Sized,
{
    let dev = adapter.handle();
    if radio.is_soft_blocked(dev)? {
        radio.unblock(dev)?;
        info!("{} unblocked", adapter.name());
    }
    Ok(())
}
