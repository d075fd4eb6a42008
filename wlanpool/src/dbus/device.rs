//! NetworkManager Device proxy.

use zbus::{Result, proxy};

/// Proxy for NetworkManager device interface.
///
/// Provides the interface name used to match a radio to its NetworkManager
/// device, and the flag telling whether NetworkManager controls it.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Device",
    default_service = "org.freedesktop.NetworkManager",
    gen_async = false
)]
pub(crate) trait NMDevice {
    /// The network interface name (e.g., "wlan0").
    #[zbus(property)]
    fn interface(&self) -> Result<String>;

    /// Whether NetworkManager manages this device.
    #[zbus(property)]
    fn managed(&self) -> Result<bool>;
}
