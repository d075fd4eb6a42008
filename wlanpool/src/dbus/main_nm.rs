//! Main NetworkManager proxy.

use zbus::proxy;
use zvariant::OwnedObjectPath;

/// Proxy for the main NetworkManager interface.
///
/// Only the surface the registry needs: device enumeration and the global
/// networking switch.
#[proxy(
    interface = "org.freedesktop.NetworkManager",
    default_service = "org.freedesktop.NetworkManager",
    default_path = "/org/freedesktop/NetworkManager",
    gen_async = false
)]
pub(crate) trait NM {
    /// Returns paths to all network devices.
    fn get_devices(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    /// Turns all networking on or off.
    ///
    /// NetworkManager rejects the call when the requested state is already
    /// in effect, so read `NetworkingEnabled` first.
    fn enable(&self, enable: bool) -> zbus::Result<()>;

    /// Whether networking is globally enabled.
    #[zbus(property)]
    fn networking_enabled(&self) -> zbus::Result<bool>;
}
