//! The seam to the low-level radio control library.
//!
//! The registry never talks to nl80211 or rfkill itself. Whatever drives the
//! hardware implements [`RadioControl`], and every failure it reports comes
//! back as a [`RadioError`] carrying the driver's numeric code.

use std::fmt::{self, Display, Formatter};
use thiserror::Error;

use crate::api::models::{MacAddress, WifiMode};
use crate::types::constants::errno;

/// Opaque address of one wireless device as understood by [`RadioControl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    /// Wiphy index of the physical radio.
    pub phy: u32,
    /// Kernel interface index.
    pub ifindex: u32,
}

impl DeviceHandle {
    /// Creates a handle from a wiphy index and an interface index.
    pub fn new(phy: u32, ifindex: u32) -> Self {
        Self { phy, ifindex }
    }
}

impl Display for DeviceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "phy{}/if{}", self.phy, self.ifindex)
    }
}

/// A failure reported by the radio control layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("radio error {code}: {message}")]
pub struct RadioError {
    /// errno-style code.
    pub code: i32,
    /// Driver-supplied description.
    pub message: String,
}

impl RadioError {
    /// Creates an error from a driver code and its description.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The device is not an nl80211 radio.
    pub fn is_unsupported_device(&self) -> bool {
        self.code == errno::UNSUPPORTED_DEVICE
    }

    /// The device vanished between enumeration and use.
    pub fn is_no_such_device(&self) -> bool {
        self.code == errno::NO_SUCH_DEVICE
    }

    /// The driver rejected an argument.
    pub fn is_invalid_argument(&self) -> bool {
        self.code == errno::INVALID_ARGUMENT
    }
}

/// Shorthand for results from [`RadioControl`].
pub type RadioResult<T> = std::result::Result<T, RadioError>;

/// Per-device radio operations the registry relies on.
///
/// Calls block until the driver answers. Implementations take `&self` so a
/// single handle to the driver can be shared by the registry and its caller.
pub trait RadioControl {
    /// Names of all wireless interfaces currently attached.
    fn interfaces(&self) -> RadioResult<Vec<String>>;

    /// Resolves an interface name to a device handle.
    fn device(&self, name: &str) -> RadioResult<DeviceHandle>;

    /// Hardware address currently programmed into the device.
    fn mac_address(&self, dev: &DeviceHandle) -> RadioResult<MacAddress>;

    /// Interface modes the device supports.
    fn supported_modes(&self, dev: &DeviceHandle) -> RadioResult<Vec<WifiMode>>;

    /// Brings the interface administratively up.
    fn up(&self, dev: &DeviceHandle) -> RadioResult<()>;

    /// Brings the interface administratively down.
    fn down(&self, dev: &DeviceHandle) -> RadioResult<()>;

    /// Changes the interface mode. Drivers refuse this on a live interface.
    fn set_mode(&self, dev: &DeviceHandle, mode: &WifiMode) -> RadioResult<()>;

    /// Tunes the radio to `channel`.
    fn set_channel(&self, dev: &DeviceHandle, channel: u32) -> RadioResult<()>;

    /// Programs a new hardware address. Syntax checking is left to the driver.
    fn set_mac(&self, dev: &DeviceHandle, mac: &str) -> RadioResult<()>;

    /// Whether rfkill has the radio soft-blocked.
    fn is_soft_blocked(&self, dev: &DeviceHandle) -> RadioResult<bool>;

    /// Clears the rfkill soft block.
    fn unblock(&self, dev: &DeviceHandle) -> RadioResult<()>;
}
