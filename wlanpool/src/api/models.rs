use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use zvariant::Value;

use crate::api::radio::{DeviceHandle, RadioError};

bitflags! {
    /// Radio capabilities the registry allocates against.
    ///
    /// Selection prefers adapters whose capability set exceeds the request by
    /// as few bits as possible, so a dual-capable radio stays free for a
    /// request that needs both.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The radio can host an access point.
        const AP = 1 << 0;
        /// The radio can capture raw 802.11 frames.
        const MONITOR = 1 << 1;
    }
}

impl Capabilities {
    /// Builds a capability set from the two request booleans.
    pub fn from_request(needs_ap: bool, needs_monitor: bool) -> Self {
        let mut caps = Self::empty();
        caps.set(Self::AP, needs_ap);
        caps.set(Self::MONITOR, needs_monitor);
        caps
    }

    /// Number of capabilities in `self` that `request` does not ask for.
    pub fn surplus_over(self, request: Self) -> u32 {
        self.difference(request).bits().count_ones()
    }
}

impl Display for Capabilities {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.contains(Self::AP), self.contains(Self::MONITOR)) {
            (true, true) => write!(f, "AP+monitor"),
            (true, false) => write!(f, "AP"),
            (false, true) => write!(f, "monitor"),
            (false, false) => write!(f, "none"),
        }
    }
}

/// nl80211 interface modes, named the way the driver reports them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiMode {
    /// Station mode under normal system management. The neutral mode.
    Managed,
    /// Raw frame capture.
    Monitor,
    /// Access point.
    #[serde(rename = "AP")]
    Ap,
    /// Any other mode the driver lists (`IBSS`, `mesh point`, ...).
    Other(String),
}

impl WifiMode {
    /// The mode name as the driver spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Managed => "managed",
            Self::Monitor => "monitor",
            Self::Ap => "AP",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for WifiMode {
    fn from(name: &str) -> Self {
        match name {
            "managed" => Self::Managed,
            "monitor" => Self::Monitor,
            "AP" => Self::Ap,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for WifiMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role an interface is requested for in [`validate`](crate::AdapterRegistry::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Access point duty. Requires AP mode and exclusive control.
    #[serde(rename = "AP")]
    Ap,
    /// Packet capture duty. Requires monitor mode and exclusive control.
    #[serde(rename = "monitor")]
    Monitor,
    /// Internet uplink. Stays under normal system management.
    #[serde(rename = "internet")]
    Internet,
}

impl Role {
    /// Whether the role needs the radio taken away from the connection daemon.
    pub fn needs_exclusive_control(self) -> bool {
        matches!(self, Self::Ap | Self::Monitor)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ap => write!(f, "AP"),
            Self::Monitor => write!(f, "monitor"),
            Self::Internet => write!(f, "internet"),
        }
    }
}

/// A syntactically valid MAC address.
///
/// Parses `xx:xx:xx:xx:xx:xx` in either case and always displays lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Wraps raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The raw octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AdapterError::InvalidMacAddress(s.to_string());

        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Boolean adapter fields that can be assigned from dynamically typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterFlag {
    /// [`Adapter::has_ap_mode`].
    ApMode,
    /// [`Adapter::has_monitor_mode`].
    MonitorMode,
    /// [`Adapter::is_managed_by_daemon`].
    ManagedByDaemon,
}

impl AdapterFlag {
    fn field(self) -> &'static str {
        match self {
            Self::ApMode => "has_ap_mode",
            Self::MonitorMode => "has_monitor_mode",
            Self::ManagedByDaemon => "is_managed_by_daemon",
        }
    }
}

/// One physical wireless interface and what the registry knows about it.
///
/// The name and device handle are fixed at construction. Capability flags
/// start out `false` until the prober fills them in.
///
/// # Example
///
/// ```rust
/// use wlanpool::{Adapter, DeviceHandle, MacAddress};
///
/// let mac: MacAddress = "00:11:22:33:44:55".parse().unwrap();
/// let mut adapter = Adapter::new("wlan0", DeviceHandle::new(0, 3), mac);
/// adapter.set_has_ap_mode(true);
///
/// assert!(adapter.has_ap_mode());
/// assert!(!adapter.has_monitor_mode());
/// assert_eq!(adapter.mac_address(), adapter.original_mac_address());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    name: String,
    handle: DeviceHandle,
    original_mac: MacAddress,
    current_mac: MacAddress,
    capabilities: Capabilities,
    managed_by_daemon: bool,
}

impl Adapter {
    /// Creates an adapter with no capabilities, not managed by the daemon.
    pub fn new(name: impl Into<String>, handle: DeviceHandle, mac: MacAddress) -> Self {
        Self {
            name: name.into(),
            handle,
            original_mac: mac,
            current_mac: mac,
            capabilities: Capabilities::empty(),
            managed_by_daemon: false,
        }
    }

    /// Interface name (e.g., "wlan0").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle the radio control layer addresses this device by.
    pub fn handle(&self) -> &DeviceHandle {
        &self.handle
    }

    /// MAC address observed at discovery.
    pub fn original_mac_address(&self) -> &MacAddress {
        &self.original_mac
    }

    /// MAC address currently programmed into the device.
    pub fn mac_address(&self) -> &MacAddress {
        &self.current_mac
    }

    /// Full capability set.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether the radio can act as an access point.
    pub fn has_ap_mode(&self) -> bool {
        self.capabilities.contains(Capabilities::AP)
    }

    /// Whether the radio can capture in monitor mode.
    pub fn has_monitor_mode(&self) -> bool {
        self.capabilities.contains(Capabilities::MONITOR)
    }

    /// Whether the connection daemon currently controls this interface.
    pub fn is_managed_by_daemon(&self) -> bool {
        self.managed_by_daemon
    }

    /// Sets the AP capability flag.
    pub fn set_has_ap_mode(&mut self, value: bool) {
        self.capabilities.set(Capabilities::AP, value);
    }

    /// Sets the monitor capability flag.
    pub fn set_has_monitor_mode(&mut self, value: bool) {
        self.capabilities.set(Capabilities::MONITOR, value);
    }

    /// Sets whether the connection daemon controls this interface.
    pub fn set_managed_by_daemon(&mut self, value: bool) {
        self.managed_by_daemon = value;
    }

    /// Assigns a flag from a D-Bus value.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidValue`] for anything but a boolean; the
    /// flag keeps its previous value.
    pub fn set_flag(&mut self, flag: AdapterFlag, value: &Value<'_>) -> Result<(), AdapterError> {
        let Value::Bool(value) = *value else {
            return Err(AdapterError::InvalidValue {
                field: flag.field(),
                found: format!("{value:?}"),
            });
        };

        match flag {
            AdapterFlag::ApMode => self.set_has_ap_mode(value),
            AdapterFlag::MonitorMode => self.set_has_monitor_mode(value),
            AdapterFlag::ManagedByDaemon => self.set_managed_by_daemon(value),
        }
        Ok(())
    }

    /// Records a new current MAC address.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidMacAddress`] if `mac` is not of the form
    /// `xx:xx:xx:xx:xx:xx`.
    pub fn set_mac_address(&mut self, mac: &str) -> Result<(), AdapterError> {
        self.set_current_mac(mac.parse()?);
        Ok(())
    }

    /// Records an already parsed MAC address as current.
    pub fn set_current_mac(&mut self, mac: MacAddress) {
        self.current_mac = mac;
    }
}

/// Two distinct interfaces chosen to cover access point and capture duty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfacePair {
    /// Interface assigned to access point duty.
    pub ap: String,
    /// Interface assigned to monitor duty.
    pub monitor: String,
}

/// Registry behaviour knobs.
///
/// # Examples
///
/// ```rust
/// use wlanpool::{RegistryOptions, WifiMode};
///
/// // Keep the randomized MAC after exit
/// let opts = RegistryOptions {
///     restore_mac_on_exit: false,
///     ..RegistryOptions::default()
/// };
/// assert_eq!(opts.teardown_mode, WifiMode::Managed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Mode every active adapter is returned to on exit.
    pub teardown_mode: WifiMode,
    /// Put the discovery-time MAC back on exit if it was changed.
    pub restore_mac_on_exit: bool,
    /// Re-enable the connection daemon on exit if this process disabled it.
    pub restore_daemon_on_exit: bool,
}

impl Default for RegistryOptions {
    /// Returns the default options.
    ///
    /// Defaults:
    /// - `teardown_mode`: `managed`
    /// - `restore_mac_on_exit`: `true`
    /// - `restore_daemon_on_exit`: `true`
    fn default() -> Self {
        Self {
            teardown_mode: WifiMode::Managed,
            restore_mac_on_exit: true,
            restore_daemon_on_exit: true,
        }
    }
}

/// Why an interface failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// No adapter with that name was discovered.
    Unknown,
    /// The adapter is already allocated.
    AlreadyActive,
    /// AP duty was requested but the radio lacks AP mode.
    NoApMode,
    /// Monitor duty was requested but the radio lacks monitor mode.
    NoMonitorMode,
}

impl Display for InvalidReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "no such wireless interface"),
            Self::AlreadyActive => write!(f, "already in use"),
            Self::NoApMode => write!(f, "does not support AP mode"),
            Self::NoMonitorMode => write!(f, "does not support monitor mode"),
        }
    }
}

/// Errors that can occur while discovering, allocating or preparing adapters.
///
/// # Examples
///
/// ```no_run
/// use wlanpool::{AdapterError, AdapterRegistry, ConnectionDaemon, RadioControl, Role};
///
/// fn pick_ap<R: RadioControl, D: ConnectionDaemon>(
///     registry: &mut AdapterRegistry<R, D>,
///     name: &str,
/// ) -> wlanpool::Result<()> {
///     match registry.validate(name, Some(Role::Ap)) {
///         Ok(()) => Ok(()),
///         Err(AdapterError::ManagedByDaemon { .. }) => {
///             // Take the radio away from NetworkManager and try again
///             registry.set_daemon_enabled(false)?;
///             registry.probe(name)?;
///             registry.validate(name, Some(Role::Ap))
///         }
///         Err(e) => Err(e),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A flag was assigned something other than a boolean.
    #[error("invalid value for {field}: expected a boolean, got {found}")]
    InvalidValue {
        /// Field being assigned
        field: &'static str,
        /// Rendering of the rejected value
        found: String,
    },

    /// The interface is unknown, already allocated, or lacks the requested mode.
    #[error("invalid interface {name}: {reason}")]
    InvalidInterface {
        /// Interface name
        name: String,
        /// What disqualified it
        reason: InvalidReason,
    },

    /// The interface is capable but NetworkManager controls it.
    #[error("interface {interface} is managed by NetworkManager")]
    ManagedByDaemon {
        /// Interface name, or a comma-separated list when every candidate is managed
        interface: String,
    },

    /// No adapter, or adapter pair, covers the requested capabilities.
    #[error("no free interface with {0} capability could be found")]
    InterfaceNotFound(Capabilities),

    /// The driver rejected a MAC address as malformed.
    #[error("invalid MAC address: {0}")]
    InvalidMacAddress(String),

    /// Any other driver failure, passed through with its code.
    #[error(transparent)]
    Radio(#[from] RadioError),

    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A D-Bus operation failed with context about what was being attempted.
    #[error("{context}: {source}")]
    DbusOperation {
        /// What was being attempted
        context: String,
        /// The underlying D-Bus error
        #[source]
        source: zbus::Error,
    },
}

impl AdapterError {
    pub(crate) fn invalid(name: &str, reason: InvalidReason) -> Self {
        Self::InvalidInterface {
            name: name.to_string(),
            reason,
        }
    }
}
