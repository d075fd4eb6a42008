//! A Rust library for allocating wireless adapters to AP, monitor and uplink duty.
//!
//! Tools that host rogue access points or capture raw 802.11 traffic need
//! exclusive, mode-switched control over one or more radios, while other
//! radios may stay under normal system management. This crate provides:
//!
//! - Discovery of wireless adapters and probing of AP/monitor support
//! - Detection of adapters managed by NetworkManager, and switching it off
//! - Best-fit selection of adapters for a role, single or paired
//! - Mode, channel, MAC address and rfkill control of the chosen adapters
//! - Best-effort teardown back to managed mode and original MAC addresses
//!
//! # Example
//!
//! ```no_run
//! use wlanpool::{AdapterRegistry, NetworkManagerDaemon, RadioControl, Role, WifiMode};
//!
//! fn run<R: RadioControl>(radio: R) -> wlanpool::Result<()> {
//!     let mut registry = AdapterRegistry::new(radio, NetworkManagerDaemon::new());
//!     registry.start()?;
//!
//!     // Let the registry pick a pair of radios...
//!     let pair = registry.select_interfaces_automatically()?;
//!     registry.set_mode(&pair.monitor, WifiMode::Monitor)?;
//!
//!     // ...or name the uplink explicitly
//!     registry.validate("wlan2", Some(Role::Internet))?;
//!
//!     registry.on_exit();
//!     Ok(())
//! }
//! ```
//!
//! # Radio Control
//!
//! The crate does not drive hardware. Callers supply an implementation of
//! [`RadioControl`] wrapping their nl80211/rfkill library; every failure it
//! reports carries an errno-style code that the registry either interprets
//! (19, 22, 93) or passes through untouched.
//!
//! # Error Handling
//!
//! All operations return `Result<T, AdapterError>`. Validation failures are
//! returned at the point of detection and never logged-and-swallowed.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod dbus;
mod types;
mod util;

// Public API modules
pub mod api;

// Re-exported public API
pub use api::daemon::{ConnectionDaemon, DaemonLink, NetworkManagerDaemon, NoDaemon};
pub use api::models::{
    Adapter, AdapterError, AdapterFlag, Capabilities, InterfacePair, InvalidReason, MacAddress,
    RegistryOptions, Role, WifiMode,
};
pub use api::radio::{DeviceHandle, RadioControl, RadioError, RadioResult};
pub use api::registry::AdapterRegistry;
pub use crate::core::probe::probe_capabilities;
pub use util::mac::{random_mac_address, random_mac_address_from};

/// A specialized `Result` type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
