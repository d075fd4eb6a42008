use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::Result;
use crate::api::daemon::ConnectionDaemon;
use crate::api::models::{
    Adapter, AdapterError, Capabilities, InterfacePair, InvalidReason, MacAddress,
    RegistryOptions, Role, WifiMode,
};
use crate::api::radio::RadioControl;
use crate::core::discovery::discover_adapters;
use crate::core::lifecycle;
use crate::core::probe::probe_capabilities;
use crate::core::selection;
use crate::util::mac::random_mac_address;

/// Registry of the host's wireless adapters and their allocation.
///
/// This is the main entry point: it discovers adapters through a
/// [`RadioControl`], asks a [`ConnectionDaemon`] which of them NetworkManager
/// owns, hands interfaces out for AP, monitor or internet duty, and puts
/// everything back on exit.
///
/// # Creating an Instance
///
/// ```no_run
/// use wlanpool::{AdapterRegistry, NetworkManagerDaemon, RadioControl};
///
/// fn open<R: RadioControl>(radio: R) -> wlanpool::Result<()> {
///     let mut registry = AdapterRegistry::new(radio, NetworkManagerDaemon::new());
///     registry.start()?;
///     Ok(())
/// }
/// ```
///
/// # Allocation
///
/// An interface handed out by [`validate`](Self::validate),
/// [`select_interface`](Self::select_interface) or
/// [`select_interfaces_automatically`](Self::select_interfaces_automatically)
/// becomes *active* and is not handed out again. The active set only guards
/// against double allocation inside this process; it is not an OS lock.
///
/// ```no_run
/// use wlanpool::{AdapterRegistry, ConnectionDaemon, RadioControl, WifiMode};
///
/// fn prepare<R: RadioControl, D: ConnectionDaemon>(
///     registry: &mut AdapterRegistry<R, D>,
/// ) -> wlanpool::Result<()> {
///     let pair = registry.select_interfaces_automatically()?;
///
///     registry.set_mode(&pair.monitor, WifiMode::Monitor)?;
///     registry.set_random_mac_address(&pair.ap)?;
///     registry.unblock(&pair.ap)?;
///
///     // ... run the access point and capture ...
///
///     registry.on_exit();
///     Ok(())
/// }
/// ```
///
/// # Thread Safety
///
/// All calls block until the driver or D-Bus answers. The registry is meant to
/// be owned by one caller; wrap it in a mutex if several threads need it.
#[derive(Debug)]
pub struct AdapterRegistry<R, D> {
    radio: R,
    daemon: D,
    options: RegistryOptions,
    adapters: BTreeMap<String, Adapter>,
    active: BTreeSet<String>,
}

impl<R: RadioControl, D: ConnectionDaemon> AdapterRegistry<R, D> {
    /// Creates an empty registry with default options.
    pub fn new(radio: R, daemon: D) -> Self {
        Self::with_options(radio, daemon, RegistryOptions::default())
    }

    /// Creates an empty registry with the given options.
    pub fn with_options(radio: R, daemon: D, options: RegistryOptions) -> Self {
        Self {
            radio,
            daemon,
            options,
            adapters: BTreeMap::new(),
            active: BTreeSet::new(),
        }
    }

    /// Discovers and probes every wireless adapter.
    ///
    /// Devices that vanished or do not speak nl80211 are logged and skipped.
    ///
    /// # Errors
    ///
    /// Any other driver error, or a daemon error while probing, aborts
    /// discovery and is returned unchanged.
    pub fn start(&mut self) -> Result<()> {
        let found = discover_adapters(&self.radio, &self.daemon)?;
        info!("Discovered {} wireless adapter(s)", found.len());
        for adapter in found {
            self.adapters.insert(adapter.name().to_string(), adapter);
        }
        Ok(())
    }

    /// Re-runs capability probing for one known adapter.
    pub fn probe(&mut self, name: &str) -> Result<()> {
        let adapter = self
            .adapters
            .get_mut(name)
            .ok_or_else(|| AdapterError::invalid(name, InvalidReason::Unknown))?;
        probe_capabilities(adapter, &self.radio, &self.daemon)
    }

    /// Checks that `name` may be used for `role` and allocates it.
    ///
    /// Internet duty never looks at the daemon flag: a managed interface is
    /// exactly what normal connectivity wants.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidInterface`] if the name is unknown, already
    ///   active, or lacks the mode `role` needs.
    /// - [`AdapterError::ManagedByDaemon`] if the interface is capable but
    ///   NetworkManager controls it and `role` is AP or monitor.
    pub fn validate(&mut self, name: &str, role: Option<Role>) -> Result<()> {
        selection::validate(&self.adapters, &self.active, name, role)?;
        self.activate(name);
        Ok(())
    }

    /// Allocates one interface offering the requested capabilities.
    ///
    /// Among the matches, the adapter with the fewest capabilities beyond the
    /// request wins, keeping dual-capable radios free for requests that need
    /// both.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InterfaceNotFound`] if no free adapter has the
    ///   capabilities.
    /// - [`AdapterError::ManagedByDaemon`] if every adapter that has them is
    ///   managed by NetworkManager.
    pub fn select_interface(&mut self, needs_ap: bool, needs_monitor: bool) -> Result<String> {
        let request = Capabilities::from_request(needs_ap, needs_monitor);
        let name = selection::select_one(&self.adapters, &self.active, request)?;
        self.activate(&name);
        Ok(name)
    }

    /// Allocates two distinct interfaces covering AP and monitor duty.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InterfaceNotFound`] if no two free adapters can share
    ///   the roles.
    /// - [`AdapterError::ManagedByDaemon`] if a pair exists only by counting
    ///   adapters NetworkManager manages.
    pub fn select_interfaces_automatically(&mut self) -> Result<InterfacePair> {
        let pair = selection::select_pair(&self.adapters, &self.active)?;
        self.activate(&pair.ap);
        self.activate(&pair.monitor);
        Ok(pair)
    }

    /// Switches `name` into `mode`, cycling it down and up around the change.
    pub fn set_mode(&self, name: &str, mode: WifiMode) -> Result<()> {
        lifecycle::set_mode(&self.radio, self.known(name)?, &mode)
    }

    /// Brings `name` administratively up.
    pub fn up(&self, name: &str) -> Result<()> {
        Ok(self.radio.up(self.known(name)?.handle())?)
    }

    /// Brings `name` administratively down.
    pub fn down(&self, name: &str) -> Result<()> {
        Ok(self.radio.down(self.known(name)?.handle())?)
    }

    /// Tunes `name` to `channel`.
    pub fn set_channel(&self, name: &str, channel: u32) -> Result<()> {
        lifecycle::set_channel(&self.radio, self.known(name)?, channel)
    }

    /// Programs a new MAC address into `name`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidMacAddress`] if `mac` is not of the form
    /// `xx:xx:xx:xx:xx:xx` (the driver is not called) or the driver rejects
    /// it as an invalid argument; any other driver error is returned as
    /// [`AdapterError::Radio`] with its original code.
    pub fn set_mac_address(&mut self, name: &str, mac: &str) -> Result<()> {
        let adapter = self
            .adapters
            .get_mut(name)
            .ok_or_else(|| AdapterError::invalid(name, InvalidReason::Unknown))?;
        lifecycle::set_mac(&self.radio, adapter, mac)
    }

    /// Programs a freshly generated MAC address into `name` and returns it.
    pub fn set_random_mac_address(&mut self, name: &str) -> Result<MacAddress> {
        let mac = random_mac_address();
        self.set_mac_address(name, &mac.to_string())?;
        Ok(mac)
    }

    /// Current MAC address of `name`.
    pub fn mac_address(&self, name: &str) -> Result<&MacAddress> {
        Ok(self.known(name)?.mac_address())
    }

    /// Clears an rfkill soft block on `name` if one is set.
    pub fn unblock(&self, name: &str) -> Result<()> {
        lifecycle::unblock(&self.radio, self.known(name)?)
    }

    /// Turns the connection daemon's networking on or off.
    pub fn set_daemon_enabled(&self, enabled: bool) -> Result<()> {
        self.daemon.set_enabled(enabled)
    }

    /// Returns every active adapter to its neutral state.
    ///
    /// Each adapter is switched to the teardown mode and, if configured, given
    /// back its discovery-time MAC. A failure is logged and the remaining
    /// adapters are still attempted; nothing is retried. Afterwards the
    /// daemon is re-enabled if this process disabled it, and the active set
    /// is emptied.
    pub fn on_exit(&mut self) {
        let active = std::mem::take(&mut self.active);
        for name in &active {
            let Some(adapter) = self.adapters.get_mut(name) else {
                continue;
            };

            if let Err(e) = lifecycle::set_mode(&self.radio, adapter, &self.options.teardown_mode)
            {
                warn!(
                    "Failed to restore {name} to {} mode: {e}",
                    self.options.teardown_mode
                );
            }

            if self.options.restore_mac_on_exit
                && adapter.mac_address() != adapter.original_mac_address()
            {
                let original = adapter.original_mac_address().to_string();
                if let Err(e) = lifecycle::set_mac(&self.radio, adapter, &original) {
                    warn!("Failed to restore MAC address of {name}: {e}");
                }
            }
        }

        if self.options.restore_daemon_on_exit && self.daemon.has_disabled() {
            if let Err(e) = self.daemon.set_enabled(true) {
                warn!("Failed to re-enable NetworkManager: {e}");
            }
        }
    }

    /// Adds an adapter that was discovered elsewhere, replacing any adapter
    /// of the same name.
    pub fn insert_adapter(&mut self, adapter: Adapter) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    /// Looks up an adapter by interface name.
    pub fn adapter(&self, name: &str) -> Option<&Adapter> {
        self.adapters.get(name)
    }

    /// Mutable lookup, e.g. to override probed flags.
    pub fn adapter_mut(&mut self, name: &str) -> Option<&mut Adapter> {
        self.adapters.get_mut(name)
    }

    /// All known adapters, ordered by name.
    pub fn adapters(&self) -> impl Iterator<Item = &Adapter> {
        self.adapters.values()
    }

    /// Whether `name` has been handed out.
    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    /// Names of all allocated interfaces, ordered by name.
    pub fn active_interfaces(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    /// The radio control layer the registry drives.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// The connection daemon client.
    pub fn daemon(&self) -> &D {
        &self.daemon
    }

    /// Options the registry was created with.
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    fn known(&self, name: &str) -> Result<&Adapter> {
        self.adapters
            .get(name)
            .ok_or_else(|| AdapterError::invalid(name, InvalidReason::Unknown))
    }

    fn activate(&mut self, name: &str) {
        debug!("{name} is now active");
        self.active.insert(name.to_string());
    }
}
