//! Scripted radio and daemon doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use wlanpool::{
    Adapter, AdapterError, AdapterRegistry, ConnectionDaemon, DeviceHandle, MacAddress,
    RadioControl, RadioError, RadioResult, WifiMode,
};

pub const MAC: &str = "00:00:00:00:00:00";

/// Driver calls that change device state, in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Up(String),
    Down(String),
    SetMode(String, WifiMode),
    SetChannel(String, u32),
    SetMac(String, String),
    Unblock(String),
}

/// Radio whose answers are fixed up front.
///
/// Device handles use the interface's position in `interfaces` (plus one) as
/// the ifindex, so calls can be mapped back to names.
#[derive(Default)]
pub struct FakeRadio {
    pub interfaces: Vec<String>,
    pub modes: RefCell<HashMap<String, Vec<WifiMode>>>,
    pub device_errors: HashMap<String, RadioError>,
    pub set_mac_error: Option<RadioError>,
    pub set_mode_failures: HashSet<String>,
    pub blocked: bool,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(mut self, name: &str, modes: &[WifiMode]) -> Self {
        self.interfaces.push(name.to_string());
        self.modes
            .borrow_mut()
            .insert(name.to_string(), modes.to_vec());
        self
    }

    pub fn failing_device(mut self, name: &str, err: RadioError) -> Self {
        self.interfaces.push(name.to_string());
        self.device_errors.insert(name.to_string(), err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn handle_for(&self, name: &str) -> DeviceHandle {
        let idx = self
            .interfaces
            .iter()
            .position(|n| n == name)
            .map(|i| i as u32 + 1)
            .unwrap_or(0);
        DeviceHandle::new(0, idx)
    }

    fn name_of(&self, dev: &DeviceHandle) -> String {
        dev.ifindex
            .checked_sub(1)
            .and_then(|i| self.interfaces.get(i as usize))
            .cloned()
            .unwrap_or_else(|| format!("if{}", dev.ifindex))
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl RadioControl for FakeRadio {
    fn interfaces(&self) -> RadioResult<Vec<String>> {
        Ok(self.interfaces.clone())
    }

    fn device(&self, name: &str) -> RadioResult<DeviceHandle> {
        match self.device_errors.get(name) {
            Some(err) => Err(err.clone()),
            None => Ok(self.handle_for(name)),
        }
    }

    fn mac_address(&self, _dev: &DeviceHandle) -> RadioResult<MacAddress> {
        Ok(MAC.parse().expect("valid test MAC"))
    }

    fn supported_modes(&self, dev: &DeviceHandle) -> RadioResult<Vec<WifiMode>> {
        let name = self.name_of(dev);
        Ok(self.modes.borrow().get(&name).cloned().unwrap_or_default())
    }

    fn up(&self, dev: &DeviceHandle) -> RadioResult<()> {
        self.record(Call::Up(self.name_of(dev)));
        Ok(())
    }

    fn down(&self, dev: &DeviceHandle) -> RadioResult<()> {
        self.record(Call::Down(self.name_of(dev)));
        Ok(())
    }

    fn set_mode(&self, dev: &DeviceHandle, mode: &WifiMode) -> RadioResult<()> {
        let name = self.name_of(dev);
        self.record(Call::SetMode(name.clone(), mode.clone()));
        if self.set_mode_failures.contains(&name) {
            return Err(RadioError::new(16, "Device or resource busy"));
        }
        Ok(())
    }

    fn set_channel(&self, dev: &DeviceHandle, channel: u32) -> RadioResult<()> {
        self.record(Call::SetChannel(self.name_of(dev), channel));
        Ok(())
    }

    fn set_mac(&self, dev: &DeviceHandle, mac: &str) -> RadioResult<()> {
        self.record(Call::SetMac(self.name_of(dev), mac.to_string()));
        match &self.set_mac_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn is_soft_blocked(&self, _dev: &DeviceHandle) -> RadioResult<bool> {
        Ok(self.blocked)
    }

    fn unblock(&self, dev: &DeviceHandle) -> RadioResult<()> {
        self.record(Call::Unblock(self.name_of(dev)));
        Ok(())
    }
}

/// Connection daemon with a fixed set of managed interfaces.
#[derive(Default)]
pub struct FakeDaemon {
    pub managed: RefCell<HashSet<String>>,
    pub broken: bool,
    pub enabled_calls: RefCell<Vec<bool>>,
    pub disabled: Cell<bool>,
}

impl FakeDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn managing(names: &[&str]) -> Self {
        let daemon = Self::default();
        daemon
            .managed
            .borrow_mut()
            .extend(names.iter().map(|n| n.to_string()));
        daemon
    }
}

impl ConnectionDaemon for FakeDaemon {
    fn is_managed(&self, interface: &str) -> wlanpool::Result<bool> {
        if self.broken {
            return Err(AdapterError::Dbus(zbus::Error::Failure(
                "malformed device list".into(),
            )));
        }
        Ok(self.managed.borrow().contains(interface))
    }

    fn set_enabled(&self, enabled: bool) -> wlanpool::Result<()> {
        self.enabled_calls.borrow_mut().push(enabled);
        if !enabled {
            self.disabled.set(true);
        }
        Ok(())
    }

    fn has_disabled(&self) -> bool {
        self.disabled.get()
    }
}

pub type Registry = AdapterRegistry<FakeRadio, FakeDaemon>;

pub fn registry() -> Registry {
    AdapterRegistry::new(FakeRadio::new(), FakeDaemon::new())
}

/// Builds an adapter by hand, with flags set directly.
pub fn adapter(name: &str, ap: bool, monitor: bool, managed: bool) -> Adapter {
    let mut a = Adapter::new(
        name,
        DeviceHandle::new(0, 0),
        MAC.parse().expect("valid test MAC"),
    );
    a.set_has_ap_mode(ap);
    a.set_has_monitor_mode(monitor);
    a.set_managed_by_daemon(managed);
    a
}

/// Registry over a radio that knows `names`, pre-populated with adapters
/// whose handles line up with the radio's.
pub fn registry_with(adapters: Vec<(&str, bool, bool, bool)>) -> Registry {
    let mut radio = FakeRadio::new();
    for (name, ..) in &adapters {
        radio = radio.with_interface(name, &[]);
    }

    let mut handles = Vec::new();
    for (name, ap, monitor, managed) in &adapters {
        let mut a = Adapter::new(
            *name,
            radio.handle_for(name),
            MAC.parse().expect("valid test MAC"),
        );
        a.set_has_ap_mode(*ap);
        a.set_has_monitor_mode(*monitor);
        a.set_managed_by_daemon(*managed);
        handles.push(a);
    }

    let mut registry = AdapterRegistry::new(radio, FakeDaemon::new());
    for a in handles {
        registry.insert_adapter(a);
    }
    registry
}
